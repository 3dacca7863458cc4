use crate::error::DecodeError;
use crate::packet::{Ack, ConnectAck, ConnectAckReason, Packet, Publish};
use crate::types::{ConnectAckFlags, FixedHeader, PacketType, QoS};
use crate::utils::{decode_variable_length, read_str, read_u16, read_u8};

/// Decode the fixed header at the start of `src`: the type/flags byte
/// and the Remaining Length. Returns the header and its size in
/// bytes, for callers running their own framing.
pub fn decode_header(src: &[u8]) -> Result<(FixedHeader, usize), DecodeError> {
    ensure!(!src.is_empty(), DecodeError::LengthMismatch);
    let first_byte = src[0];
    let (remaining_length, consumed) = decode_variable_length(&src[1..])?;
    Ok((FixedHeader { first_byte, remaining_length }, 1 + consumed))
}

/// Split one received packet into its header and a body slice of
/// exactly `remaining_length` bytes. The buffer bound is validated
/// here, once per packet; everything the shape decoders read comes
/// out of the returned body slice.
fn split_frame(src: &[u8]) -> Result<(FixedHeader, &[u8]), DecodeError> {
    let (header, header_len) = decode_header(src)?;
    let end = header_len + header.remaining_length as usize;
    ensure!(src.len() >= end, DecodeError::LengthMismatch);
    Ok((header, &src[header_len..end]))
}

/// Decode a CONNACK packet. The remaining length must be exactly 2.
/// Reserved bits 7-1 of the acknowledge-flags byte are tolerated; the
/// return code is carried through even outside the defined 0-5 range.
pub fn decode_connack(src: &[u8]) -> Result<ConnectAck, DecodeError> {
    let (header, mut body) = split_frame(src)?;
    ensure!(
        header.packet_type()? == PacketType::ConnectAck,
        DecodeError::UnexpectedPacketType
    );
    ensure!(body.len() == 2, DecodeError::LengthMismatch);

    let flags = ConnectAckFlags::from_bits_truncate(read_u8(&mut body)?);
    let return_code = ConnectAckReason::from(read_u8(&mut body)?);
    Ok(ConnectAck {
        session_present: flags.contains(ConnectAckFlags::SESSION_PRESENT),
        return_code,
    })
}

/// Decode a packet-id acknowledgement. No type filtering happens
/// here; the caller matches on [`Ack::packet_type`] to tell PUBACK,
/// PUBREC, PUBREL, PUBCOMP and UNSUBACK apart.
pub fn decode_ack(src: &[u8]) -> Result<Ack, DecodeError> {
    let (header, mut body) = split_frame(src)?;
    let packet_type = header.packet_type()?;
    ensure!(body.len() == 2, DecodeError::LengthMismatch);

    let packet_id = read_u16(&mut body)?;
    Ok(Ack { packet_type, dup: header.dup(), packet_id })
}

/// Decode a PUBLISH packet. Topic and payload are borrowed views into
/// `src`; nothing is copied.
pub fn decode_publish(src: &[u8]) -> Result<Publish<'_>, DecodeError> {
    let (header, mut body) = split_frame(src)?;
    ensure!(
        header.packet_type()? == PacketType::Publish,
        DecodeError::UnexpectedPacketType
    );
    let qos = QoS::try_from(header.qos_bits())?;

    let topic = read_str(&mut body)?;
    let packet_id = if qos == QoS::AtMostOnce {
        None
    } else {
        // read_u16 verifies 2 bytes remain before the packet id
        Some(read_u16(&mut body)?)
    };

    Ok(Publish {
        dup: header.dup(),
        qos,
        retain: header.retain(),
        topic,
        packet_id,
        payload: body,
    })
}

fn decode_zero(src: &[u8]) -> Result<(), DecodeError> {
    let (_, body) = split_frame(src)?;
    ensure!(body.is_empty(), DecodeError::LengthMismatch);
    Ok(())
}

/// Decode one received packet, dispatching on the header type. The
/// client-facing shapes are handled: CONNACK, PUBLISH, the five
/// packet-id acknowledgements, and the zero-body PINGREQ, PINGRESP
/// and DISCONNECT. CONNECT and the SUBSCRIBE/SUBACK/UNSUBSCRIBE
/// family are outside this codec.
pub fn decode_packet(src: &[u8]) -> Result<Packet<'_>, DecodeError> {
    let (header, _) = decode_header(src)?;
    match header.packet_type()? {
        PacketType::ConnectAck => Ok(Packet::ConnectAck(decode_connack(src)?)),
        PacketType::Publish => Ok(Packet::Publish(decode_publish(src)?)),
        PacketType::PublishAck => {
            Ok(Packet::PublishAck { packet_id: decode_ack(src)?.packet_id })
        }
        PacketType::PublishReceived => {
            Ok(Packet::PublishReceived { packet_id: decode_ack(src)?.packet_id })
        }
        PacketType::PublishRelease => {
            Ok(Packet::PublishRelease { packet_id: decode_ack(src)?.packet_id })
        }
        PacketType::PublishComplete => {
            Ok(Packet::PublishComplete { packet_id: decode_ack(src)?.packet_id })
        }
        PacketType::UnsubscribeAck => {
            Ok(Packet::UnsubscribeAck { packet_id: decode_ack(src)?.packet_id })
        }
        PacketType::PingRequest => {
            decode_zero(src)?;
            Ok(Packet::PingRequest)
        }
        PacketType::PingResponse => {
            decode_zero(src)?;
            Ok(Packet::PingResponse)
        }
        PacketType::Disconnect => {
            decode_zero(src)?;
            Ok(Packet::Disconnect)
        }
        _ => Err(DecodeError::UnexpectedPacketType),
    }
}
