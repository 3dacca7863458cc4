use bytes::BufMut;

use crate::error::EncodeError;
use crate::packet::{Connect, ConnectAck, Packet, Publish};
use crate::types::{
    ConnectFlags, FixedHeader, PacketType, QoS, MAX_REMAINING_LENGTH, MQTT, MQTT_LEVEL_311,
    WILL_QOS_SHIFT,
};
use crate::utils::{
    ensure_prefixed_len, total_header_length, write_variable_length, Encode,
};

/// Validate the body size against the protocol maximum and the
/// destination capacity. Runs before the first byte of any packet is
/// written, so an undersized buffer is left exactly as it was.
fn check_capacity(content_size: usize, dst: &[u8]) -> Result<u32, EncodeError> {
    let rem_len =
        u32::try_from(content_size).map_err(|_| EncodeError::RemainingLengthOverflow)?;
    ensure!(rem_len <= MAX_REMAINING_LENGTH, EncodeError::RemainingLengthOverflow);
    ensure!(
        total_header_length(rem_len) + content_size <= dst.len(),
        EncodeError::BufferTooShort
    );
    Ok(rem_len)
}

fn connect_content_size(connect: &Connect<'_>) -> Result<usize, EncodeError> {
    ensure_prefixed_len(connect.client_id.len())?;

    // protocol name + level + flags + keep alive
    let mut size = 10 + 2 + connect.client_id.len();

    if let Some(will) = &connect.last_will {
        ensure_prefixed_len(will.topic.len())?;
        ensure_prefixed_len(will.message.len())?;
        size += 2 + will.topic.len() + 2 + will.message.len();
    }

    if let Some(username) = connect.username {
        ensure_prefixed_len(username.len())?;
        size += 2 + username.len();

        // a password only reaches the wire alongside a username
        if let Some(password) = connect.password {
            ensure_prefixed_len(password.len())?;
            size += 2 + password.len();
        }
    }

    Ok(size)
}

fn publish_content_size(publish: &Publish<'_>) -> Result<usize, EncodeError> {
    ensure_prefixed_len(publish.topic.len())?;
    if publish.qos == QoS::AtMostOnce {
        ensure!(publish.packet_id.is_none(), EncodeError::MalformedPacket);
        Ok(2 + publish.topic.len() + publish.payload.len())
    } else {
        ensure!(publish.packet_id.is_some(), EncodeError::PacketIdRequired);
        Ok(2 + publish.topic.len() + 2 + publish.payload.len())
    }
}

/// Encode a CONNECT packet into `dst`, returning the number of bytes
/// written.
pub fn encode_connect(connect: &Connect<'_>, dst: &mut [u8]) -> Result<usize, EncodeError> {
    let content_size = connect_content_size(connect)?;
    let rem_len = check_capacity(content_size, dst)?;
    let written = total_header_length(rem_len) + content_size;

    let mut flags = ConnectFlags::empty();
    if connect.clean_session {
        flags |= ConnectFlags::CLEAN_SESSION;
    }
    if let Some(will) = &connect.last_will {
        flags |= ConnectFlags::WILL;
        flags |= ConnectFlags::from_bits_truncate(u8::from(will.qos) << WILL_QOS_SHIFT);
        if will.retain {
            flags |= ConnectFlags::WILL_RETAIN;
        }
    }
    if connect.username.is_some() {
        flags |= ConnectFlags::USERNAME;
        if connect.password.is_some() {
            flags |= ConnectFlags::PASSWORD;
        }
    }

    let mut buf = &mut *dst;
    buf.put_u8(FixedHeader::pack(PacketType::Connect, false, 0, false));
    write_variable_length(rem_len, &mut buf);
    MQTT.encode(&mut buf);
    buf.put_u8(MQTT_LEVEL_311);
    buf.put_u8(flags.bits());
    connect.keep_alive.encode(&mut buf);
    connect.client_id.encode(&mut buf);

    if let Some(will) = &connect.last_will {
        will.topic.encode(&mut buf);
        will.message.encode(&mut buf);
    }
    if let Some(username) = connect.username {
        username.encode(&mut buf);
        if let Some(password) = connect.password {
            password.encode(&mut buf);
        }
    }

    Ok(written)
}

/// Encode a PUBLISH packet into `dst`, returning the number of bytes
/// written. A packet id is required exactly when QoS > 0.
pub fn encode_publish(publish: &Publish<'_>, dst: &mut [u8]) -> Result<usize, EncodeError> {
    let content_size = publish_content_size(publish)?;
    let rem_len = check_capacity(content_size, dst)?;
    let written = total_header_length(rem_len) + content_size;

    let mut buf = &mut *dst;
    buf.put_u8(FixedHeader::pack(
        PacketType::Publish,
        publish.dup,
        u8::from(publish.qos),
        publish.retain,
    ));
    write_variable_length(rem_len, &mut buf);
    publish.topic.encode(&mut buf);
    if let Some(packet_id) = publish.packet_id {
        packet_id.encode(&mut buf);
    }
    buf.put_slice(publish.payload);

    Ok(written)
}

/// Encode a packet-id acknowledgement (PUBACK, PUBREC, PUBREL,
/// PUBCOMP, UNSUBACK). Always 4 bytes. The header QoS subfield is
/// fixed to 1 for PUBREL and 0 for everything else; the protocol
/// mandates that value, it is not a delivery QoS.
pub fn encode_ack(
    packet_type: PacketType,
    dup: bool,
    packet_id: u16,
    dst: &mut [u8],
) -> Result<usize, EncodeError> {
    ensure!(dst.len() >= 4, EncodeError::BufferTooShort);

    let qos = u8::from(packet_type == PacketType::PublishRelease);
    let mut buf = &mut *dst;
    buf.put_u8(FixedHeader::pack(packet_type, dup, qos, false));
    write_variable_length(2, &mut buf);
    packet_id.encode(&mut buf);

    Ok(4)
}

/// Encode a packet with no variable header or payload (PINGREQ,
/// PINGRESP, DISCONNECT). Always 2 bytes: the header byte and a
/// single zero Remaining Length digit.
pub fn encode_zero(packet_type: PacketType, dst: &mut [u8]) -> Result<usize, EncodeError> {
    ensure!(dst.len() >= 2, EncodeError::BufferTooShort);

    let mut buf = &mut *dst;
    buf.put_u8(FixedHeader::pack(packet_type, false, 0, false));
    write_variable_length(0, &mut buf);

    Ok(2)
}

/// Encode a CONNACK packet. Always 4 bytes.
pub fn encode_connack(ack: &ConnectAck, dst: &mut [u8]) -> Result<usize, EncodeError> {
    ensure!(dst.len() >= 4, EncodeError::BufferTooShort);

    let mut buf = &mut *dst;
    buf.put_u8(FixedHeader::pack(PacketType::ConnectAck, false, 0, false));
    write_variable_length(2, &mut buf);
    buf.put_slice(&[u8::from(ack.session_present), u8::from(ack.return_code)]);

    Ok(4)
}

/// Encode any packet shape through the sum type.
pub fn encode_packet(packet: &Packet<'_>, dst: &mut [u8]) -> Result<usize, EncodeError> {
    match packet {
        Packet::Connect(connect) => encode_connect(connect, dst),
        Packet::ConnectAck(ack) => encode_connack(ack, dst),
        Packet::Publish(publish) => encode_publish(publish, dst),
        Packet::PublishAck { packet_id } => {
            encode_ack(PacketType::PublishAck, false, *packet_id, dst)
        }
        Packet::PublishReceived { packet_id } => {
            encode_ack(PacketType::PublishReceived, false, *packet_id, dst)
        }
        Packet::PublishRelease { packet_id } => {
            encode_ack(PacketType::PublishRelease, false, *packet_id, dst)
        }
        Packet::PublishComplete { packet_id } => {
            encode_ack(PacketType::PublishComplete, false, *packet_id, dst)
        }
        Packet::UnsubscribeAck { packet_id } => {
            encode_ack(PacketType::UnsubscribeAck, false, *packet_id, dst)
        }
        Packet::PingRequest => encode_zero(PacketType::PingRequest, dst),
        Packet::PingResponse => encode_zero(PacketType::PingResponse, dst),
        Packet::Disconnect => encode_zero(PacketType::Disconnect, dst),
    }
}

/// Total wire size of a packet, fixed header included. Used by the
/// streaming codec to reserve output space; runs the same field
/// validation as the encoders.
pub(crate) fn encoded_packet_size(packet: &Packet<'_>) -> Result<usize, EncodeError> {
    let content_size = match packet {
        Packet::Connect(connect) => connect_content_size(connect)?,
        Packet::Publish(publish) => publish_content_size(publish)?,
        Packet::ConnectAck(_)
        | Packet::PublishAck { .. }
        | Packet::PublishReceived { .. }
        | Packet::PublishRelease { .. }
        | Packet::PublishComplete { .. }
        | Packet::UnsubscribeAck { .. } => 2,
        Packet::PingRequest | Packet::PingResponse | Packet::Disconnect => 0,
    };
    let rem_len =
        u32::try_from(content_size).map_err(|_| EncodeError::RemainingLengthOverflow)?;
    ensure!(rem_len <= MAX_REMAINING_LENGTH, EncodeError::RemainingLengthOverflow);
    Ok(total_header_length(rem_len) + content_size)
}
