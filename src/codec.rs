use std::cell::Cell;

use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::decode::decode_header;
use crate::encode::{encode_packet, encoded_packet_size};
use crate::error::{DecodeError, EncodeError};
use crate::packet::Packet;
use crate::types::FixedHeader;

/// Frame-level codec for running the packet routines over a byte
/// stream.
///
/// Decoding yields one complete wire packet at a time (fixed header
/// included) as a [`Bytes`] frame; hand the frame to
/// [`decode_packet`](crate::decode_packet) or one of the per-shape
/// decoders. The split keeps the typed decoders zero-copy: they
/// borrow from the frame the caller holds, not from a buffer this
/// codec may reuse.
#[derive(Debug, Clone)]
pub struct Codec {
    state: Cell<DecodeState>,
    max_size: Cell<u32>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum DecodeState {
    FrameHeader,
    Frame { header: FixedHeader, header_len: usize },
}

impl Codec {
    /// Create `Codec` instance
    pub fn new(max_packet_size: u32) -> Self {
        Codec { state: Cell::new(DecodeState::FrameHeader), max_size: Cell::new(max_packet_size) }
    }

    /// Set max inbound frame size.
    ///
    /// If max size is set to `0`, size is unlimited.
    /// By default max size is set to `0`
    pub fn set_max_size(&mut self, size: u32) {
        self.max_size.set(size);
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Decoder for Codec {
    type Item = Bytes;
    type Error = DecodeError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, DecodeError> {
        loop {
            match self.state.get() {
                DecodeState::FrameHeader => {
                    if src.len() < 2 {
                        return Ok(None);
                    }
                    match decode_header(src.as_ref()) {
                        Ok((header, header_len)) => {
                            let max_size = self.max_size.get();
                            if max_size != 0 && max_size < header.remaining_length {
                                return Err(DecodeError::MaxSizeExceeded);
                            }
                            self.state.set(DecodeState::Frame { header, header_len });
                            let frame_len = header_len + header.remaining_length as usize;
                            if src.len() < frame_len {
                                src.reserve(frame_len - src.len());
                                return Ok(None);
                            }
                        }
                        // length field still arriving
                        Err(DecodeError::LengthMismatch) => return Ok(None),
                        Err(e) => return Err(e),
                    }
                }
                DecodeState::Frame { header, header_len } => {
                    let frame_len = header_len + header.remaining_length as usize;
                    if src.len() < frame_len {
                        return Ok(None);
                    }
                    let frame = src.split_to(frame_len).freeze();
                    self.state.set(DecodeState::FrameHeader);
                    src.reserve(2);
                    return Ok(Some(frame));
                }
            }
        }
    }
}

impl<'a> Encoder<Packet<'a>> for Codec {
    type Error = EncodeError;

    fn encode(&mut self, item: Packet<'a>, dst: &mut BytesMut) -> Result<(), EncodeError> {
        let size = encoded_packet_size(&item)?;
        let start = dst.len();
        dst.resize(start + size, 0);
        match encode_packet(&item, &mut dst[start..]) {
            Ok(written) => {
                debug_assert_eq!(written, size);
                Ok(())
            }
            Err(e) => {
                dst.truncate(start);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_packet;
    use crate::packet::Publish;
    use crate::types::QoS;

    #[test]
    fn test_max_size() {
        let mut codec = Codec::default();
        codec.set_max_size(5);

        let mut buf = BytesMut::new();
        buf.extend_from_slice(b"\x30\x09");
        assert_eq!(codec.decode(&mut buf), Err(DecodeError::MaxSizeExceeded));
    }

    #[test]
    fn test_incremental_frames() {
        let mut codec = Codec::default();
        let mut buf = BytesMut::new();

        buf.extend_from_slice(b"\x3d");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"\x0D\x00\x05topic\x43\x21da");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        // rest of this frame plus the start of the next one
        buf.extend_from_slice(b"ta\xc0\x00");
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(frame.as_ref(), b"\x3d\x0D\x00\x05topic\x43\x21data");
        assert_eq!(
            decode_packet(&frame).unwrap(),
            Packet::Publish(Publish {
                dup: true,
                retain: true,
                qos: QoS::ExactlyOnce,
                topic: "topic",
                packet_id: Some(0x4321),
                payload: b"data",
            })
        );

        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(frame.as_ref(), b"\xc0\x00");
        assert_eq!(decode_packet(&frame).unwrap(), Packet::PingRequest);
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_encode_round_trip() {
        let mut codec = Codec::default();
        let mut buf = BytesMut::new();

        let payload = "a".repeat(260 * 1024);
        let publish = Publish {
            dup: false,
            retain: false,
            qos: QoS::AtMostOnce,
            topic: "/test",
            packet_id: None,
            payload: payload.as_bytes(),
        };
        codec.encode(Packet::Publish(publish), &mut buf).unwrap();

        let frame = codec.decode(&mut buf).unwrap().unwrap();
        let decoded = decode_packet(&frame).unwrap();
        assert_eq!(decoded, Packet::Publish(publish));
    }

    #[test]
    fn test_encode_error_leaves_buffer() {
        let mut codec = Codec::default();
        let mut buf = BytesMut::new();
        buf.extend_from_slice(b"prior");

        let publish = Publish {
            dup: false,
            retain: false,
            qos: QoS::AtLeastOnce,
            topic: "t",
            packet_id: None,
            payload: b"",
        };
        assert_eq!(
            codec.encode(Packet::Publish(publish), &mut buf),
            Err(EncodeError::PacketIdRequired)
        );
        assert_eq!(buf.as_ref(), b"prior");
    }
}
