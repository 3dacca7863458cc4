#![deny(unsafe_code)]

//! MQTT v3.1.1 wire protocol codec over caller-supplied buffers
//!
//! ## Core Features:
//! - **Zero Allocation**: every encode/decode routine is a pure
//!   transformation over memory the caller owns; decoded topics and
//!   payloads are borrowed views into the receive buffer
//! - **Byte-Exact Framing**: explicit shift/mask packing of the fixed
//!   header and flag bytes, big-endian integers, length-prefixed
//!   strings, minimal Remaining Length encoding
//! - **Bounded Reads**: adversarially truncated or oversized length
//!   fields are rejected before any out-of-bounds access
//! - **Atomic Writes**: encoders validate the full packet size up
//!   front and leave an undersized destination untouched
//! - **Tokio Integration**: an optional frame splitter compatible
//!   with `tokio_util::codec` for use over a byte stream
//!
//! ## Architecture Components:
//! - [`Packet`]: sum type over the packet shapes handled here
//! - [`encode_connect`], [`encode_publish`], [`encode_ack`],
//!   [`encode_zero`]: per-shape encoders returning bytes written
//! - [`decode_connack`], [`decode_ack`], [`decode_publish`],
//!   [`decode_packet`]: per-shape decoders over one received packet
//! - [`Codec`]: stream framing for `tokio_util::codec`
//! - Error handling with dedicated [`EncodeError`]/[`DecodeError`]
//!   types
//!
//! Socket I/O, keep-alive timing, retransmission and subscription
//! state belong to the transport/session layer above this crate.

#[macro_use]
mod utils;

/// Stream framing for `tokio_util::codec`
pub mod codec;

/// Per-shape decoders over received packets
pub mod decode;

/// Per-shape encoders into caller-supplied buffers
pub mod encode;

/// Error types for encoding/decoding operations
pub mod error;

/// Packet value types
pub mod packet;

/// Shared types and constants for the wire format
pub mod types;

pub use codec::Codec;
pub use decode::{decode_ack, decode_connack, decode_header, decode_packet, decode_publish};
pub use encode::{
    encode_ack, encode_connack, encode_connect, encode_packet, encode_publish, encode_zero,
};
pub use error::{DecodeError, EncodeError};
pub use packet::{Ack, Connect, ConnectAck, ConnectAckReason, LastWill, Packet, Publish};
pub use types::{
    ConnectAckFlags, ConnectFlags, FixedHeader, PacketType, QoS, MAX_REMAINING_LENGTH,
    MQTT_LEVEL_311,
};
