/// Errors reported while decoding a received packet.
///
/// Every variant is final: the codec never retries or recovers
/// internally, the caller owns the reconnect/abort policy.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The Remaining Length field required a fifth continuation digit.
    #[error("Remaining length overflow")]
    RemainingLengthOverflow,
    /// The remaining length disagrees with the packet shape, or the
    /// buffer holds fewer bytes than the fixed header demands.
    #[error("Length mismatch")]
    LengthMismatch,
    /// The header's packet type is not the one this routine decodes.
    #[error("Unexpected packet type")]
    UnexpectedPacketType,
    /// Reserved or invalid bit pattern (unknown type code, QoS 3).
    #[error("Malformed packet")]
    MalformedPacket,
    /// A topic or client id is not valid UTF-8.
    #[error("utf8 error")]
    Utf8Error,
    /// Inbound packet exceeds the size limit of the streaming codec.
    #[error("Max size exceeded")]
    MaxSizeExceeded,
}

// Required by `tokio_util::codec::Decoder::Error: From<io::Error>`.
// The codec itself never performs I/O, so this conversion is only
// reached when the underlying transport fails inside `Framed`.
impl From<std::io::Error> for DecodeError {
    fn from(_: std::io::Error) -> Self {
        DecodeError::MalformedPacket
    }
}

/// Errors reported while encoding a packet.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// Destination capacity is insufficient for the whole packet.
    /// Checked before the first byte is written, so the destination
    /// is left untouched.
    #[error("Buffer too short")]
    BufferTooShort,
    /// The packet body exceeds the representable maximum of
    /// 268,435,455 bytes.
    #[error("Remaining length overflow")]
    RemainingLengthOverflow,
    /// A length-prefixed field is longer than 65,535 bytes.
    #[error("Invalid length")]
    InvalidLength,
    /// A QoS 1/2 publish is missing its packet id.
    #[error("Packet id is required")]
    PacketIdRequired,
    /// A QoS 0 publish carries a packet id.
    #[error("Malformed packet")]
    MalformedPacket,
}

// Required by `tokio_util::codec::Encoder::Error: From<io::Error>`.
// The codec itself never performs I/O, so this conversion is only
// reached when the underlying transport fails inside `Framed`.
impl From<std::io::Error> for EncodeError {
    fn from(_: std::io::Error) -> Self {
        EncodeError::MalformedPacket
    }
}
