use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

pub(crate) const MQTT: &[u8] = b"MQTT";
pub const MQTT_LEVEL_311: u8 = 4;
pub(crate) const WILL_QOS_SHIFT: u8 = 3;

/// Max value the Remaining Length field can represent (2^28 - 1).
pub const MAX_REMAINING_LENGTH: u32 = 268_435_455;

prim_enum! {
    /// Quality of Service
    #[derive(Deserialize, Serialize, PartialOrd, Ord, Hash)]
    pub enum QoS {
        /// At most once delivery
        ///
        /// The message arrives at the receiver either once or not at
        /// all; no response is sent and no retry is performed.
        AtMostOnce = 0,
        /// At least once delivery
        ///
        /// A QoS 1 PUBLISH Packet has a Packet Identifier in its
        /// variable header and is acknowledged by a PUBACK Packet.
        AtLeastOnce = 1,
        /// Exactly once delivery
        ///
        /// The highest quality of service, for use when neither loss
        /// nor duplication of messages are acceptable.
        ExactlyOnce = 2
    }
}

impl From<QoS> for u8 {
    fn from(v: QoS) -> Self {
        match v {
            QoS::AtMostOnce => 0,
            QoS::AtLeastOnce => 1,
            QoS::ExactlyOnce => 2,
        }
    }
}

prim_enum! {
    /// MQTT control packet type, the high nibble of the first header byte.
    #[derive(Deserialize, Serialize, Hash)]
    pub enum PacketType {
        Connect = 1,
        ConnectAck = 2,
        Publish = 3,
        PublishAck = 4,
        PublishReceived = 5,
        PublishRelease = 6,
        PublishComplete = 7,
        Subscribe = 8,
        SubscribeAck = 9,
        Unsubscribe = 10,
        UnsubscribeAck = 11,
        PingRequest = 12,
        PingResponse = 13,
        Disconnect = 14
    }
}

impl From<PacketType> for u8 {
    fn from(v: PacketType) -> Self {
        v as u8
    }
}

bitflags::bitflags! {
    /// CONNECT variable-header flags byte.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct ConnectFlags: u8 {
        const USERNAME    = 0b1000_0000;
        const PASSWORD    = 0b0100_0000;
        const WILL_RETAIN = 0b0010_0000;
        const WILL_QOS    = 0b0001_1000;
        const WILL        = 0b0000_0100;
        const CLEAN_SESSION = 0b0000_0010;
    }
}

bitflags::bitflags! {
    /// CONNACK acknowledge-flags byte. Bits 7-1 are reserved.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct ConnectAckFlags: u8 {
        const SESSION_PRESENT = 0b0000_0001;
    }
}

/// The fixed header of a wire packet: the raw type/flags byte and the
/// decoded Remaining Length.
///
/// Field extraction is explicit shift/mask against the layout mandated
/// by the protocol (bits 7-4 type, bit 3 dup, bits 2-1 qos, bit 0
/// retain); the accessors never depend on a platform bitfield layout.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct FixedHeader {
    /// Raw first byte, type nibble plus flag bits.
    pub first_byte: u8,
    /// Number of bytes remaining within the current packet, covering
    /// the variable header and the payload.
    pub remaining_length: u32,
}

impl FixedHeader {
    /// Packet type from the high nibble. Unknown codes (0, 15) are
    /// rejected here; matching against an *expected* type is the
    /// per-shape decoder's job.
    #[inline]
    pub fn packet_type(&self) -> Result<PacketType, DecodeError> {
        PacketType::try_from(self.first_byte >> 4)
    }

    #[inline]
    pub fn dup(&self) -> bool {
        self.first_byte & 0b0000_1000 != 0
    }

    /// Raw QoS bits 2-1; may hold the invalid value 3 on a corrupted
    /// frame, so conversion to [`QoS`] stays with the caller.
    #[inline]
    pub fn qos_bits(&self) -> u8 {
        (self.first_byte & 0b0000_0110) >> 1
    }

    #[inline]
    pub fn retain(&self) -> bool {
        self.first_byte & 0b0000_0001 != 0
    }

    /// Pack a first header byte from its logical fields.
    #[inline]
    pub(crate) fn pack(packet_type: PacketType, dup: bool, qos: u8, retain: bool) -> u8 {
        (u8::from(packet_type) << 4) | ((dup as u8) << 3) | ((qos & 0b11) << 1) | (retain as u8)
    }
}
