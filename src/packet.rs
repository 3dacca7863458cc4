use serde::{Deserialize, Serialize};

use crate::types::{PacketType, QoS};

/// Connect Return Code, byte two of the CONNACK variable header.
///
/// Codes 0-5 are defined by the protocol; anything else is carried
/// through untouched, the accept/refuse decision belongs to the
/// session layer.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, Deserialize, Serialize)]
pub enum ConnectAckReason {
    /// Connection accepted
    ConnectionAccepted,
    /// Connection Refused, unacceptable protocol version
    UnacceptableProtocolVersion,
    /// Connection Refused, identifier rejected
    IdentifierRejected,
    /// Connection Refused, Server unavailable
    ServiceUnavailable,
    /// Connection Refused, bad user name or password
    BadUserNameOrPassword,
    /// Connection Refused, not authorized
    NotAuthorized,
    /// A code outside the defined 0-5 range
    Other(u8),
}

impl From<u8> for ConnectAckReason {
    fn from(v: u8) -> Self {
        match v {
            0 => ConnectAckReason::ConnectionAccepted,
            1 => ConnectAckReason::UnacceptableProtocolVersion,
            2 => ConnectAckReason::IdentifierRejected,
            3 => ConnectAckReason::ServiceUnavailable,
            4 => ConnectAckReason::BadUserNameOrPassword,
            5 => ConnectAckReason::NotAuthorized,
            v => ConnectAckReason::Other(v),
        }
    }
}

impl From<ConnectAckReason> for u8 {
    fn from(v: ConnectAckReason) -> Self {
        match v {
            ConnectAckReason::ConnectionAccepted => 0,
            ConnectAckReason::UnacceptableProtocolVersion => 1,
            ConnectAckReason::IdentifierRejected => 2,
            ConnectAckReason::ServiceUnavailable => 3,
            ConnectAckReason::BadUserNameOrPassword => 4,
            ConnectAckReason::NotAuthorized => 5,
            ConnectAckReason::Other(v) => v,
        }
    }
}

impl ConnectAckReason {
    pub fn reason(self) -> &'static str {
        match self {
            ConnectAckReason::ConnectionAccepted => "Connection Accepted",
            ConnectAckReason::UnacceptableProtocolVersion => {
                "Connection Refused, unacceptable protocol version"
            }
            ConnectAckReason::IdentifierRejected => "Connection Refused, identifier rejected",
            ConnectAckReason::ServiceUnavailable => "Connection Refused, Server unavailable",
            ConnectAckReason::BadUserNameOrPassword => {
                "Connection Refused, bad user name or password"
            }
            ConnectAckReason::NotAuthorized => "Connection Refused, not authorized",
            ConnectAckReason::Other(_) => "Connection Refused",
        }
    }
}

/// Connection Will
///
/// Borrowed from the caller's storage; nothing here is copied.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Deserialize, Serialize)]
pub struct LastWill<'a> {
    /// the QoS level to be used when publishing the Will Message.
    pub qos: QoS,
    /// the Will Message is to be Retained when it is published.
    pub retain: bool,
    /// the Will Topic
    pub topic: &'a str,
    /// the Application Message to be published to the Will Topic,
    /// at most 65,535 bytes
    pub message: &'a [u8],
}

/// Connect packet content
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy, Deserialize, Serialize)]
pub struct Connect<'a> {
    /// the handling of the Session state.
    pub clean_session: bool,
    /// a time interval measured in seconds.
    pub keep_alive: u16,
    /// identifies the Client to the Server.
    pub client_id: &'a str,
    /// Will Message to be stored on the Server and associated with the
    /// network connection.
    pub last_will: Option<LastWill<'a>>,
    /// username can be used by the Server for authentication and
    /// authorization.
    pub username: Option<&'a str>,
    /// password can be used by the Server for authentication and
    /// authorization. Only written to the wire when a username is
    /// present as well.
    pub password: Option<&'a [u8]>,
}

/// ConnectAck message
#[derive(Debug, PartialEq, Eq, Copy, Clone, Deserialize, Serialize)]
pub struct ConnectAck {
    pub return_code: ConnectAckReason,
    /// whether the Server already holds Session state for this client.
    pub session_present: bool,
}

/// Publish message
///
/// `topic` and `payload` are views into the receive buffer on decode;
/// they stay valid exactly as long as that buffer does.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Deserialize, Serialize)]
pub struct Publish<'a> {
    /// this might be re-delivery of an earlier attempt to send the
    /// packet.
    pub dup: bool,
    pub retain: bool,
    /// the level of assurance for delivery of an Application Message.
    pub qos: QoS,
    /// the information channel to which payload data is published.
    pub topic: &'a str,
    /// only present in PUBLISH packets where the QoS level is 1 or 2.
    pub packet_id: Option<u16>,
    /// the Application Message that is being published.
    pub payload: &'a [u8],
}

/// The packet-id acknowledgement shape shared by PUBACK, PUBREC,
/// PUBREL, PUBCOMP and UNSUBACK.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Deserialize, Serialize)]
pub struct Ack {
    /// which of the five acknowledgement packets this is; the decoder
    /// does not filter, the caller disambiguates.
    pub packet_type: PacketType,
    pub dup: bool,
    pub packet_id: u16,
}

/// MQTT Control Packets handled by this codec.
///
/// A plain sum type: each shape is encoded/decoded by a free-standing
/// pure function, there is no shared state between calls.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Packet<'a> {
    /// Client request to connect to Server
    Connect(Box<Connect<'a>>),

    /// Connect acknowledgment
    ConnectAck(ConnectAck),

    /// Publish message
    Publish(Publish<'a>),

    /// Publish acknowledgment
    PublishAck {
        /// Packet Identifier
        packet_id: u16,
    },
    /// Publish received (assured delivery part 1)
    PublishReceived {
        /// Packet Identifier
        packet_id: u16,
    },
    /// Publish release (assured delivery part 2)
    PublishRelease {
        /// Packet Identifier
        packet_id: u16,
    },
    /// Publish complete (assured delivery part 3)
    PublishComplete {
        /// Packet Identifier
        packet_id: u16,
    },
    /// Unsubscribe acknowledgment
    UnsubscribeAck {
        /// Packet Identifier
        packet_id: u16,
    },

    /// PING request
    PingRequest,
    /// PING response
    PingResponse,
    /// Client is disconnecting
    Disconnect,
}

impl<'a> From<Connect<'a>> for Packet<'a> {
    fn from(val: Connect<'a>) -> Packet<'a> {
        Packet::Connect(Box::new(val))
    }
}

impl<'a> From<Publish<'a>> for Packet<'a> {
    fn from(val: Publish<'a>) -> Packet<'a> {
        Packet::Publish(val)
    }
}

impl Packet<'_> {
    pub fn packet_type(&self) -> PacketType {
        match self {
            Packet::Connect(_) => PacketType::Connect,
            Packet::ConnectAck(_) => PacketType::ConnectAck,
            Packet::Publish(_) => PacketType::Publish,
            Packet::PublishAck { .. } => PacketType::PublishAck,
            Packet::PublishReceived { .. } => PacketType::PublishReceived,
            Packet::PublishRelease { .. } => PacketType::PublishRelease,
            Packet::PublishComplete { .. } => PacketType::PublishComplete,
            Packet::UnsubscribeAck { .. } => PacketType::UnsubscribeAck,
            Packet::PingRequest => PacketType::PingRequest,
            Packet::PingResponse => PacketType::PingResponse,
            Packet::Disconnect => PacketType::Disconnect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_reason() {
        assert_eq!(ConnectAckReason::ConnectionAccepted.reason(), "Connection Accepted");
        assert_eq!(
            ConnectAckReason::UnacceptableProtocolVersion.reason(),
            "Connection Refused, unacceptable protocol version"
        );
        assert_eq!(
            ConnectAckReason::IdentifierRejected.reason(),
            "Connection Refused, identifier rejected"
        );
        assert_eq!(
            ConnectAckReason::ServiceUnavailable.reason(),
            "Connection Refused, Server unavailable"
        );
        assert_eq!(
            ConnectAckReason::BadUserNameOrPassword.reason(),
            "Connection Refused, bad user name or password"
        );
        assert_eq!(ConnectAckReason::NotAuthorized.reason(), "Connection Refused, not authorized");
    }

    #[test]
    fn test_ack_reason_pass_through() {
        for code in 0u8..=255 {
            let reason = ConnectAckReason::from(code);
            assert_eq!(u8::from(reason), code);
        }
        assert_eq!(ConnectAckReason::from(6), ConnectAckReason::Other(6));
    }
}
