//! Chat message model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

/// Identifier of a chat message.
///
/// Assigned by the sending client from the epoch milliseconds at creation
/// time and serialized as a bare JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl MessageId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(MessageId)
    }
}

impl From<u64> for MessageId {
    fn from(value: u64) -> Self {
        MessageId(value)
    }
}

/// A chat message in a room
///
/// Field names on the wire follow the existing peers: `text` travels as
/// `message` and `timestamp` as `time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub room: String,
    pub author: String,
    #[serde(rename = "message")]
    pub text: String,
    #[serde(rename = "time")]
    pub timestamp: String,
}

impl ChatMessage {
    pub fn new(
        id: MessageId,
        room: impl Into<String>,
        author: impl Into<String>,
        text: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id,
            room: room.into(),
            author: author.into(),
            text: text.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Whether `username` wrote this message
    pub fn is_authored_by(&self, username: &str) -> bool {
        self.author == username
    }
}

/// Format a wall-clock time as `H:M` without zero padding (9:05 renders as `9:5`)
pub fn format_clock<Tz: TimeZone>(time: &DateTime<Tz>) -> String {
    format!("{}:{}", time.hour(), time.minute())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_format_clock_no_padding() {
        let t = DateTime::parse_from_rfc3339("2024-03-01T09:05:00+00:00").unwrap();
        assert_eq!(format_clock(&t), "9:5");

        let t = DateTime::parse_from_rfc3339("2024-03-01T23:45:00+00:00").unwrap();
        assert_eq!(format_clock(&t), "23:45");

        let t = DateTime::parse_from_rfc3339("2024-03-01T00:00:00+00:00").unwrap();
        assert_eq!(format_clock(&t), "0:0");
    }

    #[test]
    fn test_wire_field_names() {
        let msg = ChatMessage::new(MessageId(1700000000000), "lobby", "alice", "hi", "9:5");
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["id"], 1700000000000u64);
        assert_eq!(json["room"], "lobby");
        assert_eq!(json["author"], "alice");
        assert_eq!(json["message"], "hi");
        assert_eq!(json["time"], "9:5");
        assert!(json.get("text").is_none());
    }

    #[test]
    fn test_decode_peer_payload() {
        let raw = r#"{"id":5,"room":"1","author":"bob","message":"yo","time":"14:3"}"#;
        let msg: ChatMessage = serde_json::from_str(raw).unwrap();

        assert_eq!(msg.id, MessageId(5));
        assert_eq!(msg.text, "yo");
        assert!(msg.is_authored_by("bob"));
        assert!(!msg.is_authored_by("alice"));
    }

    #[test]
    fn test_missing_id_rejected() {
        let raw = r#"{"room":"1","author":"bob","message":"yo","time":"14:3"}"#;
        assert!(serde_json::from_str::<ChatMessage>(raw).is_err());
    }

    #[test]
    fn test_message_id_parse() {
        assert_eq!(" 42 ".parse::<MessageId>().unwrap(), MessageId(42));
        assert!("abc".parse::<MessageId>().is_err());
        assert_eq!(MessageId(7).to_string(), "7");
    }
}
