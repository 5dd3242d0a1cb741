//! Channel event vocabulary
//!
//! Every event travels as `{"event": "<name>", "payload": <data>}`.
//! `delete_message` is used in both directions: the view emits it to ask
//! for a deletion and listens for it as a deletion notice.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{ChatMessage, MessageId};

/// Name of a channel event, used to register listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    SendMessage,
    ReceiveMessage,
    UpdateMessage,
    DeleteMessage,
}

impl EventName {
    /// Name used on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            EventName::SendMessage => "send_message",
            EventName::ReceiveMessage => "receive_message",
            EventName::UpdateMessage => "update_message",
            EventName::DeleteMessage => "delete_message",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event carried by a channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum Event {
    /// Request to broadcast a new message
    SendMessage(ChatMessage),
    /// A message from any origin to append
    ReceiveMessage(ChatMessage),
    /// Full replacement of an existing message with the same id
    UpdateMessage(ChatMessage),
    /// Delete a message by id
    DeleteMessage(MessageId),
}

impl Event {
    pub fn name(&self) -> EventName {
        match self {
            Event::SendMessage(_) => EventName::SendMessage,
            Event::ReceiveMessage(_) => EventName::ReceiveMessage,
            Event::UpdateMessage(_) => EventName::UpdateMessage,
            Event::DeleteMessage(_) => EventName::DeleteMessage,
        }
    }

    /// Serialize event to JSON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize event from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChatMessage {
        ChatMessage::new(MessageId(1), "lobby", "alice", "Hello", "12:0")
    }

    #[test]
    fn test_event_names_match_wire_tags() {
        let events = [
            Event::SendMessage(sample()),
            Event::ReceiveMessage(sample()),
            Event::UpdateMessage(sample()),
            Event::DeleteMessage(MessageId(1)),
        ];

        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["event"], event.name().as_str());
        }
    }

    #[test]
    fn test_delete_payload_is_bare_id() {
        let bytes = Event::DeleteMessage(MessageId(42)).to_bytes().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(json, serde_json::json!({"event": "delete_message", "payload": 42}));
    }

    #[test]
    fn test_decode_receive_event() {
        let raw = br#"{"event":"receive_message","payload":{"id":5,"room":"1","author":"bob","message":"yo","time":"8:7"}}"#;

        match Event::from_bytes(raw).unwrap() {
            Event::ReceiveMessage(m) => {
                assert_eq!(m.id, MessageId(5));
                assert_eq!(m.author, "bob");
            }
            other => panic!("Wrong event: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_event_rejected() {
        let raw = br#"{"event":"join_room","payload":"1"}"#;
        assert!(Event::from_bytes(raw).is_err());
    }
}
