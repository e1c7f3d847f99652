use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Sender;

/// One transcript entry. Immutable once appended: a transcript only ever
/// grows or is replaced wholesale, never edited in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    /// Capture time. Display metadata only, never an ordering key.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// A user message captured now. Callers validate non-emptiness first.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: Sender::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// An assistant message stamped with the server's reply time.
    pub fn assistant(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: Sender::Assistant,
            text: text.into(),
            timestamp,
        }
    }
}

/// Reply payload from one chat exchange with the assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantReply {
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_gets_fresh_identity() {
        let a = Message::user("hello");
        let b = Message::user("hello");
        assert_ne!(a.id, b.id);
        assert_eq!(a.sender, Sender::User);
    }

    #[test]
    fn assistant_message_keeps_server_timestamp() {
        let stamp = "2024-01-15T10:30:00Z".parse::<DateTime<Utc>>().unwrap();
        let msg = Message::assistant("This indicates normal results.", stamp);
        assert_eq!(msg.timestamp, stamp);
        assert_eq!(msg.sender, Sender::Assistant);
    }

    #[test]
    fn message_serializes_sender_as_string() {
        let msg = Message::user("hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["sender"], "user");
        assert_eq!(json["text"], "hi");
    }
}
