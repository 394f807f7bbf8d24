//! Chat broadcast event types
//!
//! Events flow through the per-group broadcast topic after the message row
//! is committed. Delivery is at-most-once-after-commit: a persisted message
//! whose broadcast finds no subscribers is simply not replayed.

use serde::{Deserialize, Serialize};

use crate::data::types::MessageWithAuthor;

/// Event published to a group's chat topic
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    MessageCreated {
        message: MessageWithAuthor,
    },
    MessageDeleted {
        message_id: String,
        group_id: String,
    },
    /// Ephemeral typing indicator, never persisted
    Typing {
        group_id: String,
        user_id: String,
        display_name: Option<String>,
    },
}

impl ChatEvent {
    /// Topic name for a group's chat stream
    pub fn topic_name(group_id: &str) -> String {
        format!("chat:{}", group_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_name() {
        assert_eq!(ChatEvent::topic_name("g1"), "chat:g1");
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = ChatEvent::Typing {
            group_id: "g1".into(),
            user_id: "u1".into(),
            display_name: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "typing");
        assert_eq!(json["group_id"], "g1");
    }
}
