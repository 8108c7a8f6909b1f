//! Wire message shared by chat traffic and join/leave notices.

use serde::{Deserialize, Serialize};

/// Notice content broadcast when a member joins a room.
pub const JOINED_NOTICE: &str = "New user has joined";

/// Notice content broadcast when a member leaves a room.
pub const LEFT_NOTICE: &str = "User left the chat";

/// A single message as it crosses the WebSocket, in either direction.
///
/// Chat text and synthetic join/leave notices use the same shape; notices are
/// distinguished only by their fixed `content` literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub content: String,
    pub room_id: String,
    pub username: String,
}

impl ChatMessage {
    pub fn new(content: impl Into<String>, room_id: &str, username: &str) -> Self {
        Self {
            content: content.into(),
            room_id: room_id.to_string(),
            username: username.to_string(),
        }
    }

    /// Synthetic notice announcing that `username` joined `room_id`.
    pub fn joined(room_id: &str, username: &str) -> Self {
        Self::new(JOINED_NOTICE, room_id, username)
    }

    /// Synthetic notice announcing that `username` left `room_id`.
    pub fn left(room_id: &str, username: &str) -> Self {
        Self::new(LEFT_NOTICE, room_id, username)
    }

    /// Whether this message is one of the synthetic notices.
    pub fn is_notice(&self) -> bool {
        self.content == JOINED_NOTICE || self.content == LEFT_NOTICE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_camel_case_keys() {
        // given:
        let msg = ChatMessage::new("hi", "room-1", "alice");

        // when:
        let json = serde_json::to_string(&msg).unwrap();

        // then:
        assert_eq!(
            json,
            r#"{"content":"hi","roomId":"room-1","username":"alice"}"#
        );
    }

    #[test]
    fn test_deserializes_wire_shape() {
        // given:
        let json = r#"{"content":"hello","roomId":"r","username":"bob"}"#;

        // when:
        let msg: ChatMessage = serde_json::from_str(json).unwrap();

        // then:
        assert_eq!(msg, ChatMessage::new("hello", "r", "bob"));
    }

    #[test]
    fn test_notices_share_the_chat_shape() {
        // given / when:
        let joined = ChatMessage::joined("r", "alice");
        let left = ChatMessage::left("r", "alice");

        // then:
        assert!(joined.is_notice());
        assert!(left.is_notice());
        assert_eq!(joined.content, JOINED_NOTICE);
        assert_eq!(left.content, LEFT_NOTICE);
        assert!(!ChatMessage::new("User left the chat?", "r", "a").is_notice());
    }
}
