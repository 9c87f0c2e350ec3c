use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Role type for a transcript entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

/// A single transcript entry.
///
/// Messages are immutable once appended to a transcript; ordering is append
/// order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// The role of the message.
    pub role: MessageRole,

    /// The text content of the message.
    pub content: String,

    /// When the message was appended.
    #[serde(with = "crate::utils::time")]
    pub created_at: OffsetDateTime,

    /// Optional stable identifier assigned by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Message {
    /// Create a new `Message` with the given role and content, stamped with
    /// the current wall-clock time.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: OffsetDateTime::now_utc(),
            id: None,
        }
    }

    /// Create a new user `Message`.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create a new assistant `Message`.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Attaches a stable identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::to_value;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(to_value(MessageRole::User).unwrap(), "user");
        assert_eq!(to_value(MessageRole::Assistant).unwrap(), "assistant");
    }

    #[test]
    fn constructors_set_role() {
        let user = Message::user("hello");
        assert_eq!(user.role, MessageRole::User);
        assert_eq!(user.content, "hello");
        assert!(user.id.is_none());

        let assistant = Message::assistant("hi").with_id("m-1");
        assert_eq!(assistant.role, MessageRole::Assistant);
        assert_eq!(assistant.id.as_deref(), Some("m-1"));
    }

    #[test]
    fn id_omitted_when_absent() {
        let json = to_value(Message::user("hello")).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("created_at").is_some());
    }

    #[test]
    fn message_round_trips() {
        let message = Message {
            role: MessageRole::Assistant,
            content: "formatted *text*".to_string(),
            created_at: time::macros::datetime!(2025-02-11 09:15:00 UTC),
            id: Some("m-2".to_string()),
        };
        let json = serde_json::to_string(&message).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back, message);
    }
}
