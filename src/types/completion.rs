use serde::{Deserialize, Serialize};

/// Parameters for a chat-completion request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionRequest {
    /// The user's message text.
    pub message: String,

    /// Server-assigned conversation correlation id; absent on the first turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl CompletionRequest {
    /// Create a new `CompletionRequest` with no session identifier.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: None,
        }
    }

    /// Sets the session identifier to carry forward.
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// A chat-completion response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionResponse {
    /// The assistant's answer text.
    pub answer: String,

    /// The conversation correlation id to carry on subsequent turns.
    pub session_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn request_without_session_id() {
        let request = CompletionRequest::new("What is the refund policy?");
        let json = to_value(&request).unwrap();

        assert_eq!(
            json,
            json!({
                "message": "What is the refund policy?"
            })
        );
    }

    #[test]
    fn request_with_session_id() {
        let request = CompletionRequest::new("And for hardware?").with_session_id("s1");
        let json = to_value(&request).unwrap();

        assert_eq!(
            json,
            json!({
                "message": "And for hardware?",
                "session_id": "s1"
            })
        );
    }

    #[test]
    fn response_parses() {
        let response: CompletionResponse = serde_json::from_str(
            r#"{"answer": "Thirty days.", "session_id": "session_7_1234"}"#,
        )
        .unwrap();
        assert_eq!(response.answer, "Thirty days.");
        assert_eq!(response.session_id, "session_7_1234");
    }

    #[test]
    fn response_requires_session_id() {
        let result = serde_json::from_str::<CompletionResponse>(r#"{"answer": "Thirty days."}"#);
        assert!(result.is_err());
    }
}
