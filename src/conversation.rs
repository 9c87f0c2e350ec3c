//! Conversation transcript management.
//!
//! [`Conversation`] owns the ordered, append-only transcript and the
//! single-flight send state. The user entry is appended optimistically before
//! the network round-trip; every outcome, including failure, closes the turn
//! with an assistant entry so the transcript always reflects exactly what the
//! user saw.

use std::sync::Arc;

use crate::client::Transport;
use crate::error::Result;
use crate::observability;
use crate::session::SessionController;
use crate::types::{CompletionRequest, CompletionResponse, Message};

/// The assistant entry every transcript starts with.
pub const GREETING: &str =
    "Hello! I am your Knowledge Base Assistant. How can I help you today?";

/// The assistant entry that closes a failed turn.
pub const FAILURE_NOTICE: &str = "Sorry, I encountered an error. Please try again.";

/// A conversation with the knowledge base assistant.
pub struct Conversation {
    transport: Arc<dyn Transport>,
    transcript: Vec<Message>,
    session_id: Option<String>,
    pending: bool,
}

impl Conversation {
    /// Creates a new conversation seeded with the greeting.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            transcript: vec![Message::assistant(GREETING)],
            session_id: None,
            pending: false,
        }
    }

    /// Send a user message and append the assistant's reply.
    ///
    /// A whitespace-only input, or a call while a send is already pending, is
    /// a no-op. Otherwise the user entry is appended immediately; the closing
    /// assistant entry is either the answer or the generic failure notice.
    /// An `Unauthorized` classification additionally invalidates the session.
    pub async fn send(&mut self, session: &mut SessionController, input: &str) {
        if input.trim().is_empty() || self.pending {
            return;
        }

        self.pending = true;
        observability::SENDS.click();
        self.transcript.push(Message::user(input));

        let outcome = self.request_completion(session, input).await;
        match outcome {
            Ok(response) => {
                self.session_id = Some(response.session_id);
                self.transcript.push(Message::assistant(response.answer));
            }
            Err(err) => {
                observability::SEND_FAILURES.click();
                if err.is_unauthorized() {
                    session.invalidate();
                }
                self.transcript.push(Message::assistant(FAILURE_NOTICE));
            }
        }

        self.pending = false;
    }

    async fn request_completion(
        &self,
        session: &SessionController,
        input: &str,
    ) -> Result<CompletionResponse> {
        session.require_authenticated()?;
        let mut request = CompletionRequest::new(input);
        request.session_id = self.session_id.clone();
        self.transport.complete(&request).await
    }

    /// Restore the seeded greeting and forget the session identifier.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.transcript.push(Message::assistant(GREETING));
        self.session_id = None;
    }

    /// Returns the transcript in append order.
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Returns true if a send is in flight.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Returns the server-assigned session identifier, once one has been
    /// adopted.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}
