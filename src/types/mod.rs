// Public modules
pub mod completion;
pub mod message;
pub mod token;
pub mod upload;

// Re-exports
pub use completion::{CompletionRequest, CompletionResponse};
pub use message::{Message, MessageRole};
pub use token::TokenResponse;
pub use upload::FileInfo;
