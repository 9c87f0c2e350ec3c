//! Interactive chat surface for the knowledge base assistant.
//!
//! This module provides the glue around the core session and conversation
//! engines for the `kbase-chat` REPL:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`commands`]: slash command parsing and help text
//!
//! The stateful machinery (authentication, transcript, uploads) lives in the
//! library core; nothing here owns state beyond parsed configuration.

mod commands;
mod config;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
