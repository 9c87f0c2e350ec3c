//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the session without sending messages to the
//! service.

/// A parsed chat command.
///
/// These commands control the session and are never sent to the service.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Prompt for credentials and sign in.
    Login,

    /// Drop the credential and sign out.
    Logout,

    /// Select a file for upload.
    Attach(String),

    /// Upload the selected file.
    Upload,

    /// Show the current selection.
    Selection,

    /// Clear the conversation back to the greeting.
    Reset,

    /// Display session statistics.
    Stats,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use kbase::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/attach notes.docx").is_some());
/// assert!(parse_command("What is the refund policy?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "login" => ChatCommand::Login,
        "logout" => ChatCommand::Logout,
        "attach" | "file" => match argument {
            Some(path) => ChatCommand::Attach(path.to_string()),
            None => ChatCommand::Invalid("/attach requires a file path".to_string()),
        },
        "upload" => ChatCommand::Upload,
        "selection" => ChatCommand::Selection,
        "reset" | "clear" => ChatCommand::Reset,
        "stats" | "status" => ChatCommand::Stats,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /login                 Sign in with a username and password
  /logout                Sign out and drop the stored credential
  /attach <path>         Select a file for upload (replaces any selection)
  /upload                Upload the selected file
  /selection             Show the current selection
  /reset                 Clear the conversation back to the greeting
  /stats                 Show session statistics
  /help                  Show this help message
  /quit                  Exit the chat"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quit_commands() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /quit  "), Some(ChatCommand::Quit));
    }

    #[test]
    fn parse_login_logout() {
        assert_eq!(parse_command("/login"), Some(ChatCommand::Login));
        assert_eq!(parse_command("/logout"), Some(ChatCommand::Logout));
    }

    #[test]
    fn parse_attach() {
        assert_eq!(
            parse_command("/attach handbook.docx"),
            Some(ChatCommand::Attach("handbook.docx".to_string()))
        );
        assert_eq!(
            parse_command("/file  notes.xlsx "),
            Some(ChatCommand::Attach("notes.xlsx".to_string()))
        );
        assert_eq!(
            parse_command("/attach"),
            Some(ChatCommand::Invalid(
                "/attach requires a file path".to_string()
            ))
        );
    }

    #[test]
    fn parse_upload_and_selection() {
        assert_eq!(parse_command("/upload"), Some(ChatCommand::Upload));
        assert_eq!(parse_command("/selection"), Some(ChatCommand::Selection));
    }

    #[test]
    fn parse_reset() {
        assert_eq!(parse_command("/reset"), Some(ChatCommand::Reset));
        assert_eq!(parse_command("/clear"), Some(ChatCommand::Reset));
        assert_eq!(parse_command("/RESET"), Some(ChatCommand::Reset));
    }

    #[test]
    fn parse_stats_and_help() {
        assert_eq!(parse_command("/stats"), Some(ChatCommand::Stats));
        assert_eq!(parse_command("/status"), Some(ChatCommand::Stats));
        assert_eq!(parse_command("/help"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
    }

    #[test]
    fn unknown_commands_are_invalid() {
        assert!(matches!(
            parse_command("/frobnicate"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("frobnicate")
        ));
    }

    #[test]
    fn non_commands() {
        assert_eq!(parse_command("What is the refund policy?"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
    }

    #[test]
    fn help_text_not_empty() {
        let help = help_text();
        assert!(!help.is_empty());
        assert!(help.contains("/quit"));
        assert!(help.contains("/login"));
        assert!(help.contains("/attach"));
        assert!(help.contains("/reset"));
    }
}
