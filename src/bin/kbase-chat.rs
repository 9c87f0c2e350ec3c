//! Interactive chat with the knowledge base assistant.
//!
//! This binary provides a REPL for conversing with a knowledge base service:
//! it signs the user in, keeps the transcript, and uploads documents for
//! ingestion.
//!
//! # Usage
//!
//! ```bash
//! # Talk to the service named by $KBASE_URL
//! kbase-chat
//!
//! # Point at a specific deployment
//! kbase-chat --url https://kb.example.com
//!
//! # Disable colors (useful for piping output)
//! kbase-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/login` / `/logout` - Manage the session
//! - `/attach <path>` then `/upload` - Ingest a document
//! - `/reset` - Clear the conversation back to the greeting
//! - `/quit` - Exit the application

use std::sync::Arc;

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use kbase::chat::{ChatArgs, ChatCommand, ChatConfig, help_text, parse_command};
use kbase::{
    Attachment, AttachmentPipeline, Conversation, CredentialStore, KnowledgeBase, MessageRole,
    PlainTextRenderer, Renderer, SessionController, Transport,
};

/// Main entry point for the kbase-chat application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("kbase-chat [OPTIONS]");
    let config = ChatConfig::from(args);

    let credentials = match &config.credentials_path {
        Some(path) => CredentialStore::with_path(path.clone()),
        None => CredentialStore::open_default()?,
    };
    let client = KnowledgeBase::with_options(
        credentials.clone(),
        config.base_url.clone(),
        Some(config.timeout),
    )?;
    let base_url = client.base_url().to_string();

    let transport: Arc<dyn Transport> = Arc::new(client);
    let mut session = SessionController::new(Arc::clone(&transport), credentials);
    session.probe();
    let mut conversation = Conversation::new(Arc::clone(&transport));
    let mut attachments = AttachmentPipeline::new(Arc::clone(&transport));
    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let mut rl = DefaultEditor::new()?;

    println!("Knowledge Base Assistant ({base_url})");
    println!("Type /help for commands, /quit to exit\n");

    if !session.is_authenticated() && !prompt_login(&mut session, &mut rl, &mut renderer).await? {
        return Ok(());
    }

    println!("Assistant:");
    for message in conversation.transcript() {
        renderer.print_message(message);
    }

    loop {
        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(trimmed);

                // Check for slash commands
                if let Some(cmd) = parse_command(trimmed) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Login => {
                            if !prompt_login(&mut session, &mut rl, &mut renderer).await? {
                                println!("\nGoodbye!");
                                break;
                            }
                        }
                        ChatCommand::Logout => match session.logout() {
                            Ok(()) => renderer.print_info("Logged out."),
                            Err(err) => {
                                renderer.print_error(&format!("Failed to log out: {}", err))
                            }
                        },
                        ChatCommand::Attach(path) => match Attachment::from_path(&path) {
                            Ok(attachment) => {
                                renderer.print_info(&format!(
                                    "Selected {} ({} bytes)",
                                    attachment.name(),
                                    attachment.len()
                                ));
                                attachments.select(attachment);
                            }
                            Err(err) => renderer.print_error(&err.to_string()),
                        },
                        ChatCommand::Upload => match attachments.upload(&mut session).await {
                            Ok(receipt) => renderer.print_info(&format!(
                                "File uploaded successfully! ({}, {} bytes)",
                                receipt.filename, receipt.size
                            )),
                            Err(err) => renderer
                                .print_error(&format!("Failed to upload file: {}", err)),
                        },
                        ChatCommand::Selection => match attachments.selected() {
                            Some(attachment) => renderer.print_info(&format!(
                                "Selected: {} ({} bytes)",
                                attachment.name(),
                                attachment.len()
                            )),
                            None => renderer.print_info("No file selected."),
                        },
                        ChatCommand::Reset => {
                            conversation.reset();
                            renderer.print_info("Conversation reset.");
                            println!("Assistant:");
                            for message in conversation.transcript() {
                                renderer.print_message(message);
                            }
                        }
                        ChatCommand::Stats => {
                            print_stats(&session, &conversation, &attachments);
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                // Regular message - send to the service
                let before = conversation.transcript().len();
                conversation.send(&mut session, &line).await;
                println!("Assistant:");
                for message in &conversation.transcript()[before..] {
                    if message.role == MessageRole::Assistant {
                        renderer.print_message(message);
                    }
                }
                if !session.is_authenticated() {
                    renderer.print_info("Session expired. Use /login to sign in again.");
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - clear the line and continue
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

/// Prompt for credentials until a login succeeds.
///
/// Returns `Ok(false)` when the user gives up with Ctrl+D.
async fn prompt_login(
    session: &mut SessionController,
    rl: &mut DefaultEditor,
    renderer: &mut PlainTextRenderer,
) -> Result<bool, Box<dyn std::error::Error>> {
    loop {
        let username = match rl.readline("Username: ") {
            Ok(line) => line.trim().to_string(),
            Err(ReadlineError::Interrupted) => {
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => return Ok(false),
            Err(err) => return Err(Box::new(err)),
        };
        if username.is_empty() {
            continue;
        }

        let password = match rl.readline("Password: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => return Ok(false),
            Err(err) => return Err(Box::new(err)),
        };

        match session.login(&username, &password).await {
            Ok(()) => {
                renderer.print_info("Login successful.\n");
                return Ok(true);
            }
            Err(err) => renderer.print_error(&err.to_string()),
        }
    }
}

fn print_stats(
    session: &SessionController,
    conversation: &Conversation,
    attachments: &AttachmentPipeline,
) {
    println!("    Session Statistics:");
    println!("      Authentication: {}", session.state());
    println!("      Messages: {}", conversation.transcript().len());
    match conversation.session_id() {
        Some(id) => println!("      Session id: {}", id),
        None => println!("      Session id: (none yet)"),
    }
    println!(
        "      Send in flight: {}",
        if conversation.is_pending() { "yes" } else { "no" }
    );
    match attachments.selected() {
        Some(attachment) => println!(
            "      Selected file: {} ({} bytes)",
            attachment.name(),
            attachment.len()
        ),
        None => println!("      Selected file: (none)"),
    }
    println!(
        "      Upload in flight: {}",
        if attachments.is_pending() { "yes" } else { "no" }
    );
}
