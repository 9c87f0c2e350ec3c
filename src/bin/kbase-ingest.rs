//! One-shot document upload for the knowledge base.
//!
//! This binary uploads documents for ingestion without entering the chat
//! REPL. It reuses the credential stored by `kbase-chat`.
//!
//! # Usage
//!
//! ```bash
//! # Upload one or more documents
//! kbase-ingest handbook.docx inventory.xlsx
//!
//! # Point at a specific deployment
//! kbase-ingest --url https://kb.example.com handbook.docx
//! ```

use std::sync::Arc;

use arrrg::CommandLine;
use arrrg_derive::CommandLine;

use kbase::{
    Attachment, AttachmentPipeline, CredentialStore, KnowledgeBase, SessionController, Transport,
};

/// Command-line arguments for the kbase-ingest tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
struct Args {
    /// Base URL of the knowledge base service.
    #[arrrg(optional, "Base URL of the service (default: $KBASE_URL)", "URL")]
    url: Option<String>,

    /// Credential file path.
    #[arrrg(optional, "Credential file (default: per-user config dir)", "PATH")]
    credentials: Option<String>,
}

/// Main entry point for the kbase-ingest application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, files) = Args::from_command_line_relaxed("kbase-ingest [OPTIONS] FILE...");
    if files.is_empty() {
        eprintln!("kbase-ingest: no files to upload");
        std::process::exit(1);
    }

    let credentials = match &args.credentials {
        Some(path) => CredentialStore::with_path(path),
        None => CredentialStore::open_default()?,
    };
    let client = KnowledgeBase::with_options(credentials.clone(), args.url.clone(), None)?;
    let transport: Arc<dyn Transport> = Arc::new(client);

    let mut session = SessionController::new(Arc::clone(&transport), credentials);
    session.probe();
    if !session.is_authenticated() {
        eprintln!("kbase-ingest: not signed in; run kbase-chat and /login first");
        std::process::exit(1);
    }

    let mut pipeline = AttachmentPipeline::new(transport);
    let mut failures = 0usize;
    for file in &files {
        let attachment = match Attachment::from_path(file) {
            Ok(attachment) => attachment,
            Err(err) => {
                eprintln!("{}: {}", file, err);
                failures += 1;
                continue;
            }
        };
        pipeline.select(attachment);
        match pipeline.upload(&mut session).await {
            Ok(receipt) => {
                println!("{}: uploaded as {} ({} bytes)", file, receipt.filename, receipt.size);
            }
            Err(err) => {
                eprintln!("{}: {}", file, err);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}
