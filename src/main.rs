//! # AskDoc — Document Q&A from the terminal
//!
//! Indexes one PDF and answers questions about it, either as a streamed
//! chat conversation or as raw similarity search over the indexed chunks.
//!
//! Usage:
//!   askdoc                          # Menu: 1 = chat, 2 = similarity search
//!   ASKDOC_DOCUMENT=path askdoc     # Index a different document
//!   RUST_LOG=askdoc=debug askdoc    # Diagnostic logging on stderr

mod chain;
mod mode;
mod repl;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use askdoc_core::config::ConfigStore;
use askdoc_core::error::AskdocError;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::mode::{Mode, Selection};

/// Document indexed when `ASKDOC_DOCUMENT` is not set, resolved against
/// the executable's directory first and the working directory second.
const DEFAULT_DOCUMENT: &str = "files/2025_state_of_ai_assisted_software_development.pdf";

#[derive(Parser)]
#[command(
    name = "askdoc",
    version,
    about = "📚 AskDoc — Document Q&A from the terminal"
)]
struct Cli {}

#[tokio::main]
async fn main() -> ExitCode {
    let _cli = Cli::parse();

    // Logging goes to stderr so it never interleaves with the conversation.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(code) => code,
        Err(e) => {
            println!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode> {
    let config = ConfigStore::load();
    if let Some(path) = config.dotenv_path() {
        tracing::debug!("loaded environment from {}", path.display());
    }
    let document = document_path(&config);

    println!("Select action:");
    println!("1. RAG Application (Chat)");
    println!("2. Similarity Search");
    print!("\nEnter choice (1 or 2): ");
    std::io::stdout().flush()?;

    // One buffered reader for the whole session; handing it to the question
    // loop keeps input buffered across the menu/loop boundary.
    let mut input = BufReader::new(tokio::io::stdin());
    let mut choice = String::new();
    input.read_line(&mut choice).await?;

    let selection = match Selection::parse(&choice) {
        Ok(selection) => selection,
        Err(e) => {
            println!("\n{e}");
            return Ok(ExitCode::from(2));
        }
    };

    println!(
        "\nInitializing {} with {}...",
        selection.label(),
        document.display()
    );
    let mut mode = match Mode::initialize(selection, &config, &document).await {
        Ok(mode) => mode,
        Err(e) => {
            if is_missing_document(&e) {
                println!("Error: {e:#}");
            } else {
                println!("An unexpected error occurred during initialization: {e:#}");
            }
            return Ok(ExitCode::FAILURE);
        }
    };

    println!("\nApplication Ready! Type 'exit' or 'quit' to stop.");
    println!("{}", "-".repeat(50));

    repl::run(input, std::io::stdout(), &mut mode).await?;
    Ok(ExitCode::SUCCESS)
}

/// The document to index: `ASKDOC_DOCUMENT` when set and non-empty, else
/// the bundled default next to the executable, else the default relative
/// to the working directory.
fn document_path(config: &ConfigStore) -> PathBuf {
    if let Some(path) = config.get("ASKDOC_DOCUMENT").filter(|v| !v.is_empty()) {
        return PathBuf::from(path);
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let bundled = dir.join(DEFAULT_DOCUMENT);
            if bundled.is_file() {
                return bundled;
            }
        }
    }
    PathBuf::from(DEFAULT_DOCUMENT)
}

/// True when the error chain bottoms out in a not-found document, which
/// gets a plain `Error:` line instead of the unexpected-error banner.
fn is_missing_document(e: &anyhow::Error) -> bool {
    e.chain().any(|cause| {
        cause.downcast_ref::<AskdocError>().is_some_and(|err| {
            matches!(err, AskdocError::Io(io) if io.kind() == std::io::ErrorKind::NotFound)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_document_detected_through_context() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "document not found");
        let err = anyhow::Error::from(AskdocError::Io(io)).context("indexing files/doc.pdf");
        assert!(is_missing_document(&err));
    }

    #[test]
    fn test_other_errors_are_not_missing_document() {
        let err = anyhow::Error::from(AskdocError::Provider("connection refused".into()));
        assert!(!is_missing_document(&err));
    }

    #[test]
    fn test_document_path_prefers_env_override() {
        let config = ConfigStore::load();
        unsafe { std::env::set_var("ASKDOC_DOCUMENT", "/tmp/custom.pdf") };
        assert_eq!(document_path(&config), PathBuf::from("/tmp/custom.pdf"));
        unsafe { std::env::remove_var("ASKDOC_DOCUMENT") };
        assert!(document_path(&config).ends_with(DEFAULT_DOCUMENT));
    }
}
