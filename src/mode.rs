//! Application modes.
//!
//! One document, two ways to ask: Chat streams a generated answer grounded
//! in retrieved chunks; Search prints the raw matching chunks. The selected
//! mode is fixed for the process lifetime and never mutated after
//! initialization.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use askdoc_core::config::ConfigStore;
use askdoc_core::error::AskdocError;
use askdoc_core::traits::Embedder;
use askdoc_core::types::Document;
use askdoc_knowledge::{DocumentIndex, SplitConfig};
use askdoc_providers::OpenAiProvider;
use async_trait::async_trait;
use futures::StreamExt;

use crate::chain::{DEFAULT_TOP_K, QaChain};
use crate::repl::Handler;

/// A parsed menu selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Chat,
    Search,
}

impl Selection {
    /// Parse a menu line. Anything but the two selectors is a hard error,
    /// never retried.
    pub fn parse(input: &str) -> askdoc_core::Result<Self> {
        match input.trim() {
            "1" => Ok(Selection::Chat),
            "2" => Ok(Selection::Search),
            other => Err(AskdocError::InvalidSelection(other.to_string())),
        }
    }

    /// Menu label, also used in the initialization banner.
    pub fn label(self) -> &'static str {
        match self {
            Selection::Chat => "RAG Application (Chat)",
            Selection::Search => "Similarity Search",
        }
    }
}

/// The active application mode.
pub enum Mode {
    Chat(ChatMode),
    Search(SearchMode),
}

impl Mode {
    /// Build the selected mode: index the document and, for chat, attach
    /// the generation chain.
    pub async fn initialize(
        selection: Selection,
        config: &ConfigStore,
        document: &Path,
    ) -> Result<Self> {
        let provider =
            Arc::new(OpenAiProvider::from_config(config).context("provider configuration")?);
        let index = DocumentIndex::build(document, provider.as_ref(), &SplitConfig::default())
            .await
            .with_context(|| format!("indexing {}", document.display()))?;

        Ok(match selection {
            Selection::Chat => Mode::Chat(ChatMode {
                chain: QaChain::new(index, provider.clone(), provider),
            }),
            Selection::Search => Mode::Search(SearchMode {
                index,
                embedder: provider,
            }),
        })
    }

    /// Answer one question in this mode's output format.
    pub async fn run_turn(&self, question: &str) -> Result<()> {
        match self {
            Mode::Chat(chat) => chat.run_turn(question).await,
            Mode::Search(search) => search.run_turn(question).await,
        }
    }
}

#[async_trait]
impl Handler for Mode {
    async fn handle(&mut self, question: &str) -> Result<()> {
        self.run_turn(question).await
    }
}

/// Chat: retrieval-augmented generation over the document.
pub struct ChatMode {
    chain: QaChain,
}

impl ChatMode {
    /// Stream the answer, printing each fragment as it arrives.
    async fn run_turn(&self, question: &str) -> Result<()> {
        let mut stream = self.chain.ask_stream(question).await?;

        print!("Bot: ");
        std::io::stdout().flush()?;
        while let Some(fragment) = stream.next().await {
            match fragment {
                Ok(text) => {
                    print!("{text}");
                    std::io::stdout().flush()?;
                }
                Err(e) => {
                    // Partial output stays on screen; the loop reports the error.
                    println!();
                    return Err(e.into());
                }
            }
        }
        println!();
        Ok(())
    }
}

/// Search: raw top-k chunks, no generation chain.
pub struct SearchMode {
    index: DocumentIndex,
    embedder: Arc<dyn Embedder>,
}

impl SearchMode {
    /// Top-`k` chunks for `question`, descending similarity. An empty index
    /// answers empty without touching the embedder.
    pub async fn handle(&self, question: &str, k: usize) -> askdoc_core::Result<Vec<Document>> {
        let hits = self.index.search(self.embedder.as_ref(), question, k).await?;
        Ok(hits.into_iter().map(|(_, document)| document).collect())
    }

    async fn run_turn(&self, question: &str) -> Result<()> {
        println!("\nSearching for documents similar to: '{question}'...\n");
        let documents = self.handle(question, DEFAULT_TOP_K).await?;
        print_documents(&documents, &mut std::io::stdout())?;
        Ok(())
    }
}

/// Numbered blocks with a rule line after each document and one blank line
/// closing the listing.
fn print_documents(documents: &[Document], out: &mut impl Write) -> std::io::Result<()> {
    if documents.is_empty() {
        writeln!(out, "No relevant documents found.")?;
        return Ok(());
    }
    for (i, document) in documents.iter().enumerate() {
        writeln!(out, "--- Document {} ---", i + 1)?;
        writeln!(out, "{}", document.content)?;
        writeln!(out, "{}", "-".repeat(20))?;
    }
    writeln!(out)?;
    Ok(())
}
