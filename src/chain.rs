//! Retrieval-augmented generation chain.

use std::sync::Arc;

use askdoc_core::error::Result;
use askdoc_core::traits::{ChatModel, Embedder};
use askdoc_core::types::{Document, Message, ReplyStream};
use askdoc_knowledge::DocumentIndex;
use futures::stream;

/// Chunks retrieved per question, in either mode.
pub const DEFAULT_TOP_K: usize = 4;

/// Embed the question, pull the top-k chunks, and stream a grounded answer
/// from the chat model.
pub struct QaChain {
    index: DocumentIndex,
    embedder: Arc<dyn Embedder>,
    model: Arc<dyn ChatModel>,
    top_k: usize,
}

impl QaChain {
    pub fn new(index: DocumentIndex, embedder: Arc<dyn Embedder>, model: Arc<dyn ChatModel>) -> Self {
        Self {
            index,
            embedder,
            model,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Stream an answer for `question` grounded in retrieved context.
    ///
    /// An empty index produces a canned reply without calling the model.
    pub async fn ask_stream(&self, question: &str) -> Result<ReplyStream> {
        let hits = self
            .index
            .search(self.embedder.as_ref(), question, self.top_k)
            .await?;

        if hits.is_empty() {
            let reply: Result<String> =
                Ok("I could not find anything relevant in the document.".to_string());
            return Ok(Box::pin(stream::iter(vec![reply])));
        }

        tracing::debug!(retrieved = hits.len(), best = %hits[0].0, "retrieved context");
        let messages = build_messages(question, &hits);
        self.model.chat_stream(&messages).await
    }
}

/// Assemble the system/user message pair for one question.
fn build_messages(question: &str, hits: &[(f32, Document)]) -> Vec<Message> {
    let context = hits
        .iter()
        .map(|(_, doc)| doc.content.as_str())
        .collect::<Vec<_>>()
        .join("\n---\n");

    let system = format!(
        "You are a helpful assistant answering questions about a document.\n\
         Answer using only the context below. If the context does not contain \
         the answer, say you don't know.\n\nContext:\n{context}"
    );

    vec![Message::system(system), Message::user(question)]
}
