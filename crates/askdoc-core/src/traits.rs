//! Seams between the retrieval pipeline and its model backends.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Message, ReplyStream};

/// Turns batches of texts into embedding vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed `texts`: one vector per input, in input order, all of one
    /// dimension.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Produces streamed chat completions.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier, for logs.
    fn model(&self) -> &str;

    /// Stream the assistant reply for `messages`, fragment by fragment.
    /// Dropping the stream stops the transfer.
    async fn chat_stream(&self, messages: &[Message]) -> Result<ReplyStream>;
}
