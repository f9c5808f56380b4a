//! Unified OpenAI-compatible provider.
//!
//! One struct covers batched embeddings and streamed chat completions for
//! any OpenAI-compatible API. Endpoints are distinguished only by base URL,
//! API key, and model names.

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use askdoc_core::config::ConfigStore;
use askdoc_core::error::{AskdocError, Result};
use askdoc_core::traits::{ChatModel, Embedder};
use askdoc_core::types::{Message, ReplyStream};

/// Hosted OpenAI endpoint; an API key is mandatory here.
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// A provider that works with any OpenAI-compatible API.
pub struct OpenAiProvider {
    /// Base URL (e.g. "https://api.openai.com/v1").
    base_url: String,
    /// Bearer token; empty for keyless local endpoints.
    api_key: String,
    /// Chat model id.
    chat_model: String,
    /// Embedding model id.
    embedding_model: String,
    /// HTTP client.
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Create from configuration.
    ///
    /// Resolution:
    /// - Base URL: `LLM_API_BASE`, default hosted OpenAI.
    /// - API key: `OPENAI_API_KEY` — required for the hosted default,
    ///   optional for self-hosted endpoints.
    /// - Models: `LLM_MODEL` for chat, `EMBEDDING_MODEL` for embeddings.
    pub fn from_config(config: &ConfigStore) -> Result<Self> {
        let base_url = config
            .get_or("LLM_API_BASE", OPENAI_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        let api_key = if base_url == OPENAI_BASE_URL {
            config.require("OPENAI_API_KEY")?
        } else {
            config.get("OPENAI_API_KEY").unwrap_or_default()
        };

        Ok(Self::from_parts(
            base_url,
            api_key,
            config.get_or("LLM_MODEL", "gpt-4o-mini"),
            config.get_or("EMBEDDING_MODEL", "text-embedding-3-small"),
        ))
    }

    /// Create from already-resolved values.
    pub fn from_parts(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        chat_model: impl Into<String>,
        embedding_model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            chat_model: chat_model.into(),
            embedding_model: embedding_model.into(),
            client: reqwest::Client::new(),
        }
    }

    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.is_empty() {
            req
        } else {
            req.header("Authorization", format!("Bearer {}", self.api_key))
        }
    }
}

#[async_trait]
impl Embedder for OpenAiProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embeddings", self.base_url);
        let body = json!({
            "model": self.embedding_model,
            "input": texts,
        });

        let req = self.client.post(&url).json(&body);
        let resp = self
            .apply_auth(req)
            .send()
            .await
            .map_err(|e| AskdocError::Http(format!("connection failed ({url}): {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(AskdocError::Provider(format!(
                "embeddings API error {status}: {text}"
            )));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| AskdocError::Http(e.to_string()))?;
        let vectors = parse_embeddings(&json, texts.len())?;
        tracing::debug!(inputs = texts.len(), model = %self.embedding_model, "embedded batch");
        Ok(vectors)
    }
}

#[async_trait]
impl ChatModel for OpenAiProvider {
    fn model(&self) -> &str {
        &self.chat_model
    }

    async fn chat_stream(&self, messages: &[Message]) -> Result<ReplyStream> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.chat_model,
            "messages": messages,
            "stream": true,
        });

        let req = self.client.post(&url).json(&body);
        let resp = self
            .apply_auth(req)
            .send()
            .await
            .map_err(|e| AskdocError::Http(format!("connection failed ({url}): {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(AskdocError::Provider(format!(
                "chat API error {status}: {text}"
            )));
        }

        tracing::debug!(model = %self.chat_model, "streaming completion");
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(pump_sse(resp, tx));
        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

/// Forward content fragments from the SSE body to `tx` until `[DONE]`, the
/// connection closes, or the receiver is dropped.
async fn pump_sse(resp: reqwest::Response, tx: mpsc::Sender<Result<String>>) {
    let mut body = resp.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(piece) = body.next().await {
        let piece = match piece {
            Ok(piece) => piece,
            Err(e) => {
                let _ = tx
                    .send(Err(AskdocError::Http(format!("stream failed: {e}"))))
                    .await;
                return;
            }
        };
        buffer.extend_from_slice(&piece);

        while let Some(line) = take_line(&mut buffer) {
            match parse_sse_line(&line) {
                SseEvent::Fragment(text) => {
                    if tx.send(Ok(text)).await.is_err() {
                        return; // consumer dropped the stream
                    }
                }
                SseEvent::Done => return,
                SseEvent::Skip => {}
            }
        }
    }
}

/// Pop the first complete line off `buffer`. The tail may be a partial
/// frame; it stays buffered until more bytes arrive.
fn take_line(buffer: &mut Vec<u8>) -> Option<String> {
    let pos = buffer.iter().position(|&b| b == b'\n')?;
    let line: Vec<u8> = buffer.drain(..=pos).collect();
    Some(String::from_utf8_lossy(&line).trim().to_string())
}

/// One parsed server-sent-events line.
#[derive(Debug, PartialEq)]
enum SseEvent {
    /// A content delta to surface.
    Fragment(String),
    /// The `data: [DONE]` terminator.
    Done,
    /// Blank keep-alives, comments, frames without content.
    Skip,
}

fn parse_sse_line(line: &str) -> SseEvent {
    let Some(data) = line.strip_prefix("data:") else {
        return SseEvent::Skip;
    };
    let data = data.trim();
    if data == "[DONE]" {
        return SseEvent::Done;
    }
    match serde_json::from_str::<Value>(data) {
        Ok(event) => match event["choices"][0]["delta"]["content"].as_str() {
            Some(text) if !text.is_empty() => SseEvent::Fragment(text.to_string()),
            _ => SseEvent::Skip,
        },
        Err(_) => SseEvent::Skip,
    }
}

/// Pull `data[].embedding` out of an embeddings response, reordered by the
/// `index` field; the endpoint may answer out of order.
fn parse_embeddings(json: &Value, expected: usize) -> Result<Vec<Vec<f32>>> {
    let data = json["data"]
        .as_array()
        .ok_or_else(|| AskdocError::Provider("no data in embeddings response".into()))?;

    let mut vectors: Vec<Vec<f32>> = vec![Vec::new(); expected];
    for item in data {
        let index = item["index"].as_u64().unwrap_or_default() as usize;
        let embedding: Vec<f32> = item["embedding"]
            .as_array()
            .ok_or_else(|| AskdocError::Provider("malformed embedding in response".into()))?
            .iter()
            .filter_map(Value::as_f64)
            .map(|v| v as f32)
            .collect();
        if index >= expected || embedding.is_empty() {
            return Err(AskdocError::Provider(format!(
                "unexpected embedding at index {index}"
            )));
        }
        vectors[index] = embedding;
    }

    if vectors.iter().any(Vec::is_empty) {
        return Err(AskdocError::Provider(format!(
            "expected {expected} embeddings, got {}",
            data.len()
        )));
    }
    Ok(vectors)
}
