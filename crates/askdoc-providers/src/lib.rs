//! # AskDoc Providers
//!
//! Model backends for askdoc.
//!
//! All OpenAI-compatible endpoints (OpenAI itself, Ollama, vLLM, LM Studio,
//! any `/v1` server) are handled by a single `OpenAiProvider` speaking
//! `/embeddings` and streaming `/chat/completions`.

pub mod openai;

pub use openai::OpenAiProvider;
