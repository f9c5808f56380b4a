//! Shared data types.

use std::collections::BTreeMap;
use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A piece of source text plus its provenance metadata.
///
/// Loaded pages and split chunks share this shape; a chunk carries the page
/// metadata it was split from plus its own `chunk` sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Builder-style metadata insertion.
    pub fn with_meta(mut self, key: &str, value: impl ToString) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    /// Page number recorded at load time, if any.
    pub fn page(&self) -> Option<u32> {
        self.metadata.get("page").and_then(|page| page.parse().ok())
    }
}

/// Chat roles understood by OpenAI-compatible endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One chat-completion message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Incrementally produced answer fragments; the consumer controls pacing
/// and may stop polling early.
pub type ReplyStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_metadata_builder() {
        let doc = Document::new("text").with_meta("source", "a.pdf").with_meta("page", 3);
        assert_eq!(doc.metadata.get("source").map(String::as_str), Some("a.pdf"));
        assert_eq!(doc.page(), Some(3));
    }

    #[test]
    fn test_document_without_page() {
        assert_eq!(Document::new("text").page(), None);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::user("hi")).unwrap();
        assert!(json.contains(r#""role":"user""#));
    }
}
