//! Bounded-size chunking with overlap.

use askdoc_core::error::{AskdocError, Result};
use askdoc_core::types::Document;
use text_splitter::{ChunkConfig, TextSplitter};

/// Chunking parameters, in characters.
#[derive(Debug, Clone, Copy)]
pub struct SplitConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Split pages into chunks of at most `chunk_size` characters, neighbors
/// sharing up to `chunk_overlap` characters. Each chunk keeps its page's
/// metadata plus a per-page `chunk` sequence number.
pub fn split(pages: &[Document], config: &SplitConfig) -> Result<Vec<Document>> {
    let chunk_config = ChunkConfig::new(config.chunk_size)
        .with_overlap(config.chunk_overlap)
        .map_err(|e| AskdocError::Index(format!("invalid split config: {e}")))?;
    let splitter = TextSplitter::new(chunk_config);

    let mut chunks = Vec::new();
    for page in pages {
        for (i, piece) in splitter.chunks(&page.content).enumerate() {
            let mut chunk = Document::new(piece);
            chunk.metadata = page.metadata.clone();
            chunk.metadata.insert("chunk".into(), i.to_string());
            chunks.push(chunk);
        }
    }

    tracing::debug!(pages = pages.len(), chunks = chunks.len(), "split document");
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(content: &str) -> Document {
        Document::new(content).with_meta("source", "test.pdf").with_meta("page", 1)
    }

    #[test]
    fn test_short_page_stays_whole() {
        let chunks = split(&[page("one small page")], &SplitConfig::default()).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "one small page");
    }

    #[test]
    fn test_chunks_respect_size_limit() {
        let text = "A sentence about nothing in particular. ".repeat(100);
        let config = SplitConfig { chunk_size: 120, chunk_overlap: 20 };
        let chunks = split(&[page(&text)], &config).unwrap();
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.content.chars().count() <= 120);
        }
    }

    #[test]
    fn test_chunks_are_substrings_of_the_page() {
        let text = "First sentence here. Second sentence there. Third one too. ".repeat(30);
        let config = SplitConfig { chunk_size: 150, chunk_overlap: 30 };
        let chunks = split(&[page(&text)], &config).unwrap();
        for chunk in &chunks {
            assert!(text.contains(&chunk.content));
        }
    }

    #[test]
    fn test_metadata_carried_with_sequence() {
        let text = "Words repeated over and over again. ".repeat(50);
        let config = SplitConfig { chunk_size: 100, chunk_overlap: 10 };
        let chunks = split(&[page(&text)], &config).unwrap();
        assert!(chunks.len() >= 2);
        assert_eq!(chunks[0].metadata.get("chunk").map(String::as_str), Some("0"));
        assert_eq!(chunks[1].metadata.get("chunk").map(String::as_str), Some("1"));
        for chunk in &chunks {
            assert_eq!(chunk.page(), Some(1));
            assert_eq!(chunk.metadata.get("source").map(String::as_str), Some("test.pdf"));
        }
    }

    #[test]
    fn test_overlap_larger_than_size_is_rejected() {
        let config = SplitConfig { chunk_size: 100, chunk_overlap: 200 };
        let err = split(&[page("text")], &config).unwrap_err();
        assert!(matches!(err, AskdocError::Index(_)));
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let chunks = split(&[], &SplitConfig::default()).unwrap();
        assert!(chunks.is_empty());
    }
}
