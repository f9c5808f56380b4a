//! Build and query pipeline.

use std::path::Path;

use askdoc_core::error::{AskdocError, Result};
use askdoc_core::traits::Embedder;
use askdoc_core::types::Document;

use crate::loader;
use crate::splitter::{self, SplitConfig};
use crate::store::VectorStore;

/// Embedding requests are batched to keep request payloads bounded.
const EMBEDDING_BATCH: usize = 64;

/// A searchable document: chunks embedded into a vector store.
#[derive(Debug)]
pub struct DocumentIndex {
    store: VectorStore,
}

impl DocumentIndex {
    /// Index the PDF at `path`: load pages, split into chunks, embed them
    /// batch by batch, and build the store.
    pub async fn build(
        path: &Path,
        embedder: &dyn Embedder,
        config: &SplitConfig,
    ) -> Result<Self> {
        let pages = loader::load_pdf(path)?;
        let chunks = splitter::split(&pages, config)?;

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.content.clone()).collect();
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(EMBEDDING_BATCH) {
            embeddings.extend(embedder.embed(batch).await?);
        }

        let store = VectorStore::build(chunks, embeddings)?;
        tracing::info!(pages = pages.len(), chunks = store.len(), "document indexed");
        Ok(Self { store })
    }

    /// An index with nothing in it.
    pub fn empty() -> Self {
        Self {
            store: VectorStore::empty(),
        }
    }

    /// Top-`k` chunks for `query`, descending similarity.
    ///
    /// An empty index answers immediately without calling the embedder.
    pub async fn search(
        &self,
        embedder: &dyn Embedder,
        query: &str,
        k: usize,
    ) -> Result<Vec<(f32, Document)>> {
        if self.store.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = embedder.embed(&[query.to_string()]).await?;
        let query_embedding = embeddings
            .first()
            .ok_or_else(|| AskdocError::Provider("no embedding returned for query".into()))?;

        Ok(self
            .store
            .search(query_embedding, k)
            .into_iter()
            .map(|(score, document)| (score, document.clone()))
            .collect())
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

/// Wrap a pre-built store, e.g. one assembled without the PDF pipeline.
impl From<VectorStore> for DocumentIndex {
    fn from(store: VectorStore) -> Self {
        Self { store }
    }
}
