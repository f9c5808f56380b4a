//! In-memory vector store.
//!
//! Brute-force cosine similarity over unit-normalized vectors: embeddings
//! are normalized once on insertion, queries once per search, and ranking
//! is a dot product over an exact scan.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use askdoc_core::error::{AskdocError, Result};
use askdoc_core::types::Document;

#[derive(Debug)]
struct Entry {
    embedding: Vec<f32>,
    document: Document,
}

/// Cosine-similarity index over document chunks.
#[derive(Debug)]
pub struct VectorStore {
    dimension: usize,
    entries: Vec<Entry>,
}

impl VectorStore {
    /// Build a store from parallel chunk and embedding lists.
    ///
    /// Lengths must match and every embedding must share one nonzero
    /// dimension. Chunks with identical text are stored once.
    pub fn build(documents: Vec<Document>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        if documents.len() != embeddings.len() {
            return Err(AskdocError::Index(format!(
                "{} chunks but {} embeddings",
                documents.len(),
                embeddings.len()
            )));
        }

        let dimension = embeddings.first().map(Vec::len).unwrap_or(0);
        let mut entries = Vec::with_capacity(documents.len());
        let mut seen = HashSet::new();

        for (document, embedding) in documents.into_iter().zip(embeddings) {
            if dimension == 0 || embedding.len() != dimension {
                return Err(AskdocError::Index(format!(
                    "embedding dimension {} does not match {dimension}",
                    embedding.len()
                )));
            }
            // Repeated page headers/footers produce identical chunks.
            if !seen.insert(content_hash(&document.content)) {
                continue;
            }
            entries.push(Entry {
                embedding: normalize(embedding),
                document,
            });
        }

        Ok(Self { dimension, entries })
    }

    /// A store that matches nothing.
    pub fn empty() -> Self {
        Self {
            dimension: 0,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-`k` entries by descending cosine similarity to `query`.
    ///
    /// Ties keep insertion order. An empty store, a zero `k`, or a query of
    /// the wrong dimension yields an empty result.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(f32, &Document)> {
        if self.entries.is_empty() || k == 0 {
            return Vec::new();
        }
        if query.len() != self.dimension {
            tracing::warn!(
                got = query.len(),
                expected = self.dimension,
                "query dimension mismatch"
            );
            return Vec::new();
        }

        let query = normalize(query.to_vec());
        let mut scored: Vec<(f32, &Document)> = self
            .entries
            .iter()
            .map(|entry| (dot(&entry.embedding, &query), &entry.document))
            .collect();
        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

/// Cosine similarity of two raw vectors. Zero-magnitude input scores zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let norms = l2(a) * l2(b);
    if norms == 0.0 { 0.0 } else { dot(a, b) / norms }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn l2(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn normalize(mut v: Vec<f32>) -> Vec<f32> {
    let n = l2(&v);
    if n > 0.0 {
        for x in &mut v {
            *x /= n;
        }
    }
    v
}

fn content_hash(text: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.finalize().into()
}
