//! # AskDoc Knowledge
//!
//! Ingestion and retrieval for a single PDF document.
//! One document at a time — no vector database, no persistence.
//!
//! ## Design
//! - **Per-page extraction** — one `Document` per PDF page, blank pages dropped
//! - **Bounded chunks** — 1000-char chunks with 200-char overlap, split on
//!   semantic boundaries
//! - **In-memory cosine index** — unit-normalized vectors, exact scan;
//!   at a few hundred chunks brute force beats any index structure
//! - **Dedup** — repeated headers/footers hash to one stored chunk
//!
//! ## How it works
//! ```text
//! load_pdf("report.pdf")
//!   ↓ one Document per page
//! split(pages)
//!   ↓ overlapping chunks
//! Embedder::embed(chunks)
//!   ↓ batched vectors
//! VectorStore
//!   ↓ search(query_embedding, k)
//! Top-k chunks, descending cosine similarity
//! ```

pub mod index;
pub mod loader;
pub mod splitter;
pub mod store;

pub use index::DocumentIndex;
pub use splitter::SplitConfig;
pub use store::VectorStore;
