//! PDF text extraction.

use std::path::Path;

use askdoc_core::error::{AskdocError, Result};
use askdoc_core::types::Document;

/// Extract the PDF at `path` into one `Document` per page.
///
/// Pages with no extractable text are skipped. A document where every page
/// is blank is an error since there is nothing to index. A missing file is
/// reported as a not-found I/O error so callers can distinguish it from a
/// parse failure.
pub fn load_pdf(path: &Path) -> Result<Vec<Document>> {
    if !path.is_file() {
        return Err(AskdocError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("document not found: {}", path.display()),
        )));
    }

    let pages = pdf_extract::extract_text_by_pages(path).map_err(|e| {
        AskdocError::Document(format!("failed to read {}: {e}", path.display()))
    })?;

    let source = path.display().to_string();
    let documents: Vec<Document> = pages
        .into_iter()
        .enumerate()
        .filter_map(|(i, text)| {
            let text = normalize_page_text(&text);
            if text.is_empty() {
                tracing::debug!(page = i + 1, "skipping blank page");
                None
            } else {
                Some(
                    Document::new(text)
                        .with_meta("source", &source)
                        .with_meta("page", i + 1),
                )
            }
        })
        .collect();

    if documents.is_empty() {
        return Err(AskdocError::Document(format!(
            "no extractable text in {source}"
        )));
    }

    tracing::info!(pages = documents.len(), source = %source, "loaded document");
    Ok(documents)
}

/// Collapse extraction artifacts: normalized line endings, trimmed edges.
fn normalize_page_text(text: &str) -> String {
    text.replace("\r\n", "\n").trim().to_string()
}
