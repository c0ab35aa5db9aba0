// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PDF text extraction
//!
//! Extracts text page-by-page so every downstream chunk can cite the page it
//! came from. Extracted text is normalized: carriage returns become newlines,
//! lines are trimmed, and blank lines are dropped.

use crate::error::RagError;
use lopdf::Document;

/// Text of one PDF page. `page` is 0-indexed; display adds 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page: usize,
    pub text: String,
}

/// Extract normalized text from every page of a PDF.
///
/// Pages that yield no text (e.g. scanned images) are skipped. Returns an
/// error only when the bytes are not a loadable PDF.
pub fn extract_pages(pdf_bytes: &[u8]) -> Result<Vec<PageText>, RagError> {
    let doc = Document::load_mem(pdf_bytes)
        .map_err(|e| RagError::Pdf(format!("failed to load PDF: {}", e)))?;

    let pages = doc.get_pages();
    let mut out = Vec::new();

    for (idx, page_num) in pages.keys().enumerate() {
        let raw = doc.extract_text(&[*page_num]).unwrap_or_default();
        let text = normalize_text(&raw);
        if !text.is_empty() {
            out.push(PageText { page: idx, text });
        }
    }

    Ok(out)
}

/// Number of pages in a PDF
pub fn page_count(pdf_bytes: &[u8]) -> Result<usize, RagError> {
    let doc = Document::load_mem(pdf_bytes)
        .map_err(|e| RagError::Pdf(format!("failed to load PDF: {}", e)))?;
    Ok(doc.get_pages().len())
}

/// Normalize raw extracted text: CR to LF, trim each line, drop blank lines
pub fn normalize_text(raw: &str) -> String {
    raw.replace('\r', "\n")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
