// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Document ingestion
//!
//! Turns PDF bytes into chunk records ready for embedding. Chunking runs per
//! page so each chunk keeps the (filename, page) origin used for citations.

pub mod pdf;
pub mod sample;

pub use pdf::{extract_pages, PageText};

use crate::chunker::TokenChunker;
use crate::error::RagError;
use crate::vector::{ChunkRecord, SourceRef};

/// Chunk extracted pages into records carrying their source reference
pub fn chunk_document(
    chunker: &TokenChunker,
    filename: &str,
    pages: &[PageText],
) -> Result<Vec<ChunkRecord>, RagError> {
    let mut records = Vec::new();

    for page in pages {
        for text in chunker.chunk(&page.text)? {
            records.push(ChunkRecord {
                text,
                source: SourceRef {
                    file: filename.to_string(),
                    page: page.page,
                },
            });
        }
    }

    Ok(records)
}
