// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Token-aware text chunking
//!
//! Splits raw text into overlapping windows of cl100k_base tokens. Windows are
//! decoded back to plain text before being stored, so the index never holds
//! token ids. The window start advances by `chunk_tokens - overlap_tokens`,
//! clamped to at least 1 token; degenerate configurations are additionally
//! rejected at construction.

use crate::error::RagError;
use tiktoken_rs::{cl100k_base, CoreBPE};

/// Overlapping token-window chunker over a fixed cl100k_base encoding
pub struct TokenChunker {
    bpe: CoreBPE,
    chunk_tokens: usize,
    overlap_tokens: usize,
}

impl TokenChunker {
    /// Create a chunker producing windows of `chunk_tokens` tokens that
    /// overlap by `overlap_tokens`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `chunk_tokens` is zero or
    /// `overlap_tokens >= chunk_tokens` (the advance would not move forward).
    pub fn new(chunk_tokens: usize, overlap_tokens: usize) -> Result<Self, RagError> {
        if chunk_tokens == 0 {
            return Err(RagError::Config(
                "chunk_tokens must be greater than zero".to_string(),
            ));
        }
        if overlap_tokens >= chunk_tokens {
            return Err(RagError::Config(format!(
                "overlap_tokens ({}) must be smaller than chunk_tokens ({})",
                overlap_tokens, chunk_tokens
            )));
        }

        let bpe = cl100k_base()
            .map_err(|e| RagError::Config(format!("failed to load cl100k_base encoding: {}", e)))?;

        Ok(Self {
            bpe,
            chunk_tokens,
            overlap_tokens,
        })
    }

    /// Tokens per window
    pub fn chunk_tokens(&self) -> usize {
        self.chunk_tokens
    }

    /// Overlapping tokens between consecutive windows
    pub fn overlap_tokens(&self) -> usize {
        self.overlap_tokens
    }

    /// Split `text` into overlapping chunks, decoded back to plain text.
    ///
    /// The last chunk may be shorter than `chunk_tokens` when the remaining
    /// tokens run out. Empty input produces no chunks.
    pub fn chunk(&self, text: &str) -> Result<Vec<String>, RagError> {
        let tokens = self.bpe.encode_ordinary(text);
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        // Guard against zero advancement even if the constructor checks are
        // ever relaxed; the loop must always move forward.
        let step = (self.chunk_tokens - self.overlap_tokens).max(1);

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < tokens.len() {
            let end = (start + self.chunk_tokens).min(tokens.len());
            let window = tokens[start..end].to_vec();
            let piece = self
                .bpe
                .decode(window)
                .map_err(|e| RagError::Chunking(format!("failed to decode token window: {}", e)))?;
            chunks.push(piece);
            start += step;
        }

        Ok(chunks)
    }
}
