// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Deterministic feature-hash embeddings
//!
//! Hashes character trigrams of each word into a fixed number of signed
//! buckets, then normalizes to unit length. Texts sharing words (or word
//! fragments) land in the same buckets and score high under inner product,
//! which is enough for lexical retrieval when no embedding service is
//! configured. Fully deterministic, so the test suite relies on it too.

use crate::embeddings::{normalize_l2, EmbeddingProvider};
use crate::error::RagError;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Default dimension, matching compact sentence-transformer models
pub const DEFAULT_HASH_DIMENSIONS: usize = 384;

/// Local feature-hash embedding provider
#[derive(Debug, Clone)]
pub struct HashEmbeddings {
    dimensions: usize,
}

impl Default for HashEmbeddings {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_HASH_DIMENSIONS,
        }
    }
}

impl HashEmbeddings {
    /// Create a provider with a custom vector dimension
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for word in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            // Pad with sentinels so short words still produce a gram
            let padded = format!("#{}#", word);
            let bytes = padded.as_bytes();
            for gram in bytes.windows(3.min(bytes.len())) {
                let digest = Sha256::digest(gram);
                let bucket = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
                    as usize
                    % self.dimensions;
                let sign = if digest[4] & 1 == 0 { 1.0 } else { -1.0 };
                vector[bucket] += sign;
            }
        }

        normalize_l2(&mut vector);
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddings {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
