// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Embedding providers
//!
//! Every provider returns one L2-normalized `Vec<f32>` per input text, in input
//! order, so inner-product search over the index is equivalent to cosine
//! similarity. Two providers ship with the node:
//!
//! - [`OpenAiEmbeddings`]: OpenAI-compatible embeddings API over HTTP
//! - [`HashEmbeddings`]: deterministic local feature-hash embeddings, used when
//!   no API key is configured and by the test suite

pub mod hash;
pub mod openai;

pub use hash::HashEmbeddings;
pub use openai::OpenAiEmbeddings;

use crate::error::RagError;
use async_trait::async_trait;

/// A source of text embeddings
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts. Returns one unit-norm vector per input, in the
    /// same order. Service failures surface as `RagError::EmbeddingService`.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError>;

    /// Dimension of the vectors this provider produces
    fn dimensions(&self) -> usize;

    /// Embed a single text (convenience over `embed_batch`)
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| {
            RagError::EmbeddingService("provider returned an empty batch".to_string())
        })
    }
}

/// Scale a vector to unit L2 norm in place.
///
/// Zero or non-finite magnitudes leave the vector untouched.
pub fn normalize_l2(vector: &mut [f32]) {
    let magnitude: f32 = vector.iter().map(|&x| x * x).sum::<f32>().sqrt();

    if magnitude == 0.0 || !magnitude.is_finite() {
        return;
    }

    for value in vector.iter_mut() {
        *value /= magnitude;
    }
}
