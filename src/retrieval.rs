// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Query-time retrieval
//!
//! Embeds a question with the configured provider, searches the knowledge
//! store, and returns the matching chunk records in ranked order. An empty
//! store (or a search that only yields sentinel slots) produces an empty
//! result, never an error.

use crate::embeddings::EmbeddingProvider;
use crate::error::RagError;
use crate::vector::{KnowledgeStore, SourceRef};
use std::sync::Arc;

/// One retrieved chunk, best match first in the containing list
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub text: String,
    pub source: SourceRef,
    /// Inner-product similarity against the query (cosine, since vectors are
    /// unit-norm)
    pub score: f32,
}

/// Retrieves the top-k chunks for a query
pub struct Retriever {
    provider: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Retriever {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, top_k: usize) -> Self {
        Self { provider, top_k }
    }

    /// Number of chunks requested per query
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Embed `query` and return up to `top_k` matching chunks, best first.
    ///
    /// Embedding-service failures surface to the caller; they are fatal to
    /// the question being asked.
    pub async fn retrieve(
        &self,
        query: &str,
        store: &KnowledgeStore,
    ) -> Result<Vec<RetrievedChunk>, RagError> {
        if store.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = self.provider.embed_one(query).await?;
        let hits = store.search(&query_vector, self.top_k)?;

        let mut results = Vec::new();
        for (position, score) in hits {
            if position < 0 {
                continue;
            }
            if let Some(record) = store.record(position as usize) {
                results.push(RetrievedChunk {
                    text: record.text.clone(),
                    source: record.source.clone(),
                    score,
                });
            }
        }

        tracing::debug!(
            query_len = query.len(),
            results = results.len(),
            "retrieval complete"
        );

        Ok(results)
    }
}
