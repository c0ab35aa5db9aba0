// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OpenAI-compatible embeddings client
//!
//! Calls the `/embeddings` endpoint of an OpenAI-compatible API and
//! L2-normalizes every vector after receipt, so downstream inner-product
//! search behaves as cosine similarity. All transport and protocol failures
//! map to `RagError::EmbeddingService`; vectors are never silently
//! zero-filled.

use crate::embeddings::{normalize_l2, EmbeddingProvider};
use crate::error::RagError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Embeddings client for an OpenAI-compatible API
pub struct OpenAiEmbeddings {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiEmbeddings {
    /// Create a client for the given API key and model.
    ///
    /// `base_url` is the API root (e.g. `https://api.openai.com/v1`);
    /// `dimensions` is the dimension the model is expected to return and is
    /// validated against every response.
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        dimensions: usize,
        timeout: Duration,
    ) -> Result<Self, RagError> {
        if api_key.is_empty() {
            return Err(RagError::Config(
                "embedding API key must not be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RagError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            dimensions,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(
            batch_size = texts.len(),
            model = %self.model,
            "requesting embeddings"
        );

        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::EmbeddingService(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::EmbeddingService(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| RagError::EmbeddingService(format!("malformed response: {}", e)))?;

        if parsed.data.len() != texts.len() {
            return Err(RagError::EmbeddingService(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }

        let mut vectors = Vec::with_capacity(parsed.data.len());
        for data in parsed.data {
            let mut vector = data.embedding;
            if vector.len() != self.dimensions {
                return Err(RagError::EmbeddingService(format!(
                    "expected {}-dimensional embeddings, got {}",
                    self.dimensions,
                    vector.len()
                )));
            }
            normalize_l2(&mut vector);
            vectors.push(vector);
        }

        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
