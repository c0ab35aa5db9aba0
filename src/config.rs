// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration
//!
//! All settings come from environment variables (loaded from `.env` by `main`)
//! with defaults matching the reference deployment. Validation fails fast so a
//! misconfigured node never starts serving.

use crate::error::RagError;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default OpenAI-compatible API base URL
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct RagConfig {
    /// Port the HTTP API listens on
    pub api_port: u16,
    /// Directory holding the persisted index and its metadata sidecar
    pub data_dir: PathBuf,
    /// Directory uploaded source PDFs are kept in (cleared on reset)
    pub upload_dir: PathBuf,
    /// Tokens per chunk window
    pub chunk_tokens: usize,
    /// Overlapping tokens between consecutive windows (must be < chunk_tokens)
    pub overlap_tokens: usize,
    /// Number of chunks retrieved per question
    pub top_k: usize,
    /// API key for the embedding/chat services; absent key selects the
    /// local feature-hash embedder and disables chat synthesis
    pub openai_api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API
    pub openai_base_url: String,
    /// Embedding model name
    pub embedding_model: String,
    /// Expected embedding dimension for the remote model
    pub embedding_dimensions: usize,
    /// Chat completion model name
    pub chat_model: String,
    /// Timeout for embedding requests
    pub embed_timeout: Duration,
    /// Timeout for chat requests (kept short so fallback stays responsive)
    pub chat_timeout: Duration,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            api_port: 8000,
            data_dir: PathBuf::from("./data"),
            upload_dir: PathBuf::from("./uploaded_docs"),
            chunk_tokens: 450,
            overlap_tokens: 80,
            top_k: 4,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_dimensions: 1536,
            chat_model: "gpt-3.5-turbo".to_string(),
            embed_timeout: Duration::from_secs(30),
            chat_timeout: Duration::from_secs(10),
        }
    }
}

impl RagConfig {
    /// Build configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self, RagError> {
        let defaults = Self::default();

        let config = Self {
            api_port: read_parsed("API_PORT", defaults.api_port)?,
            data_dir: env::var("RAG_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            upload_dir: env::var("RAG_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            chunk_tokens: read_parsed("CHUNK_TOKENS", defaults.chunk_tokens)?,
            overlap_tokens: read_parsed("OVERLAP_TOKENS", defaults.overlap_tokens)?,
            top_k: read_parsed("TOP_K", defaults.top_k)?,
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            openai_base_url: env::var("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            embedding_model: env::var("EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            embedding_dimensions: read_parsed(
                "EMBEDDING_DIMENSIONS",
                defaults.embedding_dimensions,
            )?,
            chat_model: env::var("CHAT_MODEL").unwrap_or(defaults.chat_model),
            embed_timeout: Duration::from_secs(read_parsed("EMBED_TIMEOUT_SECS", 30u64)?),
            chat_timeout: Duration::from_secs(read_parsed("CHAT_TIMEOUT_SECS", 10u64)?),
        };

        config.validate()?;
        Ok(config)
    }

    /// Fail fast on configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<(), RagError> {
        if self.chunk_tokens == 0 {
            return Err(RagError::Config(
                "CHUNK_TOKENS must be greater than zero".to_string(),
            ));
        }
        if self.overlap_tokens >= self.chunk_tokens {
            return Err(RagError::Config(format!(
                "OVERLAP_TOKENS ({}) must be smaller than CHUNK_TOKENS ({})",
                self.overlap_tokens, self.chunk_tokens
            )));
        }
        if self.top_k == 0 {
            return Err(RagError::Config("TOP_K must be at least 1".to_string()));
        }
        if self.embedding_dimensions == 0 {
            return Err(RagError::Config(
                "EMBEDDING_DIMENSIONS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Path of the binary index artifact
    pub fn index_path(&self) -> PathBuf {
        self.data_dir.join("index.bin")
    }

    /// Path of the JSON metadata sidecar
    pub fn meta_path(&self) -> PathBuf {
        self.data_dir.join("index_meta.json")
    }

    /// Redirect all on-disk state under one directory (used by tests)
    pub fn with_root(mut self, root: &Path) -> Self {
        self.data_dir = root.join("data");
        self.upload_dir = root.join("uploaded_docs");
        self
    }
}

fn read_parsed<T: std::str::FromStr>(key: &str, default: T) -> Result<T, RagError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| RagError::Config(format!("{} has invalid value '{}'", key, raw))),
        Err(_) => Ok(default),
    }
}
