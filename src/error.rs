// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for the RAG node
//!
//! Covers the full pipeline:
//! - Configuration errors (invalid chunk/overlap sizes)
//! - External service errors (embedding or chat service failure)
//! - Persistence errors (index/metadata corruption, I/O)
//! - User input errors (non-PDF upload, question before ingestion)

use thiserror::Error;

/// Errors that can occur across the ingest/retrieve/answer pipeline
#[derive(Error, Debug)]
pub enum RagError {
    /// Invalid configuration (chunk sizes, ports, provider settings)
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Embedding service failure (HTTP error, timeout, malformed response).
    /// Fatal to the operation that needed the embedding.
    #[error("Embedding service error: {0}")]
    EmbeddingService(String),

    /// Chat completion service failure. Callers downgrade this to the
    /// retrieval fallback instead of surfacing it.
    #[error("Chat service error: {0}")]
    ChatService(String),

    /// A question was asked before any document was ingested
    #[error("No documents uploaded yet. Please upload a document first.")]
    NoDocuments,

    /// Persisted index and metadata disagree, or one artifact is missing
    #[error("Persisted index is corrupt: {0}")]
    Corruption(String),

    /// Upload of something this node cannot ingest
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    /// Vector dimensions don't match the index
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// PDF loading or text extraction failed
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    /// Token encode/decode failed while chunking
    #[error("Chunking failed: {0}")]
    Chunking(String),

    /// Serialization or atomic-rename failure while saving/loading the index
    #[error("Persistence error: {0}")]
    Persist(String),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RagError {
    /// Get user-friendly error message for API responses
    pub fn user_message(&self) -> String {
        match self {
            RagError::NoDocuments => self.to_string(),
            RagError::UnsupportedInput(msg) => msg.clone(),
            RagError::EmbeddingService(_) => {
                "Embedding service is unavailable - try again later".to_string()
            }
            RagError::Corruption(_) => {
                "Stored index is corrupt - reset and re-upload your documents".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Get error code for logging and metrics
    pub fn error_code(&self) -> &'static str {
        match self {
            RagError::Config(_) => "CONFIG_ERROR",
            RagError::EmbeddingService(_) => "EMBEDDING_SERVICE_ERROR",
            RagError::ChatService(_) => "CHAT_SERVICE_ERROR",
            RagError::NoDocuments => "NO_DOCUMENTS",
            RagError::Corruption(_) => "INDEX_CORRUPT",
            RagError::UnsupportedInput(_) => "UNSUPPORTED_INPUT",
            RagError::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            RagError::Pdf(_) => "PDF_ERROR",
            RagError::Chunking(_) => "CHUNKING_ERROR",
            RagError::Persist(_) => "PERSIST_ERROR",
            RagError::Io(_) => "IO_ERROR",
        }
    }

    /// Check if this error is caused by bad user input (vs node-side failure)
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            RagError::NoDocuments | RagError::UnsupportedInput(_)
        )
    }
}
