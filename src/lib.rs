// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod answer;
pub mod api;
pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod ingest;
pub mod retrieval;
pub mod session;
pub mod vector;

// Re-export main types
pub use answer::{Answer, Answerer, ChatModel, OpenAiChat, Provenance};
pub use chunker::TokenChunker;
pub use config::RagConfig;
pub use embeddings::{EmbeddingProvider, HashEmbeddings, OpenAiEmbeddings};
pub use error::RagError;
pub use retrieval::{RetrievedChunk, Retriever};
pub use session::{IngestReport, RagSession, SessionStatus};
pub use vector::{ChunkRecord, FlatIpIndex, KnowledgeStore, SourceRef};
