// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! RAG session lifecycle
//!
//! One node serves one active knowledge base at a time, persisted across
//! restarts. `RagSession` owns that state explicitly - chunker, embedding
//! provider, answerer, and the knowledge store - and is injected into the
//! request handlers instead of living in ambient globals. Lifecycle:
//! `open` (restore persisted state), `ingest`, `ask`, `reset`, `status`.

use crate::answer::{Answer, Answerer, ChatModel};
use crate::chunker::TokenChunker;
use crate::config::RagConfig;
use crate::embeddings::EmbeddingProvider;
use crate::error::RagError;
use crate::ingest;
use crate::retrieval::Retriever;
use crate::vector::KnowledgeStore;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Snapshot of the session's knowledge-base state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub index_initialized: bool,
    pub documents_count: usize,
    pub chunks_count: usize,
}

/// Result of ingesting one document
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub filename: String,
    pub pages: usize,
    pub chunks_indexed: usize,
}

/// Owns the knowledge base and the pipeline around it
pub struct RagSession {
    config: RagConfig,
    chunker: TokenChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    retriever: Retriever,
    answerer: Answerer,
    store: KnowledgeStore,
}

impl RagSession {
    /// Open a session, restoring any persisted index.
    ///
    /// Finding one persistence artifact without the other, or artifacts whose
    /// lengths disagree, is a corruption condition that halts startup rather
    /// than proceeding with mismatched state.
    pub fn open(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        chat: Option<Arc<dyn ChatModel>>,
    ) -> Result<Self, RagError> {
        config.validate()?;

        fs::create_dir_all(&config.data_dir)?;
        fs::create_dir_all(&config.upload_dir)?;

        let chunker = TokenChunker::new(config.chunk_tokens, config.overlap_tokens)?;

        let index_path = config.index_path();
        let meta_path = config.meta_path();
        let store = match (index_path.exists(), meta_path.exists()) {
            (true, true) => {
                let store = KnowledgeStore::load(&index_path, &meta_path)?;
                if store.dimensions() != embedder.dimensions() {
                    return Err(RagError::DimensionMismatch {
                        expected: embedder.dimensions(),
                        actual: store.dimensions(),
                    });
                }
                tracing::info!(
                    chunks = store.len(),
                    documents = store.document_count(),
                    "restored persisted index"
                );
                store
            }
            (false, false) => KnowledgeStore::new(embedder.dimensions()),
            (true, false) => {
                return Err(RagError::Corruption(
                    "index file exists without its metadata sidecar".to_string(),
                ))
            }
            (false, true) => {
                return Err(RagError::Corruption(
                    "metadata sidecar exists without its index file".to_string(),
                ))
            }
        };

        let retriever = Retriever::new(embedder.clone(), config.top_k);
        let answerer = Answerer::new(chat);

        Ok(Self {
            config,
            chunker,
            embedder,
            retriever,
            answerer,
            store,
        })
    }

    /// Ingest one PDF: persist the upload, extract text page-by-page, chunk,
    /// embed, append to the index, and save both artifacts.
    pub async fn ingest(&mut self, filename: &str, bytes: &[u8]) -> Result<IngestReport, RagError> {
        let filename = base_name(filename)?;
        if !filename.to_lowercase().ends_with(".pdf") {
            return Err(RagError::UnsupportedInput(
                "Only PDF files are supported".to_string(),
            ));
        }

        fs::write(self.config.upload_dir.join(&filename), bytes)?;

        let pages = ingest::extract_pages(bytes)?;
        if pages.is_empty() {
            return Err(RagError::Pdf(
                "no text content found in PDF - document may be scanned".to_string(),
            ));
        }

        let records = ingest::chunk_document(&self.chunker, &filename, &pages)?;
        let texts: Vec<String> = records.iter().map(|r| r.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        self.store.add(vectors, records)?;
        self.store
            .save(&self.config.index_path(), &self.config.meta_path())?;

        let report = IngestReport {
            filename: filename.clone(),
            pages: pages.len(),
            chunks_indexed: texts.len(),
        };

        tracing::info!(
            filename = %report.filename,
            pages = report.pages,
            chunks = report.chunks_indexed,
            total_chunks = self.store.len(),
            "document ingested"
        );

        Ok(report)
    }

    /// Answer a question from the current knowledge base.
    ///
    /// Embedding failures surface; chat failures are absorbed by the
    /// answerer's fallback tier.
    pub async fn ask(&self, question: &str) -> Result<Answer, RagError> {
        if self.store.is_empty() {
            return Err(RagError::NoDocuments);
        }

        let chunks = self.retriever.retrieve(question, &self.store).await?;
        Ok(self.answerer.answer(question, &chunks).await)
    }

    /// Clear the knowledge base: in-memory state, persisted artifacts, and
    /// all uploaded source files.
    pub fn reset(&mut self) -> Result<(), RagError> {
        self.store = KnowledgeStore::new(self.store.dimensions());

        remove_if_exists(&self.config.index_path())?;
        remove_if_exists(&self.config.meta_path())?;

        if self.config.upload_dir.exists() {
            for entry in fs::read_dir(&self.config.upload_dir)? {
                let path = entry?.path();
                if path.is_file() {
                    fs::remove_file(path)?;
                }
            }
        }

        tracing::info!("knowledge base reset");
        Ok(())
    }

    /// Current knowledge-base counts
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            index_initialized: !self.store.is_empty(),
            documents_count: self.store.document_count(),
            chunks_count: self.store.len(),
        }
    }
}

/// Strip any directory components from a client-supplied filename
fn base_name(filename: &str) -> Result<String, RagError> {
    Path::new(filename)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| RagError::UnsupportedInput("missing filename".to_string()))
}

fn remove_if_exists(path: &Path) -> Result<(), RagError> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}
