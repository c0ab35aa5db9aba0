// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Knowledge store: index + parallel chunk records
//!
//! Owns the invariant that the index and the chunk-text metadata always agree
//! in length, and persists the pair together: a binary index artifact plus a
//! JSON sidecar of shape `{"chunks": [...], "sources": [...]}` where array
//! position corresponds to index position. A load that finds one artifact
//! without the other, or disagreeing lengths, fails with a corruption error
//! instead of proceeding with mismatched state.

use crate::error::RagError;
use crate::vector::FlatIpIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Where a chunk came from: source filename and 0-indexed page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub file: String,
    pub page: usize,
}

impl SourceRef {
    /// Human-readable citation with a 1-based page number for display
    pub fn citation(&self) -> String {
        format!("{} (Page {})", self.file, self.page + 1)
    }
}

/// One stored chunk: decoded text plus its origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub text: String,
    pub source: SourceRef,
}

/// Sidecar file layout. `chunks` keeps the position-indexed text array;
/// `sources` is the parallel origin array, absent in older sidecars.
#[derive(Serialize, Deserialize)]
struct IndexMeta {
    chunks: Vec<String>,
    #[serde(default)]
    sources: Vec<SourceRef>,
}

/// Vector index paired with its chunk records
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    index: FlatIpIndex,
    records: Vec<ChunkRecord>,
}

impl KnowledgeStore {
    /// Create an empty store for vectors of the given dimension
    pub fn new(dimensions: usize) -> Self {
        Self {
            index: FlatIpIndex::new(dimensions),
            records: Vec::new(),
        }
    }

    /// Append vectors and their chunk records, preserving order.
    ///
    /// `vectors` and `records` must have equal length; position *i* of one
    /// corresponds to position *i* of the other.
    pub fn add(
        &mut self,
        vectors: Vec<Vec<f32>>,
        records: Vec<ChunkRecord>,
    ) -> Result<(), RagError> {
        if vectors.len() != records.len() {
            return Err(RagError::Corruption(format!(
                "attempted to add {} vectors with {} chunk records",
                vectors.len(),
                records.len()
            )));
        }

        self.index.add(vectors)?;
        self.records.extend(records);
        Ok(())
    }

    /// Exact top-k search; see [`FlatIpIndex::search`] for sentinel semantics
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(i64, f32)>, RagError> {
        self.index.search(query, k)
    }

    /// Chunk record at an index position
    pub fn record(&self, position: usize) -> Option<&ChunkRecord> {
        self.records.get(position)
    }

    /// Number of stored chunks (== index size)
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Vector dimension of the underlying index
    pub fn dimensions(&self) -> usize {
        self.index.dimensions()
    }

    /// Number of distinct source documents
    pub fn document_count(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.source.file.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Persist both artifacts. Each file is written via temp-file + atomic
    /// rename; the index is written first so a crash between the two writes
    /// is detected as a length mismatch on the next load.
    pub fn save(&self, index_path: &Path, meta_path: &Path) -> Result<(), RagError> {
        debug_assert_eq!(self.index.size(), self.records.len());

        self.index.save(index_path)?;

        let meta = IndexMeta {
            chunks: self.records.iter().map(|r| r.text.clone()).collect(),
            sources: self.records.iter().map(|r| r.source.clone()).collect(),
        };

        let dir = match meta_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, &meta)
                .map_err(|e| RagError::Persist(format!("failed to encode metadata: {}", e)))?;
            writer
                .flush()
                .map_err(|e| RagError::Persist(format!("failed to flush metadata: {}", e)))?;
        }
        tmp.persist(meta_path)
            .map_err(|e| RagError::Persist(format!("failed to persist metadata: {}", e)))?;

        Ok(())
    }

    /// Restore a store from both artifacts.
    ///
    /// # Errors
    ///
    /// Returns a corruption error when the index and metadata disagree in
    /// length, or when the sidecar carries a `sources` array that does not
    /// match its `chunks` array. Sidecars without sources load with
    /// placeholder origins.
    pub fn load(index_path: &Path, meta_path: &Path) -> Result<Self, RagError> {
        let index = FlatIpIndex::load(index_path)?;

        let file = File::open(meta_path)?;
        let reader = BufReader::new(file);
        let meta: IndexMeta = serde_json::from_reader(reader)
            .map_err(|e| RagError::Corruption(format!("failed to decode metadata file: {}", e)))?;

        if index.size() != meta.chunks.len() {
            return Err(RagError::Corruption(format!(
                "index has {} vectors but metadata has {} chunks",
                index.size(),
                meta.chunks.len()
            )));
        }

        let sources = if meta.sources.is_empty() {
            vec![
                SourceRef {
                    file: "unknown".to_string(),
                    page: 0,
                };
                meta.chunks.len()
            ]
        } else if meta.sources.len() == meta.chunks.len() {
            meta.sources
        } else {
            return Err(RagError::Corruption(format!(
                "metadata has {} chunks but {} sources",
                meta.chunks.len(),
                meta.sources.len()
            )));
        };

        let records = meta
            .chunks
            .into_iter()
            .zip(sources)
            .map(|(text, source)| ChunkRecord { text, source })
            .collect();

        Ok(Self { index, records })
    }
}
