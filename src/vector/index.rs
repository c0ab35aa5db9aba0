// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Flat inner-product index
//!
//! Exact nearest-neighbor search over the full vector set. Append-only: the
//! vector at position *i* always corresponds to the chunk at position *i* in
//! the parallel chunk store, which is the invariant everything downstream
//! relies on. At the scale this node targets (one knowledge base of a few
//! thousand chunks) an exhaustive scan outperforms approximate structures and
//! keeps positions stable.
//!
//! Vectors are expected to arrive L2-normalized from the embedding provider,
//! making inner product equivalent to cosine similarity.

use crate::error::RagError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Sentinel position returned for padded (non-matching) search slots
pub const NO_MATCH: i64 = -1;

/// Exact inner-product index over fixed-dimension vectors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIpIndex {
    dimensions: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIpIndex {
    /// Create an empty index for vectors of the given dimension
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            vectors: Vec::new(),
        }
    }

    /// Append vectors to the index, preserving order.
    ///
    /// # Errors
    ///
    /// Returns an error if any vector has the wrong dimension or contains
    /// NaN/Infinity values (they would poison similarity ordering).
    pub fn add(&mut self, vectors: Vec<Vec<f32>>) -> Result<(), RagError> {
        for vector in &vectors {
            if vector.len() != self.dimensions {
                return Err(RagError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: vector.len(),
                });
            }
            if vector.iter().any(|v| !v.is_finite()) {
                return Err(RagError::EmbeddingService(
                    "vector contains NaN or Infinity values".to_string(),
                ));
            }
        }

        self.vectors.extend(vectors);
        Ok(())
    }

    /// Search for the k nearest neighbors by inner product.
    ///
    /// Always returns exactly `k` `(position, score)` pairs sorted by
    /// descending score. When the index holds fewer than `k` vectors the tail
    /// is padded with the [`NO_MATCH`] sentinel position, which callers must
    /// filter out.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(i64, f32)>, RagError> {
        if query.len() != self.dimensions {
            return Err(RagError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }
        if query.iter().any(|v| !v.is_finite()) {
            return Err(RagError::EmbeddingService(
                "query vector contains NaN or Infinity values".to_string(),
            ));
        }

        let mut results: Vec<(i64, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| (position as i64, inner_product(query, vector)))
            .collect();

        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);

        while results.len() < k {
            results.push((NO_MATCH, f32::NEG_INFINITY));
        }

        Ok(results)
    }

    /// Number of vectors in the index
    pub fn size(&self) -> usize {
        self.vectors.len()
    }

    /// Vector dimension this index was created for
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Persist the index to `path` via a temp file and atomic rename
    pub fn save(&self, path: &Path) -> Result<(), RagError> {
        let dir = parent_dir(path);
        let tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            bincode::serialize_into(&mut writer, self)
                .map_err(|e| RagError::Persist(format!("failed to encode index: {}", e)))?;
            writer
                .flush()
                .map_err(|e| RagError::Persist(format!("failed to flush index: {}", e)))?;
        }
        tmp.persist(path)
            .map_err(|e| RagError::Persist(format!("failed to persist index: {}", e)))?;
        Ok(())
    }

    /// Load an index previously written by [`save`](Self::save)
    pub fn load(path: &Path) -> Result<Self, RagError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        bincode::deserialize_from(reader)
            .map_err(|e| RagError::Corruption(format!("failed to decode index file: {}", e)))
    }
}

fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}
