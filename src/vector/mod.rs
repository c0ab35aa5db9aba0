// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vector index and chunk store
//!
//! [`FlatIpIndex`] holds the raw vectors and answers exact inner-product
//! nearest-neighbor queries; [`KnowledgeStore`] pairs it with the parallel
//! chunk-text records and owns persistence of both artifacts.

pub mod index;
pub mod store;

pub use index::FlatIpIndex;
pub use store::{ChunkRecord, KnowledgeStore, SourceRef};
