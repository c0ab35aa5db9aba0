// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use fabstir_rag_node::error::RagError;
use fabstir_rag_node::vector::{ChunkRecord, KnowledgeStore, SourceRef};
use std::path::PathBuf;

fn record(text: &str, file: &str, page: usize) -> ChunkRecord {
    ChunkRecord {
        text: text.to_string(),
        source: SourceRef {
            file: file.to_string(),
            page,
        },
    }
}

fn populated_store() -> KnowledgeStore {
    let mut store = KnowledgeStore::new(4);
    store
        .add(
            vec![
                vec![1.0, 0.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0, 0.0],
                vec![0.0, 0.0, 1.0, 0.0],
            ],
            vec![
                record("claims are filed online", "knowledge.pdf", 0),
                record("ID and proof of purchase required", "knowledge.pdf", 0),
                record("processing takes 5-7 days", "knowledge.pdf", 1),
            ],
        )
        .unwrap();
    store
}

fn artifact_paths(dir: &tempfile::TempDir) -> (PathBuf, PathBuf) {
    (
        dir.path().join("index.bin"),
        dir.path().join("index_meta.json"),
    )
}

#[test]
fn test_save_load_round_trip_preserves_positions() {
    let dir = tempfile::tempdir().unwrap();
    let (index_path, meta_path) = artifact_paths(&dir);

    let store = populated_store();
    store.save(&index_path, &meta_path).unwrap();

    let restored = KnowledgeStore::load(&index_path, &meta_path).unwrap();
    assert_eq!(restored.len(), store.len());
    assert_eq!(restored.dimensions(), store.dimensions());

    for position in 0..store.len() {
        assert_eq!(restored.record(position), store.record(position));
    }
}

#[test]
fn test_sidecar_keeps_position_indexed_chunk_array() {
    let dir = tempfile::tempdir().unwrap();
    let (index_path, meta_path) = artifact_paths(&dir);

    populated_store().save(&index_path, &meta_path).unwrap();

    let raw = std::fs::read_to_string(&meta_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

    let chunks = json["chunks"].as_array().unwrap();
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0], "claims are filed online");
    assert_eq!(chunks[2], "processing takes 5-7 days");

    let sources = json["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 3);
    assert_eq!(sources[2]["page"], 1);
}

#[test]
fn test_length_mismatch_is_corruption() {
    let dir = tempfile::tempdir().unwrap();
    let (index_path, meta_path) = artifact_paths(&dir);

    populated_store().save(&index_path, &meta_path).unwrap();

    // Drop a chunk from the sidecar while leaving the index untouched
    std::fs::write(
        &meta_path,
        r#"{"chunks": ["claims are filed online"], "sources": [{"file": "knowledge.pdf", "page": 0}]}"#,
    )
    .unwrap();

    let result = KnowledgeStore::load(&index_path, &meta_path);
    assert!(matches!(result, Err(RagError::Corruption(_))));
}

#[test]
fn test_source_count_mismatch_is_corruption() {
    let dir = tempfile::tempdir().unwrap();
    let (index_path, meta_path) = artifact_paths(&dir);

    let mut store = KnowledgeStore::new(2);
    store
        .add(
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            vec![record("a", "a.pdf", 0), record("b", "a.pdf", 0)],
        )
        .unwrap();
    store.save(&index_path, &meta_path).unwrap();

    std::fs::write(
        &meta_path,
        r#"{"chunks": ["a", "b"], "sources": [{"file": "a.pdf", "page": 0}]}"#,
    )
    .unwrap();

    let result = KnowledgeStore::load(&index_path, &meta_path);
    assert!(matches!(result, Err(RagError::Corruption(_))));
}

#[test]
fn test_legacy_sidecar_without_sources_loads() {
    let dir = tempfile::tempdir().unwrap();
    let (index_path, meta_path) = artifact_paths(&dir);

    let mut store = KnowledgeStore::new(2);
    store
        .add(
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            vec![record("a", "a.pdf", 0), record("b", "a.pdf", 0)],
        )
        .unwrap();
    store.save(&index_path, &meta_path).unwrap();

    // Older sidecars only carried the chunk texts
    std::fs::write(&meta_path, r#"{"chunks": ["a", "b"]}"#).unwrap();

    let restored = KnowledgeStore::load(&index_path, &meta_path).unwrap();
    assert_eq!(restored.len(), 2);
    assert_eq!(restored.record(0).unwrap().text, "a");
    assert_eq!(restored.record(0).unwrap().source.file, "unknown");
}
