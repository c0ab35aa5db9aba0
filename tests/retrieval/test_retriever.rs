// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use fabstir_rag_node::embeddings::{EmbeddingProvider, HashEmbeddings};
use fabstir_rag_node::retrieval::Retriever;
use fabstir_rag_node::vector::{ChunkRecord, KnowledgeStore, SourceRef};
use std::sync::Arc;

async fn store_with_chunks(
    provider: &HashEmbeddings,
    texts: &[&str],
) -> KnowledgeStore {
    let owned: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
    let vectors = provider.embed_batch(&owned).await.unwrap();

    let records = owned
        .into_iter()
        .map(|text| ChunkRecord {
            text,
            source: SourceRef {
                file: "knowledge.pdf".to_string(),
                page: 0,
            },
        })
        .collect();

    let mut store = KnowledgeStore::new(provider.dimensions());
    store.add(vectors, records).unwrap();
    store
}

#[tokio::test]
async fn test_empty_store_returns_empty_list() {
    let provider = Arc::new(HashEmbeddings::default());
    let store = KnowledgeStore::new(provider.dimensions());
    let retriever = Retriever::new(provider, 4);

    let results = retriever.retrieve("anything?", &store).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_claims_question_retrieves_filing_chunk_first() {
    let provider = HashEmbeddings::default();
    let store = store_with_chunks(
        &provider,
        &[
            "claims are filed online",
            "ID and proof of purchase required",
            "processing takes 5-7 days",
        ],
    )
    .await;

    let retriever = Retriever::new(Arc::new(provider), 3);
    let results = retriever
        .retrieve("How do I file a claim?", &store)
        .await
        .unwrap();

    assert!(!results.is_empty());
    assert_eq!(results[0].text, "claims are filed online");
    assert!(results.len() <= 3);
}

#[tokio::test]
async fn test_results_are_ranked_by_score() {
    let provider = HashEmbeddings::default();
    let store = store_with_chunks(
        &provider,
        &[
            "claims are filed online",
            "ID and proof of purchase required",
            "processing takes 5-7 days",
        ],
    )
    .await;

    let retriever = Retriever::new(Arc::new(provider), 3);
    let results = retriever
        .retrieve("How do I file a claim?", &store)
        .await
        .unwrap();

    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn test_sentinel_slots_are_filtered() {
    let provider = HashEmbeddings::default();
    let store = store_with_chunks(&provider, &["claims are filed online"]).await;

    // k is larger than the store; padded sentinel slots must not leak out
    let retriever = Retriever::new(Arc::new(provider), 10);
    let results = retriever.retrieve("file a claim", &store).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].source.file, "knowledge.pdf");
}
