// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use async_trait::async_trait;
use fabstir_rag_node::answer::{Answerer, ChatModel, Provenance, NO_MATCH_ANSWER};
use fabstir_rag_node::error::RagError;
use fabstir_rag_node::retrieval::RetrievedChunk;
use fabstir_rag_node::vector::SourceRef;
use std::sync::Arc;

/// Chat double that always fails, simulating a timed-out service
struct FailingChat;

#[async_trait]
impl ChatModel for FailingChat {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, RagError> {
        Err(RagError::ChatService("request timed out".to_string()))
    }
}

/// Chat double that returns a fixed reply
struct CannedChat(&'static str);

#[async_trait]
impl ChatModel for CannedChat {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, RagError> {
        Ok(self.0.to_string())
    }
}

fn claims_chunks() -> Vec<RetrievedChunk> {
    [
        "claims are filed online",
        "ID and proof of purchase required",
        "processing takes 5-7 days",
    ]
    .iter()
    .map(|text| RetrievedChunk {
        text: text.to_string(),
        source: SourceRef {
            file: "knowledge.pdf".to_string(),
            page: 0,
        },
        score: 0.8,
    })
    .collect()
}

#[tokio::test]
async fn test_no_chunks_gives_fixed_no_match_answer() {
    let answerer = Answerer::new(None);
    let answer = answerer.answer("How do I file a claim?", &[]).await;

    assert_eq!(answer.text, NO_MATCH_ANSWER);
    assert!(answer.sources.is_empty());
    assert_eq!(answer.provenance, Provenance::Retrieved);
}

#[tokio::test]
async fn test_fallback_answer_contains_chunks_and_citations() {
    let answerer = Answerer::new(None);
    let chunks = claims_chunks();
    let answer = answerer.answer("How do I file a claim?", &chunks).await;

    assert_eq!(answer.provenance, Provenance::Retrieved);
    assert!(answer.text.contains("claims are filed online"));
    assert!(answer.text.contains("processing takes 5-7 days"));
    assert_eq!(answer.sources.len(), 3);
    assert_eq!(answer.sources[0], "knowledge.pdf (Page 1)");
}

#[tokio::test]
async fn test_chat_failure_produces_exactly_the_fallback_answer() {
    let chunks = claims_chunks();

    let degraded = Answerer::new(Some(Arc::new(FailingChat)))
        .answer("How long does it take?", &chunks)
        .await;
    let fallback = Answerer::new(None)
        .answer("How long does it take?", &chunks)
        .await;

    assert_eq!(degraded.text, fallback.text);
    assert_eq!(degraded.sources, fallback.sources);
    assert_eq!(degraded.provenance, Provenance::Retrieved);
}

#[tokio::test]
async fn test_chat_success_is_marked_synthesized() {
    let answerer = Answerer::new(Some(Arc::new(CannedChat("You can file online."))));
    let chunks = claims_chunks();
    let answer = answerer.answer("How do I file a claim?", &chunks).await;

    assert_eq!(answer.text, "You can file online.");
    assert_eq!(answer.provenance, Provenance::Synthesized);
    assert_eq!(answer.sources.len(), 3);
}
