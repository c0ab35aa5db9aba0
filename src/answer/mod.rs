// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Two-tier answer generation
//!
//! With a chat model configured, retrieved chunks become the context block of
//! a grounded prompt and the model's reply is returned verbatim. Without one,
//! or when the chat call fails for any reason, the retrieved chunk texts are
//! returned directly. The tier that produced an answer is recorded as its
//! [`Provenance`], so callers never have to infer it from error handling.

pub mod chat;

pub use chat::{ChatModel, OpenAiChat};

use crate::retrieval::RetrievedChunk;
use std::sync::Arc;

/// Fixed reply when retrieval found nothing to answer from
pub const NO_MATCH_ANSWER: &str = "No relevant information found in the uploaded documents.";

/// Prefix of the fallback answer built from raw retrieved text
const FALLBACK_PREFIX: &str = "Based on the documents, here is the relevant information:";

/// Grounding instruction given to the chat model. Groundedness is a prompt
/// instruction only; the reply is not verified against the context.
const SYSTEM_PROMPT: &str = "You are a helpful assistant. Use only the provided context to \
    answer. If the answer is not present, say you do not have it.";

/// Which tier produced the answer text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Synthesized by the chat model from the retrieved context
    Synthesized,
    /// Raw retrieved chunk text (no chat model, or the chat call failed)
    Retrieved,
}

/// An answer plus its source citations
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    /// Human-readable citations (`"<filename> (Page <n>)"`), ranked order
    pub sources: Vec<String>,
    pub provenance: Provenance,
}

/// Produces answers from retrieved chunks, synthesizing when a chat model is
/// available
pub struct Answerer {
    chat: Option<Arc<dyn ChatModel>>,
}

impl Answerer {
    /// The chat model is optional by design: `None` pins the answerer to the
    /// fallback tier.
    pub fn new(chat: Option<Arc<dyn ChatModel>>) -> Self {
        Self { chat }
    }

    /// Whether a chat model is configured
    pub fn has_chat_model(&self) -> bool {
        self.chat.is_some()
    }

    /// Answer `question` from the retrieved chunks.
    ///
    /// Chat-service failures are logged and downgraded to the fallback tier;
    /// this method itself never fails.
    pub async fn answer(&self, question: &str, chunks: &[RetrievedChunk]) -> Answer {
        if chunks.is_empty() {
            return Answer {
                text: NO_MATCH_ANSWER.to_string(),
                sources: Vec::new(),
                provenance: Provenance::Retrieved,
            };
        }

        if let Some(chat) = &self.chat {
            let context = join_context(chunks);
            let user = format!("Context:\n{}\n\nQuestion:\n{}", context, question);

            match chat.complete(SYSTEM_PROMPT, &user).await {
                Ok(text) => {
                    return Answer {
                        text,
                        sources: citations(chunks),
                        provenance: Provenance::Synthesized,
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        error_code = e.error_code(),
                        "chat completion failed ({}), falling back to retrieved text",
                        e
                    );
                }
            }
        }

        self.fallback(chunks)
    }

    fn fallback(&self, chunks: &[RetrievedChunk]) -> Answer {
        let context = join_context(chunks);
        Answer {
            text: format!("{}\n\n{}", FALLBACK_PREFIX, context),
            sources: citations(chunks),
            provenance: Provenance::Retrieved,
        }
    }
}

fn join_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn citations(chunks: &[RetrievedChunk]) -> Vec<String> {
    chunks.iter().map(|c| c.source.citation()).collect()
}
