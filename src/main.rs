// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use fabstir_rag_node::{
    answer::{ChatModel, OpenAiChat},
    api::{start_server, AppState},
    config::RagConfig,
    embeddings::{EmbeddingProvider, HashEmbeddings, OpenAiEmbeddings},
    session::RagSession,
};
use std::{env, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before anything reads the environment
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting Fabstir RAG Node...\n");

    let config = RagConfig::from_env()?;

    // Select embedding provider: remote service when a key is configured,
    // deterministic local feature-hash embeddings otherwise
    let embedder: Arc<dyn EmbeddingProvider> = match &config.openai_api_key {
        Some(key) => {
            println!(
                "🔗 Embeddings: {} via {}",
                config.embedding_model, config.openai_base_url
            );
            Arc::new(OpenAiEmbeddings::new(
                key.clone(),
                config.openai_base_url.clone(),
                config.embedding_model.clone(),
                config.embedding_dimensions,
                config.embed_timeout,
            )?)
        }
        None => {
            println!("⚠️  OPENAI_API_KEY not set - using local feature-hash embeddings");
            Arc::new(HashEmbeddings::default())
        }
    };

    // Chat synthesis is optional; without a key every answer comes from the
    // retrieval fallback
    let chat: Option<Arc<dyn ChatModel>> = match &config.openai_api_key {
        Some(key) => {
            println!("💬 Chat model: {}", config.chat_model);
            Some(Arc::new(OpenAiChat::new(
                key.clone(),
                config.openai_base_url.clone(),
                config.chat_model.clone(),
                config.chat_timeout,
            )?))
        }
        None => {
            println!("💬 No chat model configured - answers will return retrieved text");
            None
        }
    };

    let api_port = config.api_port;
    let session = RagSession::open(config, embedder, chat)?;

    let status = session.status();
    println!(
        "📚 Knowledge base: {} document(s), {} chunk(s)\n",
        status.documents_count, status.chunks_count
    );

    start_server(AppState::new(session), api_port)
        .await
        .map_err(|e| anyhow::anyhow!("API server failed: {}", e))?;

    Ok(())
}
