// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use fabstir_rag_node::api::{
    create_router, AppState, ErrorResponse, HealthResponse, QuestionResponse, ResetResponse,
    UploadResponse,
};
use fabstir_rag_node::config::RagConfig;
use fabstir_rag_node::embeddings::HashEmbeddings;
use fabstir_rag_node::ingest::sample::sample_pdf_bytes;
use fabstir_rag_node::session::RagSession;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "rag-node-test-boundary";

fn test_state(root: &Path) -> AppState {
    let session = RagSession::open(
        RagConfig::default().with_root(root),
        Arc::new(HashEmbeddings::default()),
        None,
    )
    .unwrap();
    AppState::new(session)
}

fn multipart_upload(filename: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn ask_request(question: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/ask")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "question": question }).to_string(),
        ))
        .unwrap()
}

async fn response_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_on_fresh_node() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let response = create_router(state)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthResponse = response_json(response).await;
    assert_eq!(health.status, "healthy");
    assert!(!health.index_initialized);
    assert_eq!(health.documents_count, 0);
    assert_eq!(health.chunks_count, 0);
}

#[tokio::test]
async fn test_ask_without_documents_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let response = create_router(state)
        .oneshot(ask_request("How do I file a claim?"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response_json(response).await;
    assert_eq!(error.error_type, "invalid_request");
    assert!(error.message.contains("upload a document"));
}

#[tokio::test]
async fn test_non_pdf_upload_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let response = create_router(state)
        .oneshot(multipart_upload("notes.txt", b"plain text"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response_json(response).await;
    assert_eq!(error.error_type, "invalid_request");
}

#[tokio::test]
async fn test_upload_ask_reset_flow() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let pdf = sample_pdf_bytes().unwrap();

    // Upload the sample document
    let response = create_router(state.clone())
        .oneshot(multipart_upload("knowledge.pdf", &pdf))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let upload: UploadResponse = response_json(response).await;
    assert_eq!(upload.filename, "knowledge.pdf");
    assert!(upload.chunks_indexed >= 1);

    // Health reflects the ingested document
    let response = create_router(state.clone())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let health: HealthResponse = response_json(response).await;
    assert!(health.index_initialized);
    assert_eq!(health.documents_count, 1);

    // Ask a question answered by the document
    let response = create_router(state.clone())
        .oneshot(ask_request("How do I file a claim?"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let answer: QuestionResponse = response_json(response).await;
    assert!(answer.answer.to_lowercase().contains("file a claim"));
    assert!(answer
        .source_documents
        .contains(&"knowledge.pdf (Page 1)".to_string()));
    assert!(!answer.synthesized, "no chat model is configured");

    // Reset wipes the knowledge base
    let response = create_router(state.clone())
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/reset")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let reset: ResetResponse = response_json(response).await;
    assert!(reset.message.contains("reset"));

    let response = create_router(state)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let health: HealthResponse = response_json(response).await;
    assert!(!health.index_initialized);
    assert_eq!(health.documents_count, 0);
    assert_eq!(health.chunks_count, 0);
}

#[tokio::test]
async fn test_upload_without_file_field_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n");
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let response = create_router(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_root_banner() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let response = create_router(state)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = response_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("running"));
}
