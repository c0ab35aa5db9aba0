// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::{Json, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::{
    ApiError, HealthResponse, QuestionRequest, QuestionResponse, ResetResponse, RootResponse,
    UploadResponse,
};
use crate::answer::Provenance;
use crate::session::RagSession;

#[derive(Clone)]
pub struct AppState {
    session: Arc<RwLock<RagSession>>,
}

impl AppState {
    pub fn new(session: RagSession) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
        }
    }
}

/// Build the API router. Exposed separately from [`start_server`] so tests
/// can drive it without binding a socket.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/upload", post(upload_handler))
        .route("/ask", post(ask_handler))
        .route("/reset", delete(reset_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown signal received");
    }
}

async fn root_handler() -> impl IntoResponse {
    axum::response::Json(RootResponse {
        message: "RAG node is running".to_string(),
    })
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.read().await;
    let status = session.status();

    axum::response::Json(HealthResponse {
        status: "healthy".to_string(),
        index_initialized: status.index_initialized,
        documents_count: status.documents_count,
        chunks_count: status.chunks_count,
    })
}

async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<axum::response::Json<UploadResponse>, ApiErrorResponse> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiErrorResponse(ApiError::InvalidRequest(format!(
            "malformed multipart body: {}",
            e
        )))
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(|name| name.to_string())
            .ok_or_else(|| {
                ApiErrorResponse(ApiError::InvalidRequest(
                    "file field is missing a filename".to_string(),
                ))
            })?;
        let bytes = field.bytes().await.map_err(|e| {
            ApiErrorResponse(ApiError::InvalidRequest(format!(
                "failed to read file field: {}",
                e
            )))
        })?;
        upload = Some((filename, bytes.to_vec()));
        break;
    }

    let (filename, bytes) = upload.ok_or_else(|| {
        ApiErrorResponse(ApiError::InvalidRequest(
            "multipart body must contain a 'file' field".to_string(),
        ))
    })?;

    let mut session = state.session.write().await;
    let report = session
        .ingest(&filename, &bytes)
        .await
        .map_err(|e| ApiErrorResponse(e.into()))?;

    Ok(axum::response::Json(UploadResponse {
        message: "Document uploaded and processed successfully".to_string(),
        filename: report.filename,
        pages: report.pages,
        chunks_indexed: report.chunks_indexed,
    }))
}

async fn ask_handler(
    State(state): State<AppState>,
    Json(request): Json<QuestionRequest>,
) -> Result<axum::response::Json<QuestionResponse>, ApiErrorResponse> {
    let session = state.session.read().await;
    let answer = session
        .ask(&request.question)
        .await
        .map_err(|e| ApiErrorResponse(e.into()))?;

    Ok(axum::response::Json(QuestionResponse {
        answer: answer.text,
        source_documents: answer.sources,
        synthesized: answer.provenance == Provenance::Synthesized,
    }))
}

async fn reset_handler(
    State(state): State<AppState>,
) -> Result<axum::response::Json<ResetResponse>, ApiErrorResponse> {
    let mut session = state.session.write().await;
    session.reset().map_err(|e| ApiErrorResponse(e.into()))?;

    Ok(axum::response::Json(ResetResponse {
        message: "Database reset successfully".to_string(),
    }))
}

// Error response wrapper
pub struct ApiErrorResponse(pub ApiError);

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let error_response = self.0.to_response(None);

        (status, axum::response::Json(error_response)).into_response()
    }
}
