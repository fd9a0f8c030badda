//! Inbound HTTP endpoints.
//!
//! - `POST /api/generate-ai` drafts an announcement body with the model
//! - `POST /api/announcements` validates a draft
//! - `GET /api/recipients` lists the known recipients
//! - `GET /health`

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::{
    draft::{AnnouncementDraft, RECIPIENTS},
    wire::{ErrorBody, GenerateRequest, GenerateResponse},
    AnnounceError, AnnouncementClient, Result, ServerConfig,
};

const GENERATE_FAILED: &str = "Failed to generate AI response";
const INVALID_BODY: &str = "Invalid request body";

#[derive(Clone)]
pub struct AppState {
    client: Arc<AnnouncementClient>,
    shutdown: CancellationToken,
    generation_deadline: Duration,
}

impl AppState {
    pub fn new(
        client: AnnouncementClient,
        shutdown: CancellationToken,
        generation_deadline: Duration,
    ) -> Self {
        Self {
            client: Arc::new(client),
            shutdown,
            generation_deadline,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/recipients", get(recipients))
        .route("/api/generate-ai", post(generate_ai))
        .route("/api/announcements", post(submit_announcement))
        .with_state(state)
}

/// Binds `config.bind_addr` and serves until `shutdown` is cancelled.
pub async fn serve(config: ServerConfig, shutdown: CancellationToken) -> Result<()> {
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .map_err(AnnounceError::Server)?;
    serve_on(listener, &config, shutdown).await
}

/// Serves on an already bound listener until `shutdown` is cancelled.
pub async fn serve_on(
    listener: TcpListener,
    config: &ServerConfig,
    shutdown: CancellationToken,
) -> Result<()> {
    let state = AppState::new(config.client(), shutdown.clone(), config.generation_deadline);
    let app = router(state);

    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, model_url = config.model_url.as_str(), "announcement server listening");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(AnnounceError::Server)?;

    tracing::info!("announcement server stopped");
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn recipients() -> Json<serde_json::Value> {
    Json(json!({ "recipients": RECIPIENTS }))
}

async fn generate_ai(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GenerateRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "rejected generate-ai body");
            return error_response(StatusCode::BAD_REQUEST, INVALID_BODY, rejection.body_text());
        }
    };

    let cancel = state.shutdown.child_token();
    let generation = state.client.generate_with_cancel(&request.input, &cancel);

    let outcome = match tokio::time::timeout(state.generation_deadline, generation).await {
        Ok(outcome) => outcome,
        Err(_) => {
            cancel.cancel();
            Err(AnnounceError::DeadlineExceeded {
                seconds: state.generation_deadline.as_secs(),
            })
        }
    };

    match outcome {
        Ok(result) => (StatusCode::OK, Json(GenerateResponse { result })).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "error generating AI response");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERATE_FAILED,
                err.to_string(),
            )
        }
    }
}

async fn submit_announcement(
    payload: std::result::Result<Json<AnnouncementDraft>, JsonRejection>,
) -> Response {
    let Json(draft) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return error_response(StatusCode::BAD_REQUEST, INVALID_BODY, rejection.body_text());
        }
    };

    match draft.validate() {
        Ok(announcement) => {
            tracing::info!(
                title = announcement.title.as_str(),
                recipient = announcement.recipient.as_str(),
                "announcement accepted"
            );
            (StatusCode::OK, Json(announcement)).into_response()
        }
        Err(fields) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "Invalid announcement", "fields": fields })),
        )
            .into_response(),
    }
}

fn error_response(status: StatusCode, error: &str, details: String) -> Response {
    (
        status,
        Json(ErrorBody {
            error: error.to_owned(),
            details,
        }),
    )
        .into_response()
}
