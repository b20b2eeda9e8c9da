//! The `POST /api/chat` handler.
//!
//! Validation happens entirely before the provider is contacted: a rejected
//! request never leaves the process. Provider failures are classified and
//! surfaced with the upstream status where one exists. Nothing is retried.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ErrorBody, RelayMode, RelayResponse, WireMessage};
use crate::core::catalog::DEFAULT_MODEL;
use crate::core::message::{MessageKind, Role};
use crate::server::AppState;

/// Inbound payload, deserialized leniently so the handler owns the error
/// taxonomy instead of the extractor: a missing or empty history and an
/// unknown mode are client errors with specific messages, not generic 422s.
#[derive(Debug, Deserialize)]
pub struct RelayPayload {
    #[serde(default)]
    messages: Vec<WireMessage>,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("malformed request body: {0}")]
    Malformed(String),

    #[error("empty message history")]
    EmptyHistory,

    #[error("invalid mode")]
    InvalidMode,

    #[error("upstream returned no image")]
    EmptyUpstream,

    #[error(transparent)]
    Provider(#[from] crate::provider::ProviderError),
}

impl RelayError {
    fn status(&self) -> StatusCode {
        match self {
            RelayError::Malformed(_) | RelayError::EmptyHistory | RelayError::InvalidMode => {
                StatusCode::BAD_REQUEST
            }
            RelayError::EmptyUpstream => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::Provider(err) => StatusCode::from_u16(err.relay_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

pub async fn relay_chat(
    State(state): State<AppState>,
    payload: Result<Json<RelayPayload>, JsonRejection>,
) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            return RelayError::Malformed(rejection.body_text()).into_response();
        }
    };

    match handle(&state, payload).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => {
            warn!(status = %err.status(), "relay request failed: {err}");
            err.into_response()
        }
    }
}

async fn handle(state: &AppState, payload: RelayPayload) -> Result<RelayResponse, RelayError> {
    if payload.messages.is_empty() {
        return Err(RelayError::EmptyHistory);
    }

    let mode = payload
        .mode
        .as_deref()
        .and_then(RelayMode::parse)
        .ok_or(RelayError::InvalidMode)?;

    let model = payload
        .model
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    info!(
        mode = mode.as_str(),
        model = %model,
        history = payload.messages.len(),
        "relaying request"
    );

    match mode {
        RelayMode::Chat => {
            let content = state
                .provider
                .complete_chat(&model, &payload.messages)
                .await?;
            Ok(RelayResponse {
                content,
                role: Role::Assistant,
                kind: None,
            })
        }
        RelayMode::Image => {
            let prompt = payload
                .messages
                .last()
                .map(|message| message.content.clone())
                .ok_or(RelayError::EmptyHistory)?;
            let images = state.provider.generate_image(&prompt).await?;
            let first = images.into_iter().next().ok_or(RelayError::EmptyUpstream)?;
            Ok(RelayResponse {
                content: first.url,
                role: Role::Assistant,
                kind: Some(MessageKind::Image),
            })
        }
    }
}
