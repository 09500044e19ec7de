//! Error handling for the backend API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use study_core::{CardId, CardSchedule, SessionError};
use thiserror::Error;

use crate::services::store::StoreError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// `code` tells clients which session rule was broken.
    #[error("Conflict: {message}")]
    Conflict { code: &'static str, message: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The answer was counted but its schedule could not be saved. The client
    /// retries with `PUT /api/schedules/:card_id` using `schedule`.
    #[error("Failed to save schedule for card {card_id}: {message}")]
    Persistence {
        card_id: CardId,
        schedule: Box<CardSchedule>,
        message: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::NotFound(_) => ApiError::NotFound(error.to_string()),
            SessionError::InvalidState { .. } => conflict("invalid_state", &error),
            SessionError::QueueExhausted(_) => conflict("queue_exhausted", &error),
            SessionError::UnexpectedCard { .. } => conflict("unexpected_card", &error),
            SessionError::Schedule(_) => ApiError::Internal(error.to_string()),
        }
    }
}

fn conflict(code: &'static str, error: &SessionError) -> ApiError {
    ApiError::Conflict {
        code,
        message: error.to_string(),
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    card_id: Option<CardId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule: Option<CardSchedule>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Conflict { code, .. } => (StatusCode::CONFLICT, *code),
            ApiError::Store(_) => (StatusCode::SERVICE_UNAVAILABLE, "store_error"),
            ApiError::Persistence { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "persistence_failed")
            }
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let message = self.to_string();
        let (card_id, schedule) = match self {
            ApiError::Persistence {
                card_id, schedule, ..
            } => (Some(card_id), Some(*schedule)),
            _ => (None, None),
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            card_id,
            schedule,
        });

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
