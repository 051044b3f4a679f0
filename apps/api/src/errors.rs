use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, FromRequest, FromRequestParts},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::assessment::scoring::ScoringError;
use crate::assessment::session::SessionError;

/// Message shown to users whenever an assessment cannot be scored.
pub const ASSESSMENT_FAILURE_MESSAGE: &str = "Unable to load or score this assessment. Please retry.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid assessment: {0}")]
    InvalidAssessment(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ScoringError> for AppError {
    fn from(e: ScoringError) -> Self {
        match e {
            ScoringError::InvalidAssessment(msg) => AppError::InvalidAssessment(msg),
            // Never escapes the engine, which degrades it to zero credit.
            other @ ScoringError::UnscorableAnswer { .. } => AppError::Internal(other.into()),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::AssessmentNotFound(_) | SessionError::SessionNotFound(_) => {
                AppError::NotFound(e.to_string())
            }
            SessionError::AlreadySubmitted(_) => AppError::Conflict(e.to_string()),
            SessionError::Scoring(inner) => inner.into(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// `Json` extractor whose rejections use the `AppError` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Path` extractor whose rejections use the `AppError` body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidAssessment(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Llm(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message) = match &self {
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => ("CONFLICT", msg.clone()),
            AppError::InvalidAssessment(msg) => {
                tracing::error!("Invalid assessment: {msg}");
                ("INVALID_ASSESSMENT", ASSESSMENT_FAILURE_MESSAGE.to_string())
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    "LLM_ERROR",
                    "The AI assistant is unavailable right now. Please try again later."
                        .to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                ("INTERNAL_ERROR", "An internal server error occurred".to_string())
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
