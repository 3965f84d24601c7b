use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::{
    clients::telegram::TelegramError,
    models::response::{ApiResponse, ErrorBody},
};

/// Errors surfaced by the broadcast endpoint.
#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("Missing required parameters: token or message")]
    MissingParameters,

    #[error("{0}")]
    InvalidParseMode(String),

    #[error("Message too long: {length} characters (maximum {max})")]
    MessageTooLong { length: usize, max: usize },

    #[error("Bot token verification failed: {0}")]
    CredentialRejected(#[source] TelegramError),

    #[error("Only GET and POST supported.")]
    MethodNotAllowed,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl BroadcastError {
    fn parts(&self) -> (StatusCode, &'static str, String, Option<String>) {
        match self {
            BroadcastError::InvalidJson(detail) => (
                StatusCode::BAD_REQUEST,
                "INVALID_JSON",
                "Invalid JSON body.".to_string(),
                Some(detail.clone()),
            ),
            BroadcastError::MissingParameters
            | BroadcastError::InvalidParseMode(_)
            | BroadcastError::MessageTooLong { .. } => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", self.to_string(), None)
            }
            BroadcastError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "METHOD_NOT_ALLOWED",
                self.to_string(),
                None,
            ),
            BroadcastError::CredentialRejected(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "BROADCAST_FAILED",
                "Broadcast failed".to_string(),
                Some(e.to_string()),
            ),
            BroadcastError::Internal(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
                Some(e.to_string()),
            ),
        }
    }
}

impl IntoResponse for BroadcastError {
    fn into_response(self) -> Response {
        match &self {
            BroadcastError::CredentialRejected(e) => {
                warn!(error = %e, "Broadcast rejected, bot token verification failed")
            }
            BroadcastError::Internal(e) => error!(error = %e, "Broadcast failed unexpectedly"),
            other => debug!(reason = %other, "Broadcast request rejected"),
        }

        let (status, code, message, error) = self.parts();
        let body = ApiResponse::error(ErrorBody {
            code: Some(code),
            message,
            error,
        })
        .with_meta();

        (status, Json(body)).into_response()
    }
}

/// Errors surfaced by the membership-check endpoint.
#[derive(Debug, Error)]
pub enum MembershipError {
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("Missing required parameters: token, user_id, or chat_id.")]
    MissingParameters,

    #[error("{0}")]
    LookupFailed(#[source] TelegramError),

    #[error("Only GET and POST supported.")]
    MethodNotAllowed,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl MembershipError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            MembershipError::InvalidJson(_) => (
                StatusCode::BAD_REQUEST,
                "INVALID_JSON",
                "Invalid JSON body.".to_string(),
            ),
            MembershipError::MissingParameters => {
                (StatusCode::BAD_REQUEST, "MISSING_PARAMETERS", self.to_string())
            }
            MembershipError::LookupFailed(e) => (
                StatusCode::BAD_REQUEST,
                "MEMBERSHIP_CHECK_FAILED",
                e.description(),
            ),
            MembershipError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "METHOD_NOT_ALLOWED",
                self.to_string(),
            ),
            MembershipError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An unexpected error occurred.".to_string(),
            ),
        }
    }
}

impl IntoResponse for MembershipError {
    fn into_response(self) -> Response {
        match &self {
            MembershipError::LookupFailed(e) => debug!(error = %e, "Membership lookup failed"),
            MembershipError::Internal(e) => error!(error = %e, "Membership check failed unexpectedly"),
            other => debug!(reason = %other, "Membership request rejected"),
        }

        let (status, code, message) = self.parts();
        let body = ApiResponse::error(ErrorBody {
            code: Some(code),
            message,
            error: None,
        })
        .with_social();

        (status, Json(body)).into_response()
    }
}
