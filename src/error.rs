use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ledger::LedgerError;

/// Fatal conditions for a single computation run.
///
/// Everything here aborts the run before any write. Non-fatal conditions
/// (widen exhaustion, zero-base periods) travel in the run report instead.
#[derive(Debug, Error)]
pub enum TwrError {
    /// Underlying store read/write failed; not retried by the engine.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    /// The events store holds no epoch markers at all.
    #[error("no epoch markers in the events store")]
    NoEpochData,
    /// Fixed-window fetch returned fewer than two snapshots and cannot widen.
    #[error("insufficient balance data: fetched {fetched} snapshot(s), need at least 2")]
    InsufficientBalanceData { fetched: usize },
    /// A stored composite sort key does not parse; corrupt data, do not guess.
    #[error("malformed sort key: {0}")]
    MalformedSortKey(String),
    /// Continuation requested but no prior return record exists for the account.
    #[error("no prior return record to continue from")]
    NoContinuationPoint,
    /// Caller-supplied window is unusable (e.g. start after end).
    #[error("invalid window: {0}")]
    InvalidWindow(String),
}

impl From<LedgerError> for TwrError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::MalformedKey(msg) => TwrError::MalformedSortKey(msg),
            other => TwrError::StoreUnavailable(other.to_string()),
        }
    }
}

/// HTTP-facing error for the API surface.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<TwrError> for AppError {
    fn from(err: TwrError) -> Self {
        match err {
            TwrError::InvalidWindow(msg) => AppError::BadRequest(msg),
            TwrError::InsufficientBalanceData { .. } | TwrError::NoContinuationPoint => {
                AppError::NotFound(err.to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
