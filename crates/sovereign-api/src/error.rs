//! Error types for the HTTP API.
//!
//! [`ApiError`] converts every failure into a JSON body of the form
//! `{"error": ..., "code": ..., "status": ...}` via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.
//!
//! | Class | Status |
//! |-------|--------|
//! | malformed request | 400 |
//! | missing resource | 404 |
//! | game rule rejection | 409 |
//! | conflict retries exhausted | 503 |
//! | store or history outage | 503 |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sovereign_core::{ConquestError, SinkError};

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request could not be understood.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An engine operation failed or was rejected.
    #[error(transparent)]
    Conquest(#[from] ConquestError),

    /// The history backend could not be read.
    #[error("history unavailable: {0}")]
    History(#[from] SinkError),
}

impl ApiError {
    /// HTTP status, machine-readable code and user-facing message.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "invalid_request", msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            Self::Conquest(err) => match err {
                ConquestError::Validation { message } => {
                    (StatusCode::BAD_REQUEST, "invalid_request", message.clone())
                }
                ConquestError::Rejected(rejection) => (
                    StatusCode::CONFLICT,
                    rejection.code(),
                    rejection.user_message(),
                ),
                ConquestError::Conflict { .. } | ConquestError::ConflictRetry { .. } => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "conflict_retry",
                    "요청이 몰려 처리하지 못했습니다. 잠시 후 다시 시도하세요.".to_owned(),
                ),
                ConquestError::StoreUnavailable { .. } => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "store_unavailable",
                    "서버 저장소에 연결할 수 없습니다.".to_owned(),
                ),
            },
            Self::History(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "history_unavailable",
                "기록을 불러올 수 없습니다.".to_owned(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
        }

        let body = serde_json::json!({
            "error": message,
            "code": code,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
