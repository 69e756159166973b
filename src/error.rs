//! HTTP error mapping for the oracle routes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Upstream provider failed (502).
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Upstream provider timed out (504).
    #[error("Upstream timeout")]
    UpstreamTimeout,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<common::Error> for AppError {
    fn from(err: common::Error) -> Self {
        match err {
            common::Error::Timeout => AppError::UpstreamTimeout,
            common::Error::HttpStatus { status, body } => AppError::Upstream(format!(
                "OpenAI returned {}: {}",
                status,
                common::truncate(&body, 200)
            )),
            e @ (common::Error::Http(_) | common::Error::CryptoPanic(_)) => {
                AppError::Upstream(e.to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = axum::Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
