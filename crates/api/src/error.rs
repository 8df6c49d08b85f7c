use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cirelay_core::CoreError;
use cirelay_db::StoreError;
use cirelay_events::{ForwardError, NotifyError};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for payload errors and [`StoreError`] for event log
/// failures. Implements [`IntoResponse`] to produce consistent JSON error
/// responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `cirelay_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The event store could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(CoreError::MalformedPayload(msg)) => {
                (StatusCode::BAD_REQUEST, "MALFORMED_PAYLOAD", msg.clone())
            }
            AppError::Store(err @ StoreError::Corrupt { .. }) => {
                tracing::error!(error = %err, "Event store is corrupt");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CORRUPT_STORE",
                    "The event store is corrupt and cannot be read".to_string(),
                )
            }
            AppError::Store(err) => {
                tracing::error!(error = %err, "Event store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Failure to construct the outbound HTTP clients at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Failed to build forward client: {0}")]
    Forward(#[from] ForwardError),

    #[error("Failed to build Slack client: {0}")]
    Notify(#[from] NotifyError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_payload_maps_to_400() {
        let response =
            AppError::Core(CoreError::MalformedPayload("expected value".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn corrupt_store_maps_to_500() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AppError::Store(StoreError::Corrupt {
            path: "github_events.json".into(),
            source,
        });
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
