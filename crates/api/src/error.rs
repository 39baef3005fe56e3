use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mangaledger_core::error::CoreError;
use mangaledger_history::EventLogError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`EventLogError`] for anchor
/// lookups, and adds HTTP-specific variants. Implements [`IntoResponse`] to
/// produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `mangaledger_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The anchor event log could not be queried.
    #[error(transparent)]
    EventLog(#[from] EventLogError),

    /// The requested record or entity has no available data.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(CoreError::InvalidAddress(_)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", self.to_string())
            }
            AppError::EventLog(err) => {
                tracing::error!(error = %err, "Event log unavailable");
                (
                    StatusCode::BAD_GATEWAY,
                    "EVENT_LOG_UNAVAILABLE",
                    "The anchor event log is unavailable".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_address_maps_to_400() {
        let response =
            AppError::Core(CoreError::InvalidAddress("a/b".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn event_log_failure_maps_to_502() {
        let response =
            AppError::EventLog(EventLogError::Connection("refused".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = AppError::NotFound("record QmX".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
