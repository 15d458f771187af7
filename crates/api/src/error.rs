use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tigersafe_core::error::CoreError;
use tigersafe_events::NotifyError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`NotifyError`] for fan-out
/// failures. Implements [`IntoResponse`] to produce consistent JSON error
/// responses of the form `{ "error": ..., "code": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `tigersafe_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failure from the notification engine.
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::Validation(errors.to_string()))
    }
}

/// Malformed or mistyped request bodies are validation failures.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Core(CoreError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),

            AppError::Notify(NotifyError::Core(core)) => classify_core_error(core),
            AppError::Notify(NotifyError::Directory(err)) => {
                tracing::error!(error = %err, "Directory read failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "DIRECTORY_UNAVAILABLE",
                    "Recipient directory is unavailable".to_string(),
                )
            }
            AppError::Notify(err @ NotifyError::Delivery { .. }) => {
                tracing::warn!(error = %err, "Push delivery failed");
                (StatusCode::BAD_GATEWAY, "DELIVERY_FAILED", err.to_string())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a domain error into an HTTP status, error code, and message.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::RecipientUnreachable { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "RECIPIENT_UNREACHABLE",
            err.to_string(),
        ),
    }
}
