use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use marginalia_core::CoreError;

use crate::response::Envelope;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce the `success: false` JSON
/// envelope the admin UI's request layer expects.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `marginalia_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A required request field was absent, empty, or zero.
    /// Carries the client-facing localized message.
    #[error("{0}")]
    MissingParameter(String),

    /// The request carried no usable acting-user identity.
    #[error("{0}")]
    Unauthorized(String),

    /// An operation target did not exist.
    /// Carries the client-facing localized message.
    #[error("{0}")]
    NotFound(String),

    /// The store rejected or failed a write.
    /// Carries the client-facing localized message.
    #[error("{0}")]
    Rejected(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                CoreError::Persistence(msg) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
                }
                CoreError::Host(msg) => {
                    tracing::error!(error = %msg, "Content host error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- HTTP-specific errors ---
            AppError::MissingParameter(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Rejected(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        (status, Json(Envelope::failure(message))).into_response()
    }
}
