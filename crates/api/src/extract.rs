//! Acting-user extractor for Axum handlers.
//!
//! Authentication itself belongs to the host CMS: its admin session layer
//! sits in front of this service and forwards the signed-in user's id in
//! the `x-acting-user` header. This extractor only consumes that
//! established identity.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use marginalia_core::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the authenticated admin user's id.
pub const ACTING_USER_HEADER: &str = "x-acting-user";

/// The user on whose behalf the request runs.
///
/// Use this as an extractor parameter in any handler that needs the
/// viewer identity:
///
/// ```ignore
/// async fn my_handler(actor: ActingUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = actor.0, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ActingUser(pub DbId);

impl FromRequestParts<AppState> for ActingUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(ACTING_USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Unauthorized(format!("Missing {ACTING_USER_HEADER} header"))
            })?;

        let user_id: DbId = header.trim().parse().map_err(|_| {
            AppError::Unauthorized(format!("Invalid {ACTING_USER_HEADER} header"))
        })?;

        if user_id <= 0 {
            return Err(AppError::Unauthorized(format!(
                "Invalid {ACTING_USER_HEADER} header"
            )));
        }

        Ok(ActingUser(user_id))
    }
}
