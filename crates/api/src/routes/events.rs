//! Route definitions for the host lifecycle callbacks.

use axum::routing::post;
use axum::Router;

use crate::handlers::events;
use crate::state::AppState;

/// Lifecycle callback routes, mounted under `/api/v1`.
///
/// ```text
/// POST /events/content-saved      content_saved
/// POST /events/status-changed     status_changed
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events/content-saved", post(events::content_saved))
        .route("/events/status-changed", post(events::status_changed))
}
