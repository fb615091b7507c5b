//! Route definitions for the admin-screen surfaces.

use axum::routing::get;
use axum::Router;

use crate::handlers::surfaces;
use crate::state::AppState;

/// Admin-surface routes, mounted under `/api/v1`.
///
/// ```text
/// GET /posts/{id}/panel     post_panel
/// GET /posts/{id}/column    post_column
/// GET /strings              client_strings
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts/{id}/panel", get(surfaces::post_panel))
        .route("/posts/{id}/column", get(surfaces::post_column))
        .route("/strings", get(surfaces::client_strings))
}
