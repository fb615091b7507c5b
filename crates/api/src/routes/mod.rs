pub mod comments;
pub mod events;
pub mod health;
pub mod surfaces;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /comments/insert          POST  store a comment, return the fragment
/// /comments/delete          POST  delete a comment, return the fragment
/// /comments/refresh         POST  re-render the fragment, no mutation
///
/// /posts/{id}/panel         GET   edit-screen panel HTML
/// /posts/{id}/column        GET   list-table column fragment HTML
/// /strings                  GET   localized client string bundle
///
/// /events/content-saved     POST  host save callback
/// /events/status-changed    POST  host status-transition callback
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(comments::router())
        .merge(surfaces::router())
        .merge(events::router())
}
