//! Route definitions for the comment endpoints.

use axum::routing::post;
use axum::Router;

use crate::handlers::comments;
use crate::state::AppState;

/// Comment routes, mounted under `/api/v1`.
///
/// ```text
/// POST /comments/insert     insert_comment
/// POST /comments/delete     delete_comment
/// POST /comments/refresh    refresh_comments
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/comments/insert", post(comments::insert_comment))
        .route("/comments/delete", post(comments::delete_comment))
        .route("/comments/refresh", post(comments::refresh_comments))
}
