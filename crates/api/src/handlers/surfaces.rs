//! Handlers for the admin-screen surfaces.
//!
//! These return rendered HTML (the edit-screen panel and the list-table
//! column fragment) plus the localized string bundle the admin script
//! loads at startup.

use axum::extract::{Path, State};
use axum::response::Html;
use axum::Json;

use marginalia_core::fragment::RenderMode;
use marginalia_core::DbId;
use marginalia_store::render::ClientStrings;

use crate::error::AppResult;
use crate::extract::ActingUser;
use crate::state::AppState;

/// GET /posts/{id}/panel
///
/// The edit-screen annotation panel for one content item, rendered for
/// the acting user.
pub async fn post_panel(
    actor: ActingUser,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
) -> AppResult<Html<String>> {
    let html = state.renderer.render_panel(post_id, actor.0).await?;
    Ok(Html(html))
}

/// GET /posts/{id}/column
///
/// The list-table column fragment: the most recent annotations, delete
/// controls suppressed.
pub async fn post_column(
    actor: ActingUser,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
) -> AppResult<Html<String>> {
    let html = state
        .renderer
        .render_list(post_id, actor.0, RenderMode::Column)
        .await?;
    Ok(Html(html))
}

/// GET /strings
///
/// The localized string bundle the admin-screen script needs at runtime.
pub async fn client_strings(State(state): State<AppState>) -> Json<ClientStrings> {
    Json(state.renderer.client_strings())
}
