//! Handlers for the comment endpoints.
//!
//! Insert, delete, and refresh all answer with the same envelope: on
//! success the freshly rendered Edit-mode fragment for the target item,
//! on failure a localized message. The fragment is re-listed from the
//! store on every call, so the response always reflects store state at
//! return time.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use marginalia_core::annotation::{NewAnnotation, Subtype};
use marginalia_core::filters::InsertedAnnotation;
use marginalia_core::fragment::RenderMode;
use marginalia_core::labels::{
    MSG_DELETE_FAILED, MSG_INSERT_REFUSED, MSG_PARAMETER_MISSING, MSG_PARAMETER_MISSING_DELETE,
};
use marginalia_core::{CoreError, DbId};

use crate::error::{AppError, AppResult};
use crate::extract::ActingUser;
use crate::response::{CommentsPayload, Envelope};
use crate::state::AppState;

/* --------------------------------------------------------------------------
   Request bodies
   -------------------------------------------------------------------------- */

// Fields default so that an omitted id reads as 0 and an omitted body as
// "" -- both count as missing under the falsy parameter rule.

#[derive(Debug, Deserialize)]
pub struct InsertCommentRequest {
    #[serde(default)]
    pub post_id: DbId,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteCommentRequest {
    #[serde(default)]
    pub post_id: DbId,
    #[serde(default)]
    pub comment_id: DbId,
}

#[derive(Debug, Deserialize)]
pub struct RefreshCommentsRequest {
    #[serde(default)]
    pub post_id: DbId,
}

/* --------------------------------------------------------------------------
   Handlers
   -------------------------------------------------------------------------- */

/// POST /comments/insert
///
/// Store a new `comment` annotation by the acting user, fire the
/// post-insert hook, and return the re-rendered fragment.
pub async fn insert_comment(
    actor: ActingUser,
    State(state): State<AppState>,
    Json(input): Json<InsertCommentRequest>,
) -> AppResult<Json<Envelope<CommentsPayload>>> {
    if input.post_id == 0 || input.comment.is_empty() {
        return Err(missing(&state, MSG_PARAMETER_MISSING));
    }

    let annotation = state
        .store
        .create(NewAnnotation {
            parent_id: input.post_id,
            author_id: actor.0,
            subtype: Subtype::Comment,
            body: input.comment,
        })
        .await
        .map_err(|err| {
            tracing::warn!(error = %err, post_id = input.post_id, "Comment insert refused");
            AppError::Rejected(state.catalog.translate(MSG_INSERT_REFUSED).to_string())
        })?;

    state.filters.after_insert.fire(&InsertedAnnotation {
        parent_id: annotation.parent_id,
        author_id: annotation.author_id,
        annotation_id: annotation.id,
        subtype: annotation.subtype,
    });

    tracing::info!(
        user_id = actor.0,
        post_id = annotation.parent_id,
        comment_id = annotation.id,
        "Comment inserted"
    );

    respond_with_fragment(&state, annotation.parent_id, actor).await
}

/// POST /comments/delete
///
/// Permanently delete a comment and return the re-rendered fragment.
/// Ownership is enforced by the rendered UI, not re-checked here.
pub async fn delete_comment(
    actor: ActingUser,
    State(state): State<AppState>,
    Json(input): Json<DeleteCommentRequest>,
) -> AppResult<Json<Envelope<CommentsPayload>>> {
    if input.post_id == 0 || input.comment_id == 0 {
        return Err(missing(&state, MSG_PARAMETER_MISSING_DELETE));
    }

    if let Err(err) = state.store.delete(input.comment_id).await {
        let message = state.catalog.translate(MSG_DELETE_FAILED).to_string();
        return Err(match err {
            CoreError::NotFound { .. } => AppError::NotFound(message),
            other => {
                tracing::error!(
                    error = %other,
                    comment_id = input.comment_id,
                    "Comment delete failed"
                );
                AppError::Rejected(message)
            }
        });
    }

    tracing::info!(
        user_id = actor.0,
        post_id = input.post_id,
        comment_id = input.comment_id,
        "Comment deleted"
    );

    respond_with_fragment(&state, input.post_id, actor).await
}

/// POST /comments/refresh
///
/// Re-render the fragment with no mutation, to resynchronize the UI
/// after external changes.
pub async fn refresh_comments(
    actor: ActingUser,
    State(state): State<AppState>,
    Json(input): Json<RefreshCommentsRequest>,
) -> AppResult<Json<Envelope<CommentsPayload>>> {
    if input.post_id == 0 {
        return Err(missing(&state, MSG_PARAMETER_MISSING));
    }
    respond_with_fragment(&state, input.post_id, actor).await
}

/* --------------------------------------------------------------------------
   Helpers
   -------------------------------------------------------------------------- */

/// Render the Edit-mode fragment for `post_id` and wrap it in the envelope.
async fn respond_with_fragment(
    state: &AppState,
    post_id: DbId,
    actor: ActingUser,
) -> AppResult<Json<Envelope<CommentsPayload>>> {
    let comments = state
        .renderer
        .render_list(post_id, actor.0, RenderMode::Edit)
        .await?;
    Ok(Json(Envelope::ok(CommentsPayload { comments })))
}

/// A missing-parameter rejection with the localized message for `msgid`.
fn missing(state: &AppState, msgid: &str) -> AppError {
    AppError::MissingParameter(state.catalog.translate(msgid).to_string())
}
