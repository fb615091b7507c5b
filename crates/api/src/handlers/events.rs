//! Handlers for host lifecycle callbacks.
//!
//! The host CMS reports saves and status transitions here. Handlers load
//! the item, publish the matching [`ContentEvent`] on the bus, and return
//! immediately; the lifecycle recorder decides asynchronously whether an
//! annotation follows.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use marginalia_core::{CoreError, DbId};
use marginalia_events::ContentEvent;

use crate::error::{AppError, AppResult};
use crate::extract::ActingUser;
use crate::response::{Envelope, EventPayload};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ContentSavedRequest {
    #[serde(default)]
    pub item_id: DbId,
}

#[derive(Debug, Deserialize)]
pub struct StatusChangedRequest {
    #[serde(default)]
    pub item_id: DbId,
    #[serde(default)]
    pub old_status: String,
    #[serde(default)]
    pub new_status: String,
}

/// POST /events/content-saved
///
/// Report that the host wrote a content item (revision snapshots
/// included). The saved item must exist at callback time.
pub async fn content_saved(
    actor: ActingUser,
    State(state): State<AppState>,
    Json(input): Json<ContentSavedRequest>,
) -> AppResult<Json<Envelope<EventPayload>>> {
    if input.item_id == 0 {
        return Err(AppError::MissingParameter("item_id is required".into()));
    }

    let item = state
        .host
        .find_item(input.item_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "content item",
                id: input.item_id,
            })
        })?;

    let event = ContentEvent::ItemSaved {
        item,
        actor_id: actor.0,
    };
    let kind = event.kind();
    state.event_bus.publish(event);

    Ok(Json(Envelope::ok(EventPayload { event: kind })))
}

/// POST /events/status-changed
///
/// Report that a content item moved between publication statuses.
pub async fn status_changed(
    actor: ActingUser,
    State(state): State<AppState>,
    Json(input): Json<StatusChangedRequest>,
) -> AppResult<Json<Envelope<EventPayload>>> {
    if input.item_id == 0 {
        return Err(AppError::MissingParameter("item_id is required".into()));
    }
    if input.old_status.is_empty() || input.new_status.is_empty() {
        return Err(AppError::MissingParameter(
            "old_status and new_status are required".into(),
        ));
    }

    let item = state
        .host
        .find_item(input.item_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "content item",
                id: input.item_id,
            })
        })?;

    let event = ContentEvent::StatusChanged {
        item,
        old_status: input.old_status,
        new_status: input.new_status,
        actor_id: actor.0,
    };
    let kind = event.kind();
    state.event_bus.publish(event);

    Ok(Json(Envelope::ok(EventPayload { event: kind })))
}
