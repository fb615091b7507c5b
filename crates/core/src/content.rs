//! Generic view of host CMS records.
//!
//! The service never talks to the host's tables directly; it works against
//! these neutral shapes, produced and consumed by the `ContentHost` trait in
//! `marginalia-store`. Field meanings follow the host convention: the
//! excerpt carries the annotation subtype token, the body carries the note
//! text, and a `parent_id` of zero means the item hangs off nothing.

use crate::types::{DbId, Timestamp};

/// Sentinel parent id for items not attached to any other item.
pub const NO_PARENT: DbId = 0;

/// A content item as the host hands it back.
#[derive(Debug, Clone)]
pub struct ContentItem {
    pub id: DbId,
    pub content_type: String,
    pub parent_id: DbId,
    pub author_id: DbId,
    pub status: String,
    pub excerpt: String,
    pub body: String,
    pub created_at: Timestamp,
}

impl ContentItem {
    /// Whether this item is attached to a parent item.
    pub fn has_parent(&self) -> bool {
        self.parent_id != NO_PARENT
    }
}

/// Fields for a content item to be inserted. The host assigns id and
/// creation timestamp.
#[derive(Debug, Clone)]
pub struct NewContentItem {
    pub content_type: String,
    pub parent_id: DbId,
    pub author_id: DbId,
    pub status: String,
    pub excerpt: String,
    pub body: String,
}

/// Selection criteria for querying content items.
///
/// Results are always returned oldest-first. When `per_page` is set, the
/// window keeps the most recent matches and still returns them oldest-first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentQuery {
    pub content_type: String,
    pub parent_id: DbId,
    pub per_page: Option<usize>,
}

impl ContentQuery {
    /// Query for every item of `content_type` attached to `parent_id`.
    pub fn for_parent(content_type: impl Into<String>, parent_id: DbId) -> Self {
        Self {
            content_type: content_type.into(),
            parent_id,
            per_page: None,
        }
    }

    /// Restrict the query to the `per_page` most recent matches.
    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = Some(per_page);
        self
    }
}

/// Host account details needed to render an annotation author.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub id: DbId,
    pub display_name: String,
    pub avatar_url: Option<String>,
}
