//! Editorial annotation records and domain constants.
//!
//! Annotations are private notes attached to a content item in the host
//! CMS: free-text comments left by editors, plus automatic markers recorded
//! when a revision is saved or a publication status changes. The host stores
//! them as ordinary content items of a dedicated type; this module defines
//! the typed view the rest of the service works with.

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Content type under which annotations are stored in the host.
pub const ANNOTATION_CONTENT_TYPE: &str = "edit_annotation";

/// Content type the host assigns to revision snapshots.
pub const REVISION_CONTENT_TYPE: &str = "revision";

/// Placeholder status the host assigns to items that were never saved.
/// Transitions into or out of it are bookkeeping, not editorial activity.
pub const STATUS_AUTO_DRAFT: &str = "auto-draft";

/// Advisory ceiling on annotations per content item. Exceeding it flags the
/// rendered fragment so the client can warn; inserts are never blocked.
pub const ANNOTATION_LIMIT_PER_ITEM: usize = 100;

/// How many annotations the compact overview column shows per item.
pub const COLUMN_PAGE_SIZE: usize = 5;

/// Pixel size of author avatars in rendered fragments.
pub const AVATAR_SIZE: u32 = 18;

/// Host option key holding the list of annotatable content types.
pub const ACTIVE_TYPES_OPTION: &str = "marginalia_active_types";

/// Content types annotations are enabled for when no option is stored.
pub const DEFAULT_ACTIVE_TYPES: &[&str] = &["post", "page"];

/// Default prefix for links back to a revision diff screen in the host.
pub const DEFAULT_REVISION_LINK_BASE: &str = "revision.php?revision=";

// ---------------------------------------------------------------------------
// Subtype
// ---------------------------------------------------------------------------

/// What kind of note an annotation is.
///
/// Stored as a token in the host record's excerpt field. The token doubles
/// as a CSS class on the rendered entry, so `as_str` values are part of the
/// markup contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subtype {
    /// Free-text note typed by an editor.
    Comment,
    /// Automatic marker: a revision of the parent item was saved. The body
    /// holds the revision item's id.
    Revision,
    /// Automatic marker: the parent item's status changed. The body holds
    /// `old,new` status tokens.
    Status,
}

impl Subtype {
    /// Return the subtype as its stored token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Revision => "revision",
            Self::Status => "status",
        }
    }

    /// Decode a stored token into a subtype.
    ///
    /// Unknown or empty tokens decode as [`Subtype::Comment`]: rows written
    /// by earlier deployments carry free-form excerpts and must keep
    /// rendering as plain comments rather than fail.
    pub fn from_token(token: &str) -> Self {
        match token {
            "revision" => Self::Revision,
            "status" => Self::Status,
            _ => Self::Comment,
        }
    }
}

impl std::fmt::Display for Subtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Annotation record
// ---------------------------------------------------------------------------

/// A single editorial annotation, decoded from its host record.
#[derive(Debug, Clone)]
pub struct Annotation {
    pub id: DbId,
    /// Id of the content item the annotation is attached to.
    pub parent_id: DbId,
    pub author_id: DbId,
    pub subtype: Subtype,
    /// Free text for comments; revision id or `old,new` pair for markers.
    pub body: String,
    pub created_at: Timestamp,
}

/// Fields for a new annotation, before the host assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewAnnotation {
    pub parent_id: DbId,
    pub author_id: DbId,
    pub subtype: Subtype,
    pub body: String,
}

// ---------------------------------------------------------------------------
// Status-change body
// ---------------------------------------------------------------------------

/// Decoded body of a [`Subtype::Status`] annotation.
///
/// The stored form is `old,new`. Bodies written by hand or by older
/// deployments may carry one token or none; rendering degrades to whatever
/// is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    /// First token. Empty when the body was empty.
    pub old: String,
    /// Second token, if the body contained a comma.
    pub new: Option<String>,
}

impl StatusChange {
    /// Split an annotation body into its status tokens.
    ///
    /// Only the first two comma-separated tokens are significant; anything
    /// after a second comma is ignored.
    pub fn parse(body: &str) -> Self {
        let mut tokens = body.split(',');
        let old = tokens.next().unwrap_or_default().to_string();
        let new = tokens.next().map(str::to_string);
        Self { old, new }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
