//! The content-host seam.
//!
//! Annotations live inside the host CMS as ordinary content items; the
//! host also owns user accounts, per-site options, and the content-type
//! registry. [`ContentHost`] is the full surface this service needs from
//! it. Implementations translate these calls onto whatever the host
//! actually is -- the in-process backends in this crate, or an RPC shim in
//! front of a real CMS.

use async_trait::async_trait;

use marginalia_core::content::{ContentItem, ContentQuery, NewContentItem, UserProfile};
use marginalia_core::{CoreError, DbId};

/// Host CMS operations the annotation service is built on.
///
/// Write operations must be atomic per call; no method may leave partial
/// state behind on error. `insert_item` must refuse a record whose body
/// and excerpt are both empty -- that is the host-side guard the insert
/// endpoint's refusal path surfaces.
#[async_trait]
pub trait ContentHost: Send + Sync {
    /// Store a new content item, assigning id and creation time.
    async fn insert_item(&self, item: NewContentItem) -> Result<ContentItem, CoreError>;

    /// Permanently delete an item. Returns `false` when no such item
    /// existed; reserves `Err` for backend failures.
    async fn delete_item(&self, id: DbId) -> Result<bool, CoreError>;

    /// Fetch a single item by id.
    async fn find_item(&self, id: DbId) -> Result<Option<ContentItem>, CoreError>;

    /// Fetch items matching the query, oldest first. A `per_page` window
    /// keeps the most recent matches, still oldest first.
    async fn query_items(&self, query: &ContentQuery) -> Result<Vec<ContentItem>, CoreError>;

    /// Look up a user account for display.
    async fn user_profile(&self, id: DbId) -> Result<Option<UserProfile>, CoreError>;

    /// Whether the given content type keeps revision snapshots.
    async fn type_supports_revisions(&self, content_type: &str) -> Result<bool, CoreError>;

    /// Read a stored option for the current site.
    async fn read_option(&self, key: &str) -> Result<Option<serde_json::Value>, CoreError>;

    /// Write an option for the current site.
    async fn write_option(&self, key: &str, value: serde_json::Value) -> Result<(), CoreError>;

    /// Ids of every site this host serves. Single-site hosts return one id.
    async fn site_ids(&self) -> Result<Vec<DbId>, CoreError>;

    /// Remove an option from one specific site. Used at uninstall.
    async fn delete_option(&self, site_id: DbId, key: &str) -> Result<(), CoreError>;
}
