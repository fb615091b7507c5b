//! In-memory content host for tests and local development.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use marginalia_core::content::{ContentItem, ContentQuery, NewContentItem, UserProfile};
use marginalia_core::{CoreError, DbId};

use crate::host::ContentHost;

#[derive(Default)]
struct Inner {
    items: BTreeMap<DbId, ContentItem>,
    users: HashMap<DbId, UserProfile>,
    /// Option values keyed by (site id, option name).
    options: HashMap<(DbId, String), serde_json::Value>,
    revision_types: HashSet<String>,
    sites: Vec<DbId>,
    next_id: DbId,
}

/// A [`ContentHost`] backed by process memory.
///
/// Starts out as site 1 with `post` and `page` keeping revisions, matching
/// a stock host install. Seeding helpers configure the rest.
pub struct MemoryHost {
    inner: Mutex<Inner>,
    site_id: DbId,
}

impl MemoryHost {
    pub fn new() -> Self {
        let inner = Inner {
            revision_types: ["post", "page"].iter().map(|s| s.to_string()).collect(),
            sites: vec![1],
            next_id: 1,
            ..Inner::default()
        };
        Self {
            inner: Mutex::new(inner),
            site_id: 1,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A poisoned lock only means another test thread panicked; the data
        // is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a user account.
    pub fn add_user(&self, profile: UserProfile) {
        self.lock().users.insert(profile.id, profile);
    }

    /// Set whether a content type keeps revision snapshots.
    pub fn set_revision_support(&self, content_type: &str, supported: bool) {
        let mut inner = self.lock();
        if supported {
            inner.revision_types.insert(content_type.to_string());
        } else {
            inner.revision_types.remove(content_type);
        }
    }

    /// Register an additional site id.
    pub fn add_site(&self, site_id: DbId) {
        let mut inner = self.lock();
        if !inner.sites.contains(&site_id) {
            inner.sites.push(site_id);
        }
    }

    /// Write an option for an arbitrary site.
    pub fn write_option_for_site(&self, site_id: DbId, key: &str, value: serde_json::Value) {
        self.lock().options.insert((site_id, key.to_string()), value);
    }

    /// Read an option from an arbitrary site.
    pub fn option_for_site(&self, site_id: DbId, key: &str) -> Option<serde_json::Value> {
        self.lock()
            .options
            .get(&(site_id, key.to_string()))
            .cloned()
    }

    /// Number of stored items, across all types.
    pub fn item_count(&self) -> usize {
        self.lock().items.len()
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentHost for MemoryHost {
    async fn insert_item(&self, item: NewContentItem) -> Result<ContentItem, CoreError> {
        if item.body.is_empty() && item.excerpt.is_empty() {
            return Err(CoreError::Persistence(
                "refusing item with empty body and excerpt".to_string(),
            ));
        }

        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        let stored = ContentItem {
            id,
            content_type: item.content_type,
            parent_id: item.parent_id,
            author_id: item.author_id,
            status: item.status,
            excerpt: item.excerpt,
            body: item.body,
            created_at: Utc::now(),
        };
        inner.items.insert(id, stored.clone());
        Ok(stored)
    }

    async fn delete_item(&self, id: DbId) -> Result<bool, CoreError> {
        Ok(self.lock().items.remove(&id).is_some())
    }

    async fn find_item(&self, id: DbId) -> Result<Option<ContentItem>, CoreError> {
        Ok(self.lock().items.get(&id).cloned())
    }

    async fn query_items(&self, query: &ContentQuery) -> Result<Vec<ContentItem>, CoreError> {
        let inner = self.lock();
        let mut matches: Vec<ContentItem> = inner
            .items
            .values()
            .filter(|item| {
                item.content_type == query.content_type && item.parent_id == query.parent_id
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        if let Some(per_page) = query.per_page {
            let skip = matches.len().saturating_sub(per_page);
            matches.drain(..skip);
        }
        Ok(matches)
    }

    async fn user_profile(&self, id: DbId) -> Result<Option<UserProfile>, CoreError> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn type_supports_revisions(&self, content_type: &str) -> Result<bool, CoreError> {
        Ok(self.lock().revision_types.contains(content_type))
    }

    async fn read_option(&self, key: &str) -> Result<Option<serde_json::Value>, CoreError> {
        Ok(self
            .lock()
            .options
            .get(&(self.site_id, key.to_string()))
            .cloned())
    }

    async fn write_option(&self, key: &str, value: serde_json::Value) -> Result<(), CoreError> {
        self.lock()
            .options
            .insert((self.site_id, key.to_string()), value);
        Ok(())
    }

    async fn site_ids(&self) -> Result<Vec<DbId>, CoreError> {
        Ok(self.lock().sites.clone())
    }

    async fn delete_option(&self, site_id: DbId, key: &str) -> Result<(), CoreError> {
        self.lock().options.remove(&(site_id, key.to_string()));
        Ok(())
    }
}
