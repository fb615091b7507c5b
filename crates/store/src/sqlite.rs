//! SQLite content host for standalone deployments.
//!
//! Backs the full [`ContentHost`] surface with five tables: content items,
//! users, the content-type registry, sites, and per-site options.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;

use marginalia_core::content::{ContentItem, ContentQuery, NewContentItem, UserProfile};
use marginalia_core::{CoreError, DbId};

use crate::host::ContentHost;

const ITEM_COLUMNS: &str = "id, content_type, parent_id, author_id, status, excerpt, body, created_at";

/// A [`ContentHost`] backed by a SQLite database.
///
/// One instance serves one site; `site_id` scopes option reads and writes.
pub struct SqliteHost {
    pool: SqlitePool,
    site_id: DbId,
}

impl SqliteHost {
    /// Wrap an existing pool, serving site 1.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool, site_id: 1 }
    }

    /// Wrap an existing pool, serving the given site.
    pub fn for_site(pool: SqlitePool, site_id: DbId) -> Self {
        Self { pool, site_id }
    }

    /// Create the schema if missing and seed the stock registry: site 1,
    /// with `post` and `page` keeping revisions.
    pub async fn init(&self) -> Result<(), CoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS content_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content_type TEXT NOT NULL,
                parent_id INTEGER NOT NULL DEFAULT 0,
                author_id INTEGER NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'draft',
                excerpt TEXT NOT NULL DEFAULT '',
                body TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_content_items_parent
                ON content_items(content_type, parent_id);

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                display_name TEXT NOT NULL,
                avatar_url TEXT
            );

            CREATE TABLE IF NOT EXISTS content_types (
                name TEXT PRIMARY KEY,
                supports_revisions INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS sites (
                id INTEGER PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS options (
                site_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (site_id, name)
            );

            INSERT OR IGNORE INTO sites (id) VALUES (1);
            INSERT OR IGNORE INTO content_types (name, supports_revisions)
                VALUES ('post', 1), ('page', 1);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(host_err)?;

        Ok(())
    }

    /// Insert or replace a user account.
    pub async fn upsert_user(&self, profile: &UserProfile) -> Result<(), CoreError> {
        sqlx::query("INSERT OR REPLACE INTO users (id, display_name, avatar_url) VALUES (?, ?, ?)")
            .bind(profile.id)
            .bind(&profile.display_name)
            .bind(&profile.avatar_url)
            .execute(&self.pool)
            .await
            .map_err(host_err)?;
        Ok(())
    }

    /// Insert or replace a content-type registration.
    pub async fn register_content_type(
        &self,
        name: &str,
        supports_revisions: bool,
    ) -> Result<(), CoreError> {
        sqlx::query("INSERT OR REPLACE INTO content_types (name, supports_revisions) VALUES (?, ?)")
            .bind(name)
            .bind(supports_revisions as i64)
            .execute(&self.pool)
            .await
            .map_err(host_err)?;
        Ok(())
    }

    /// Register an additional site.
    pub async fn add_site(&self, site_id: DbId) -> Result<(), CoreError> {
        sqlx::query("INSERT OR IGNORE INTO sites (id) VALUES (?)")
            .bind(site_id)
            .execute(&self.pool)
            .await
            .map_err(host_err)?;
        Ok(())
    }
}

#[async_trait]
impl ContentHost for SqliteHost {
    async fn insert_item(&self, item: NewContentItem) -> Result<ContentItem, CoreError> {
        if item.body.is_empty() && item.excerpt.is_empty() {
            return Err(CoreError::Persistence(
                "refusing item with empty body and excerpt".to_string(),
            ));
        }

        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO content_items (content_type, parent_id, author_id, status, excerpt, body, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&item.content_type)
        .bind(item.parent_id)
        .bind(item.author_id)
        .bind(&item.status)
        .bind(&item.excerpt)
        .bind(&item.body)
        .bind(encode_timestamp(created_at))
        .execute(&self.pool)
        .await
        .map_err(host_err)?;

        Ok(ContentItem {
            id: result.last_insert_rowid(),
            content_type: item.content_type,
            parent_id: item.parent_id,
            author_id: item.author_id,
            status: item.status,
            excerpt: item.excerpt,
            body: item.body,
            created_at,
        })
    }

    async fn delete_item(&self, id: DbId) -> Result<bool, CoreError> {
        let result = sqlx::query("DELETE FROM content_items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(host_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_item(&self, id: DbId) -> Result<Option<ContentItem>, CoreError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM content_items WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(host_err)?;

        row.map(ItemRow::into_item).transpose()
    }

    async fn query_items(&self, query: &ContentQuery) -> Result<Vec<ContentItem>, CoreError> {
        // Timestamps are stored in a fixed-width RFC 3339 form, so text
        // ordering is chronological; id breaks ties within one tick.
        let sql = match query.per_page {
            None => format!(
                "SELECT {ITEM_COLUMNS} FROM content_items \
                 WHERE content_type = ? AND parent_id = ? \
                 ORDER BY created_at ASC, id ASC"
            ),
            Some(per_page) => format!(
                "SELECT {ITEM_COLUMNS} FROM ( \
                 SELECT {ITEM_COLUMNS} FROM content_items \
                 WHERE content_type = ? AND parent_id = ? \
                 ORDER BY created_at DESC, id DESC LIMIT {per_page} \
                 ) AS recent ORDER BY created_at ASC, id ASC"
            ),
        };

        let rows = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(&query.content_type)
            .bind(query.parent_id)
            .fetch_all(&self.pool)
            .await
            .map_err(host_err)?;

        rows.into_iter().map(ItemRow::into_item).collect()
    }

    async fn user_profile(&self, id: DbId) -> Result<Option<UserProfile>, CoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, display_name, avatar_url FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(host_err)?;

        Ok(row.map(|r| UserProfile {
            id: r.id,
            display_name: r.display_name,
            avatar_url: r.avatar_url,
        }))
    }

    async fn type_supports_revisions(&self, content_type: &str) -> Result<bool, CoreError> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT supports_revisions FROM content_types WHERE name = ?")
                .bind(content_type)
                .fetch_optional(&self.pool)
                .await
                .map_err(host_err)?;
        Ok(row.map(|(flag,)| flag != 0).unwrap_or(false))
    }

    async fn read_option(&self, key: &str) -> Result<Option<serde_json::Value>, CoreError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM options WHERE site_id = ? AND name = ?")
                .bind(self.site_id)
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(host_err)?;

        row.map(|(raw,)| {
            serde_json::from_str(&raw)
                .map_err(|e| CoreError::Host(format!("option '{key}' is not valid JSON: {e}")))
        })
        .transpose()
    }

    async fn write_option(&self, key: &str, value: serde_json::Value) -> Result<(), CoreError> {
        let raw = serde_json::to_string(&value)
            .map_err(|e| CoreError::Host(format!("option '{key}' failed to encode: {e}")))?;
        sqlx::query("INSERT OR REPLACE INTO options (site_id, name, value) VALUES (?, ?, ?)")
            .bind(self.site_id)
            .bind(key)
            .bind(raw)
            .execute(&self.pool)
            .await
            .map_err(host_err)?;
        Ok(())
    }

    async fn site_ids(&self) -> Result<Vec<DbId>, CoreError> {
        let rows: Vec<(DbId,)> = sqlx::query_as("SELECT id FROM sites ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(host_err)?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn delete_option(&self, site_id: DbId, key: &str) -> Result<(), CoreError> {
        sqlx::query("DELETE FROM options WHERE site_id = ? AND name = ?")
            .bind(site_id)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(host_err)?;
        Ok(())
    }
}

fn host_err(e: sqlx::Error) -> CoreError {
    CoreError::Host(e.to_string())
}

/// Fixed-width RFC 3339 so stored timestamps order lexicographically.
fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Internal row type for content item queries.
#[derive(sqlx::FromRow)]
struct ItemRow {
    id: DbId,
    content_type: String,
    parent_id: DbId,
    author_id: DbId,
    status: String,
    excerpt: String,
    body: String,
    created_at: String,
}

impl ItemRow {
    fn into_item(self) -> Result<ContentItem, CoreError> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| {
                CoreError::Host(format!("content item {}: invalid created_at: {e}", self.id))
            })?
            .with_timezone(&Utc);

        Ok(ContentItem {
            id: self.id,
            content_type: self.content_type,
            parent_id: self.parent_id,
            author_id: self.author_id,
            status: self.status,
            excerpt: self.excerpt,
            body: self.body,
            created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: DbId,
    display_name: String,
    avatar_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_host() -> SqliteHost {
        // One connection; `:memory:` databases are per-connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap();
        let host = SqliteHost::new(pool);
        host.init().await.unwrap();
        host
    }

    fn new_item(parent_id: DbId, body: &str) -> NewContentItem {
        NewContentItem {
            content_type: "edit_annotation".to_string(),
            parent_id,
            author_id: 3,
            status: "publish".to_string(),
            excerpt: "comment".to_string(),
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn insert_and_find_round_trip() {
        let host = setup_host().await;
        let stored = host.insert_item(new_item(10, "note")).await.unwrap();
        let found = host.find_item(stored.id).await.unwrap().unwrap();
        assert_eq!(found.body, "note");
        assert_eq!(found.parent_id, 10);
        assert_eq!(found.excerpt, "comment");
        assert_eq!(found.created_at, stored.created_at);
    }

    #[tokio::test]
    async fn insert_refuses_empty_record() {
        let host = setup_host().await;
        let mut item = new_item(10, "");
        item.excerpt = String::new();
        let err = host.insert_item(item).await.unwrap_err();
        assert!(matches!(err, CoreError::Persistence(_)));
    }

    #[tokio::test]
    async fn query_orders_oldest_first() {
        let host = setup_host().await;
        for body in ["one", "two", "three"] {
            host.insert_item(new_item(10, body)).await.unwrap();
        }
        let found = host
            .query_items(&ContentQuery::for_parent("edit_annotation", 10))
            .await
            .unwrap();
        let bodies: Vec<&str> = found.iter().map(|i| i.body.as_str()).collect();
        assert_eq!(bodies, ["one", "two", "three"]);
    }

    #[tokio::test]
    async fn per_page_window_keeps_most_recent() {
        let host = setup_host().await;
        for body in ["one", "two", "three", "four"] {
            host.insert_item(new_item(10, body)).await.unwrap();
        }
        let found = host
            .query_items(&ContentQuery::for_parent("edit_annotation", 10).with_per_page(2))
            .await
            .unwrap();
        let bodies: Vec<&str> = found.iter().map(|i| i.body.as_str()).collect();
        assert_eq!(bodies, ["three", "four"]);
    }

    #[tokio::test]
    async fn query_ignores_other_parents() {
        let host = setup_host().await;
        host.insert_item(new_item(10, "mine")).await.unwrap();
        host.insert_item(new_item(11, "other")).await.unwrap();
        let found = host
            .query_items(&ContentQuery::for_parent("edit_annotation", 10))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].body, "mine");
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_went() {
        let host = setup_host().await;
        let stored = host.insert_item(new_item(10, "x")).await.unwrap();
        assert!(host.delete_item(stored.id).await.unwrap());
        assert!(!host.delete_item(stored.id).await.unwrap());
        assert!(host.find_item(stored.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn user_profiles_round_trip() {
        let host = setup_host().await;
        host.upsert_user(&UserProfile {
            id: 9,
            display_name: "Sam".to_string(),
            avatar_url: Some("https://avatars.example/9.png".to_string()),
        })
        .await
        .unwrap();

        let profile = host.user_profile(9).await.unwrap().unwrap();
        assert_eq!(profile.display_name, "Sam");
        assert!(host.user_profile(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn revision_support_follows_registry() {
        let host = setup_host().await;
        assert!(host.type_supports_revisions("post").await.unwrap());
        assert!(!host.type_supports_revisions("product").await.unwrap());
        host.register_content_type("product", true).await.unwrap();
        assert!(host.type_supports_revisions("product").await.unwrap());
        host.register_content_type("post", false).await.unwrap();
        assert!(!host.type_supports_revisions("post").await.unwrap());
    }

    #[tokio::test]
    async fn options_round_trip_as_json() {
        let host = setup_host().await;
        assert!(host.read_option("k").await.unwrap().is_none());
        host.write_option("k", serde_json::json!(["post", "page"]))
            .await
            .unwrap();
        assert_eq!(
            host.read_option("k").await.unwrap(),
            Some(serde_json::json!(["post", "page"]))
        );
    }

    #[tokio::test]
    async fn sites_and_per_site_option_removal() {
        let host = setup_host().await;
        host.add_site(2).await.unwrap();
        assert_eq!(host.site_ids().await.unwrap(), vec![1, 2]);

        host.write_option("k", serde_json::json!(1)).await.unwrap();
        host.delete_option(1, "k").await.unwrap();
        assert!(host.read_option("k").await.unwrap().is_none());
    }
}
