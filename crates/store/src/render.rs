//! Fragment rendering service.
//!
//! Pulls annotations through the store adapter, resolves authors against
//! the host, and hands the assembled entry views to the pure builders in
//! `marginalia_core::fragment`.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use marginalia_core::annotation::{
    ANNOTATION_LIMIT_PER_ITEM, COLUMN_PAGE_SIZE, DEFAULT_REVISION_LINK_BASE,
};
use marginalia_core::content::UserProfile;
use marginalia_core::filters::Filters;
use marginalia_core::fragment::{self, EntryView, RenderContext, RenderMode};
use marginalia_core::labels::{
    Catalog, MSG_COLUMN_NAME, MSG_COMMENTS_LIMIT, MSG_DELETE_FAILED_SHORT, MSG_NO_EMPTY,
    MSG_UPDATE_FAILED_SHORT,
};
use marginalia_core::{CoreError, DbId};

use crate::adapter::AnnotationStore;
use crate::host::ContentHost;

/// Renders annotation fragments and the edit-screen panel.
#[derive(Clone)]
pub struct Renderer {
    store: AnnotationStore,
    host: Arc<dyn ContentHost>,
    filters: Arc<Filters>,
    catalog: Arc<Catalog>,
    revision_link_base: String,
}

/// Localized strings the admin-screen script needs at runtime.
#[derive(Debug, Clone, Serialize)]
pub struct ClientStrings {
    pub delete_failed: String,
    pub update_failed: String,
    pub comments_limit: String,
    pub no_empty: String,
    pub column_heading: String,
}

impl Renderer {
    pub fn new(
        store: AnnotationStore,
        host: Arc<dyn ContentHost>,
        filters: Arc<Filters>,
        catalog: Arc<Catalog>,
    ) -> Self {
        Self {
            store,
            host,
            filters,
            catalog,
            revision_link_base: DEFAULT_REVISION_LINK_BASE.to_string(),
        }
    }

    /// Point revision links somewhere other than the stock diff screen.
    pub fn with_revision_link_base(mut self, base: impl Into<String>) -> Self {
        self.revision_link_base = base.into();
        self
    }

    /// Render the annotation list fragment for one content item.
    ///
    /// `viewer_id` decides which entries carry delete controls. Column
    /// mode windows the list to the configured page size.
    pub async fn render_list(
        &self,
        parent_id: DbId,
        viewer_id: DbId,
        mode: RenderMode,
    ) -> Result<String, CoreError> {
        let per_page = match mode {
            RenderMode::Column => Some(self.filters.column_page_size.apply(COLUMN_PAGE_SIZE)),
            RenderMode::Edit => None,
        };
        let annotations = self.store.list_page(parent_id, per_page).await?;

        // Resolve each author once, not once per entry.
        let mut profiles: HashMap<DbId, Option<UserProfile>> = HashMap::new();
        let mut entries = Vec::with_capacity(annotations.len());
        for annotation in annotations {
            let profile = match profiles.get(&annotation.author_id) {
                Some(cached) => cached.clone(),
                None => {
                    let fetched = self.host.user_profile(annotation.author_id).await?;
                    profiles.insert(annotation.author_id, fetched.clone());
                    fetched
                }
            };
            let (author_name, avatar_url) = match profile {
                Some(p) => (p.display_name, p.avatar_url),
                None => (String::new(), None),
            };
            entries.push(EntryView {
                is_viewer: annotation.author_id == viewer_id,
                annotation,
                author_name,
                avatar_url,
            });
        }

        let ctx = RenderContext {
            cap: self.filters.annotation_cap.apply(ANNOTATION_LIMIT_PER_ITEM),
            revision_link_base: &self.revision_link_base,
            catalog: &self.catalog,
            status_label: &self.filters.status_label,
        };
        Ok(fragment::render_annotations(parent_id, &entries, mode, &ctx))
    }

    /// Render the full edit-screen panel for one content item.
    ///
    /// The revisions toggle appears only when the item's content type
    /// keeps revisions; an unknown item still renders an empty panel.
    pub async fn render_panel(&self, parent_id: DbId, viewer_id: DbId) -> Result<String, CoreError> {
        let revisions_supported = match self.host.find_item(parent_id).await? {
            Some(parent) => self.host.type_supports_revisions(&parent.content_type).await?,
            None => false,
        };
        let list = self.render_list(parent_id, viewer_id, RenderMode::Edit).await?;
        Ok(fragment::render_panel(&list, revisions_supported, &self.catalog))
    }

    /// The localized string bundle for the admin-screen script.
    pub fn client_strings(&self) -> ClientStrings {
        ClientStrings {
            delete_failed: self.catalog.translate(MSG_DELETE_FAILED_SHORT).to_string(),
            update_failed: self.catalog.translate(MSG_UPDATE_FAILED_SHORT).to_string(),
            comments_limit: self.catalog.translate(MSG_COMMENTS_LIMIT).to_string(),
            no_empty: self.catalog.translate(MSG_NO_EMPTY).to_string(),
            column_heading: self.catalog.translate(MSG_COLUMN_NAME).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryHost;
    use marginalia_core::annotation::{NewAnnotation, Subtype};
    use marginalia_core::content::NewContentItem;

    struct Fixture {
        host: Arc<MemoryHost>,
        store: AnnotationStore,
        renderer: Renderer,
    }

    fn fixture_with(filters: Filters) -> Fixture {
        let host = Arc::new(MemoryHost::new());
        let filters = Arc::new(filters);
        let store = AnnotationStore::new(host.clone(), filters.clone());
        let renderer = Renderer::new(
            store.clone(),
            host.clone(),
            filters,
            Arc::new(Catalog::new()),
        );
        host.add_user(UserProfile {
            id: 7,
            display_name: "Alex".to_string(),
            avatar_url: Some("https://avatars.example/7.png".to_string()),
        });
        host.add_user(UserProfile {
            id: 8,
            display_name: "Brook".to_string(),
            avatar_url: None,
        });
        Fixture {
            host,
            store,
            renderer,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(Filters::new())
    }

    async fn seed_post(host: &MemoryHost, content_type: &str) -> DbId {
        host.insert_item(NewContentItem {
            content_type: content_type.to_string(),
            parent_id: 0,
            author_id: 7,
            status: "draft".to_string(),
            excerpt: String::new(),
            body: "article body".to_string(),
        })
        .await
        .unwrap()
        .id
    }

    fn comment_by(author_id: DbId, parent_id: DbId, body: &str) -> NewAnnotation {
        NewAnnotation {
            parent_id,
            author_id,
            subtype: Subtype::Comment,
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn empty_parent_renders_empty_state() {
        let f = fixture();
        let html = f.renderer.render_list(42, 7, RenderMode::Edit).await.unwrap();
        assert_eq!(html, "No comments yet.");
    }

    #[tokio::test]
    async fn own_comments_get_delete_control_foreign_do_not() {
        let f = fixture();
        let post = seed_post(&f.host, "post").await;
        let mine = f.store.create(comment_by(7, post, "mine")).await.unwrap();
        let theirs = f.store.create(comment_by(8, post, "theirs")).await.unwrap();

        let html = f
            .renderer
            .render_list(post, 7, RenderMode::Edit)
            .await
            .unwrap();
        assert!(html.contains(&format!("comment_id=\"{}\"", mine.id)));
        assert!(!html.contains(&format!("comment_id=\"{}\"", theirs.id)));
        assert!(html.contains("<strong class=\"aec-author_name\">Alex</strong>"));
        assert!(html.contains("<strong class=\"aec-author_name\">Brook</strong>"));
    }

    #[tokio::test]
    async fn unresolvable_author_renders_blank_name() {
        let f = fixture();
        let post = seed_post(&f.host, "post").await;
        f.store.create(comment_by(999, post, "ghost note")).await.unwrap();

        let html = f
            .renderer
            .render_list(post, 7, RenderMode::Edit)
            .await
            .unwrap();
        assert!(html.contains("<strong class=\"aec-author_name\"></strong>"));
        assert!(html.contains("ghost note"));
    }

    #[tokio::test]
    async fn column_mode_windows_to_page_size() {
        let mut filters = Filters::new();
        filters.column_page_size.push(|_| 2);
        let f = fixture_with(filters);
        let post = seed_post(&f.host, "post").await;
        for body in ["one", "two", "three"] {
            f.store.create(comment_by(7, post, body)).await.unwrap();
        }

        let html = f
            .renderer
            .render_list(post, 7, RenderMode::Column)
            .await
            .unwrap();
        assert!(!html.contains("one"));
        assert!(html.contains("two"));
        assert!(html.contains("three"));
        assert!(html.contains("data-posts-num=\"2\""));
        assert!(!html.contains("aec_delete"));
    }

    #[tokio::test]
    async fn cap_chain_flags_fragment() {
        let mut filters = Filters::new();
        filters.annotation_cap.push(|_| 2);
        let f = fixture_with(filters);
        let post = seed_post(&f.host, "post").await;
        for body in ["one", "two"] {
            f.store.create(comment_by(7, post, body)).await.unwrap();
        }

        let html = f
            .renderer
            .render_list(post, 7, RenderMode::Edit)
            .await
            .unwrap();
        assert!(html.contains("name=\"aec_limit\" value=\"exceeds\""));
    }

    #[tokio::test]
    async fn panel_toggle_follows_revision_support() {
        let f = fixture();
        let post = seed_post(&f.host, "post").await;
        let html = f.renderer.render_panel(post, 7).await.unwrap();
        assert!(html.contains("aec_checkbox_revision"));
        assert!(html.contains("aec_comment_wrap"));

        f.host.set_revision_support("post", false);
        let html = f.renderer.render_panel(post, 7).await.unwrap();
        assert!(!html.contains("aec_checkbox_revision"));
    }

    #[tokio::test]
    async fn panel_for_unknown_item_still_renders() {
        let f = fixture();
        let html = f.renderer.render_panel(9999, 7).await.unwrap();
        assert!(!html.contains("aec_checkbox_revision"));
        assert!(html.contains("No comments yet."));
    }

    #[tokio::test]
    async fn revision_link_base_is_configurable() {
        let f = fixture();
        let post = seed_post(&f.host, "post").await;
        f.store
            .create(NewAnnotation {
                parent_id: post,
                author_id: 7,
                subtype: Subtype::Revision,
                body: "311".to_string(),
            })
            .await
            .unwrap();

        let renderer = f
            .renderer
            .clone()
            .with_revision_link_base("/history?rev=");
        let html = renderer.render_list(post, 7, RenderMode::Edit).await.unwrap();
        assert!(html.contains("<a href=\"/history?rev=311\">Content has changed.</a>"));
    }

    #[tokio::test]
    async fn client_strings_carry_stock_wording() {
        let f = fixture();
        let strings = f.renderer.client_strings();
        assert_eq!(strings.delete_failed, "Delete failed.");
        assert_eq!(strings.update_failed, "Update failed.");
        assert_eq!(strings.comments_limit, "The number of comments exceeds the limit.");
        assert_eq!(strings.no_empty, "No empty.");
        assert_eq!(strings.column_heading, "Recent Edit Comments");
    }
}
