//! Lifecycle annotation recorder.
//!
//! [`LifecycleRecorder`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! broadcast channel and records an annotation for every qualifying
//! [`ContentEvent`]: revision saves become revision markers on the parent
//! item, status transitions become status markers. It runs as a long-lived
//! background task and shuts down gracefully when the bus sender is dropped.

use std::sync::Arc;

use tokio::sync::broadcast;

use marginalia_core::annotation::{
    Annotation, NewAnnotation, Subtype, REVISION_CONTENT_TYPE, STATUS_AUTO_DRAFT,
};
use marginalia_core::content::ContentItem;
use marginalia_core::{CoreError, DbId};
use marginalia_store::{AnnotationStore, ContentHost, Settings};

use crate::bus::ContentEvent;

/// Background service that turns lifecycle events into stored annotations.
pub struct LifecycleRecorder {
    store: AnnotationStore,
    settings: Settings,
    host: Arc<dyn ContentHost>,
}

impl LifecycleRecorder {
    pub fn new(store: AnnotationStore, settings: Settings, host: Arc<dyn ContentHost>) -> Self {
        Self {
            store,
            settings,
            host,
        }
    }

    /// Run the recording loop.
    ///
    /// Subscribes to the event bus via the provided `receiver` and handles
    /// every event it receives. The loop exits when the channel is closed
    /// (i.e. the [`EventBus`](crate::bus::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<ContentEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.handle(&event).await {
                        tracing::error!(
                            error = %e,
                            event = event.kind(),
                            item_id = event.item_id(),
                            "Failed to record lifecycle annotation"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Lifecycle recorder lagged, some events were not recorded"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, lifecycle recorder shutting down");
                    break;
                }
            }
        }
    }

    /// Record the annotation a single event calls for, if any.
    ///
    /// `Ok(None)` means the event did not qualify under the recording
    /// rules; for a busy host that is the common case.
    pub async fn handle(&self, event: &ContentEvent) -> Result<Option<Annotation>, CoreError> {
        match event {
            ContentEvent::ItemSaved { item, actor_id } => self.record_saved(item, *actor_id).await,
            ContentEvent::StatusChanged {
                item,
                old_status,
                new_status,
                actor_id,
            } => {
                self.record_status_change(item, old_status, new_status, *actor_id)
                    .await
            }
        }
    }

    /// A save qualifies when it wrote a revision snapshot of an item whose
    /// type is both annotation-enabled and revision-capable. The marker
    /// goes on the parent item and carries the snapshot id as its body.
    async fn record_saved(
        &self,
        item: &ContentItem,
        actor_id: DbId,
    ) -> Result<Option<Annotation>, CoreError> {
        if item.content_type != REVISION_CONTENT_TYPE || !item.has_parent() {
            return Ok(None);
        }
        let Some(parent) = self.host.find_item(item.parent_id).await? else {
            return Ok(None);
        };
        if !self.settings.is_active(&parent.content_type).await? {
            return Ok(None);
        }
        if !self
            .host
            .type_supports_revisions(&parent.content_type)
            .await?
        {
            return Ok(None);
        }

        let annotation = self
            .store
            .create(NewAnnotation {
                parent_id: parent.id,
                author_id: actor_id,
                subtype: Subtype::Revision,
                body: item.id.to_string(),
            })
            .await?;
        tracing::info!(
            annotation_id = annotation.id,
            parent_id = parent.id,
            revision_id = item.id,
            "Recorded revision annotation"
        );
        Ok(Some(annotation))
    }

    /// A transition qualifies when the status actually changed, neither
    /// side is the placeholder status new items pass through, and the
    /// item's type is annotation-enabled. The marker carries
    /// `"{old},{new}"` as its body.
    async fn record_status_change(
        &self,
        item: &ContentItem,
        old_status: &str,
        new_status: &str,
        actor_id: DbId,
    ) -> Result<Option<Annotation>, CoreError> {
        if new_status == old_status
            || new_status == STATUS_AUTO_DRAFT
            || old_status == STATUS_AUTO_DRAFT
        {
            return Ok(None);
        }
        if !self.settings.is_active(&item.content_type).await? {
            return Ok(None);
        }

        let annotation = self
            .store
            .create(NewAnnotation {
                parent_id: item.id,
                author_id: actor_id,
                subtype: Subtype::Status,
                body: format!("{old_status},{new_status}"),
            })
            .await?;
        tracing::info!(
            annotation_id = annotation.id,
            item_id = item.id,
            old_status,
            new_status,
            "Recorded status annotation"
        );
        Ok(Some(annotation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::EventBus;
    use marginalia_core::content::NewContentItem;
    use marginalia_core::filters::Filters;
    use marginalia_store::MemoryHost;

    struct Fixture {
        host: Arc<MemoryHost>,
        store: AnnotationStore,
        recorder: LifecycleRecorder,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_filters(Filters::new())
        }

        fn with_filters(filters: Filters) -> Self {
            let host = Arc::new(MemoryHost::new());
            let filters = Arc::new(filters);
            let store = AnnotationStore::new(host.clone(), filters.clone());
            let settings = Settings::new(host.clone(), filters);
            let recorder = LifecycleRecorder::new(store.clone(), settings, host.clone());
            Self {
                host,
                store,
                recorder,
            }
        }

        async fn seed_item(&self, content_type: &str, parent_id: DbId) -> ContentItem {
            self.host
                .insert_item(NewContentItem {
                    content_type: content_type.to_string(),
                    parent_id,
                    author_id: 2,
                    status: "draft".to_string(),
                    excerpt: String::new(),
                    body: "content".to_string(),
                })
                .await
                .unwrap()
        }
    }

    fn saved(item: ContentItem) -> ContentEvent {
        ContentEvent::ItemSaved { item, actor_id: 7 }
    }

    fn transitioned(item: ContentItem, old: &str, new: &str) -> ContentEvent {
        ContentEvent::StatusChanged {
            item,
            old_status: old.to_string(),
            new_status: new.to_string(),
            actor_id: 7,
        }
    }

    // -- revision saves ----------------------------------------------------

    #[tokio::test]
    async fn revision_save_records_marker_on_parent() {
        let f = Fixture::new();
        let parent = f.seed_item("post", 0).await;
        let revision = f.seed_item("revision", parent.id).await;

        let recorded = f.recorder.handle(&saved(revision.clone())).await.unwrap();

        let annotation = recorded.expect("revision save should record");
        assert_eq!(annotation.parent_id, parent.id);
        assert_eq!(annotation.author_id, 7);
        assert_eq!(annotation.subtype, Subtype::Revision);
        assert_eq!(annotation.body, revision.id.to_string());

        let listed = f.store.list(parent.id).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn ordinary_save_records_nothing() {
        let f = Fixture::new();
        let post = f.seed_item("post", 0).await;
        assert!(f.recorder.handle(&saved(post)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn parentless_revision_records_nothing() {
        let f = Fixture::new();
        let orphan = f.seed_item("revision", 0).await;
        assert!(f.recorder.handle(&saved(orphan)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn revision_of_missing_parent_records_nothing() {
        let f = Fixture::new();
        let revision = f.seed_item("revision", 999).await;
        assert!(f.recorder.handle(&saved(revision)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn revision_of_inactive_type_records_nothing() {
        let mut filters = Filters::new();
        filters.active_types.push(|_| vec!["page".to_string()]);
        let f = Fixture::with_filters(filters);

        let parent = f.seed_item("post", 0).await;
        let revision = f.seed_item("revision", parent.id).await;
        assert!(f.recorder.handle(&saved(revision)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn revision_of_revisionless_type_records_nothing() {
        let f = Fixture::new();
        f.host.set_revision_support("post", false);

        let parent = f.seed_item("post", 0).await;
        let revision = f.seed_item("revision", parent.id).await;
        assert!(f.recorder.handle(&saved(revision)).await.unwrap().is_none());
    }

    // -- status transitions ------------------------------------------------

    #[tokio::test]
    async fn status_transition_records_marker() {
        let f = Fixture::new();
        let post = f.seed_item("post", 0).await;

        let recorded = f
            .recorder
            .handle(&transitioned(post.clone(), "draft", "publish"))
            .await
            .unwrap();

        let annotation = recorded.expect("transition should record");
        assert_eq!(annotation.parent_id, post.id);
        assert_eq!(annotation.author_id, 7);
        assert_eq!(annotation.subtype, Subtype::Status);
        assert_eq!(annotation.body, "draft,publish");
    }

    #[tokio::test]
    async fn unchanged_status_records_nothing() {
        let f = Fixture::new();
        let post = f.seed_item("post", 0).await;
        assert!(f
            .recorder
            .handle(&transitioned(post, "draft", "draft"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn auto_draft_on_either_side_records_nothing() {
        let f = Fixture::new();
        let post = f.seed_item("post", 0).await;
        assert!(f
            .recorder
            .handle(&transitioned(post.clone(), "auto-draft", "draft"))
            .await
            .unwrap()
            .is_none());
        assert!(f
            .recorder
            .handle(&transitioned(post, "publish", "auto-draft"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn transition_of_inactive_type_records_nothing() {
        let f = Fixture::new();
        let product = f.seed_item("product", 0).await;
        assert!(f
            .recorder
            .handle(&transitioned(product, "draft", "publish"))
            .await
            .unwrap()
            .is_none());
    }

    // -- run loop ----------------------------------------------------------

    #[tokio::test]
    async fn run_records_published_events_and_stops_on_close() {
        let f = Fixture::new();
        let post = f.seed_item("post", 0).await;

        let bus = EventBus::default();
        let receiver = bus.subscribe();
        let handle = tokio::spawn(f.recorder.run(receiver));

        bus.publish(transitioned(post.clone(), "draft", "publish"));

        // The recorder runs on its own task; wait for the write to land.
        let mut listed = Vec::new();
        for _ in 0..100 {
            listed = f.store.list(post.id).await.unwrap();
            if !listed.is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].body, "draft,publish");

        drop(bus);
        handle.await.expect("recorder task should exit cleanly");
    }
}
