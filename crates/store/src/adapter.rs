//! Annotation store adapter.
//!
//! Sits between the typed annotation domain and the generic content-host
//! records: queries and inserts go out as content items, results come back
//! decoded as [`Annotation`]s. Every operation threads its inputs through
//! the deployment's filter chains first, so installed extensions see and
//! may rewrite exactly what will hit the host.

use std::sync::Arc;

use marginalia_core::annotation::{
    Annotation, NewAnnotation, Subtype, ANNOTATION_CONTENT_TYPE,
};
use marginalia_core::content::{ContentItem, ContentQuery, NewContentItem};
use marginalia_core::filters::Filters;
use marginalia_core::{CoreError, DbId};

use crate::host::ContentHost;

/// Stored status for annotation records.
const ANNOTATION_STATUS: &str = "publish";

/// Typed access to annotations stored in the content host.
#[derive(Clone)]
pub struct AnnotationStore {
    host: Arc<dyn ContentHost>,
    filters: Arc<Filters>,
}

impl AnnotationStore {
    pub fn new(host: Arc<dyn ContentHost>, filters: Arc<Filters>) -> Self {
        Self { host, filters }
    }

    /// Every annotation attached to `parent_id`, oldest first.
    pub async fn list(&self, parent_id: DbId) -> Result<Vec<Annotation>, CoreError> {
        self.list_page(parent_id, None).await
    }

    /// Like [`list`](Self::list), windowed to the `per_page` most recent
    /// annotations (still oldest first). The deployment's query chain may
    /// rewrite the outgoing query either way.
    pub async fn list_page(
        &self,
        parent_id: DbId,
        per_page: Option<usize>,
    ) -> Result<Vec<Annotation>, CoreError> {
        let mut query = ContentQuery::for_parent(ANNOTATION_CONTENT_TYPE, parent_id);
        query.per_page = per_page;
        let query = self.filters.query.apply(query);

        let items = self.host.query_items(&query).await?;
        Ok(items.into_iter().map(annotation_from_item).collect())
    }

    /// Store a new annotation and return it as the host recorded it.
    pub async fn create(&self, new: NewAnnotation) -> Result<Annotation, CoreError> {
        let chain = match new.subtype {
            Subtype::Comment => &self.filters.new_comment,
            Subtype::Revision => &self.filters.new_revision,
            Subtype::Status => &self.filters.new_status,
        };
        let item = chain.apply(NewContentItem {
            content_type: ANNOTATION_CONTENT_TYPE.to_string(),
            parent_id: new.parent_id,
            author_id: new.author_id,
            status: ANNOTATION_STATUS.to_string(),
            excerpt: new.subtype.as_str().to_string(),
            body: new.body,
        });

        let stored = self.host.insert_item(item).await?;
        Ok(annotation_from_item(stored))
    }

    /// Permanently delete an annotation. There is no trash step.
    pub async fn delete(&self, annotation_id: DbId) -> Result<(), CoreError> {
        if self.host.delete_item(annotation_id).await? {
            Ok(())
        } else {
            Err(CoreError::NotFound {
                entity: "annotation",
                id: annotation_id,
            })
        }
    }
}

/// Decode a host record into the typed annotation view.
///
/// The excerpt token picks the subtype; unknown tokens fall back to
/// plain comments so rows from older deployments keep rendering.
pub fn annotation_from_item(item: ContentItem) -> Annotation {
    Annotation {
        id: item.id,
        parent_id: item.parent_id,
        author_id: item.author_id,
        subtype: Subtype::from_token(&item.excerpt),
        body: item.body,
        created_at: item.created_at,
    }
}
