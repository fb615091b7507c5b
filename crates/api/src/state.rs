use std::sync::Arc;

use marginalia_core::filters::Filters;
use marginalia_core::labels::Catalog;
use marginalia_events::EventBus;
use marginalia_store::{AnnotationStore, ContentHost, Renderer};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// The content host annotations are stored in.
    pub host: Arc<dyn ContentHost>,
    /// Typed annotation store on top of the host.
    pub store: AnnotationStore,
    /// Fragment and panel renderer.
    pub renderer: Renderer,
    /// Deployment extension points.
    pub filters: Arc<Filters>,
    /// Localization catalog for response messages.
    pub catalog: Arc<Catalog>,
    /// Lifecycle event bus the host callbacks publish to.
    pub event_bus: Arc<EventBus>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
