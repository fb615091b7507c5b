use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use marginalia_api::config::ServerConfig;
use marginalia_api::extract::ACTING_USER_HEADER;
use marginalia_api::router::build_app_router;
use marginalia_api::state::AppState;
use marginalia_core::annotation::{Annotation, DEFAULT_REVISION_LINK_BASE};
use marginalia_core::content::{NewContentItem, UserProfile};
use marginalia_core::filters::Filters;
use marginalia_core::labels::Catalog;
use marginalia_core::DbId;
use marginalia_events::{EventBus, LifecycleRecorder};
use marginalia_store::{AnnotationStore, ContentHost, MemoryHost, Renderer, Settings};

/// Everything a test needs to drive the service end to end.
///
/// `app` is the full router with the production middleware stack; `host`
/// and `store` give tests direct access to the in-memory backing state.
pub struct TestApp {
    pub app: Router,
    pub host: Arc<MemoryHost>,
    pub store: AnnotationStore,
}

impl TestApp {
    /// Register a user account on the in-memory host.
    pub fn seed_user(&self, id: DbId, name: &str) {
        self.host.add_user(UserProfile {
            id,
            display_name: name.to_string(),
            avatar_url: Some(format!("https://avatars.example/{id}.png")),
        });
    }

    /// Store a content item and return its id.
    pub async fn seed_item(&self, content_type: &str, parent_id: DbId) -> DbId {
        self.host
            .insert_item(NewContentItem {
                content_type: content_type.to_string(),
                parent_id,
                author_id: 2,
                status: "draft".to_string(),
                excerpt: String::new(),
                body: "article body".to_string(),
            })
            .await
            .expect("seeding item should succeed")
            .id
    }
}

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
        revision_link_base: DEFAULT_REVISION_LINK_BASE.to_string(),
    }
}

/// Build the full application on an in-memory host.
///
/// This mirrors the wiring in `main.rs` -- same router, same middleware
/// stack, lifecycle recorder spawned on the event bus -- so integration
/// tests exercise exactly what production runs.
pub fn build_test_app() -> TestApp {
    build_test_app_with(Filters::new())
}

/// Like [`build_test_app`], with caller-supplied extension points.
pub fn build_test_app_with(filters: Filters) -> TestApp {
    let config = test_config();
    let host = Arc::new(MemoryHost::new());
    let filters = Arc::new(filters);
    let catalog = Arc::new(Catalog::new());

    let store = AnnotationStore::new(host.clone(), filters.clone());
    let settings = Settings::new(host.clone(), filters.clone());
    let renderer = Renderer::new(store.clone(), host.clone(), filters.clone(), catalog.clone())
        .with_revision_link_base(config.revision_link_base.clone());

    let event_bus = Arc::new(EventBus::default());
    let recorder = LifecycleRecorder::new(store.clone(), settings, host.clone());
    tokio::spawn(recorder.run(event_bus.subscribe()));

    let state = AppState {
        host: host.clone(),
        store: store.clone(),
        renderer,
        filters,
        catalog,
        event_bus,
        config: Arc::new(config.clone()),
    };

    TestApp {
        app: build_app_router(state, &config),
        host,
        store,
    }
}

/// GET `uri` with no acting user.
pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// GET `uri` as the given acting user.
pub async fn get_as(app: Router, uri: &str, user_id: DbId) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(ACTING_USER_HEADER, user_id.to_string())
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a JSON body to `uri` as the given acting user.
pub async fn post_json_as(
    app: Router,
    uri: &str,
    user_id: DbId,
    body: serde_json::Value,
) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(ACTING_USER_HEADER, user_id.to_string())
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a JSON body to `uri` with no acting user.
pub async fn post_json_anon(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body as parsed JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as a UTF-8 string.
pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Wait until `parent_id` has at least `count` annotations and return the
/// list. The lifecycle recorder runs on its own task, so stored markers
/// land shortly after the event endpoint responds.
pub async fn wait_for_annotations(
    store: &AnnotationStore,
    parent_id: DbId,
    count: usize,
) -> Vec<Annotation> {
    for _ in 0..200 {
        let listed = store
            .list(parent_id)
            .await
            .expect("listing annotations should succeed");
        if listed.len() >= count {
            return listed;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("parent {parent_id} never reached {count} annotations");
}
