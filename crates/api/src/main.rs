use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marginalia_api::config::ServerConfig;
use marginalia_api::router::build_app_router;
use marginalia_api::state::AppState;
use marginalia_core::filters::Filters;
use marginalia_core::labels::Catalog;
use marginalia_events::{EventBus, LifecycleRecorder};
use marginalia_store::{AnnotationStore, ContentHost, Renderer, Settings, SqliteHost};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marginalia_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Content host ---
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    let sqlite_host = SqliteHost::new(pool);
    sqlite_host
        .init()
        .await
        .expect("Failed to apply database schema");
    tracing::info!("Database schema applied");

    let host: Arc<dyn ContentHost> = Arc::new(sqlite_host);

    // --- Services ---
    let filters = Arc::new(Filters::new());
    let catalog = Arc::new(Catalog::new());
    let store = AnnotationStore::new(Arc::clone(&host), Arc::clone(&filters));
    let settings = Settings::new(Arc::clone(&host), Arc::clone(&filters));
    let renderer = Renderer::new(
        store.clone(),
        Arc::clone(&host),
        Arc::clone(&filters),
        Arc::clone(&catalog),
    )
    .with_revision_link_base(config.revision_link_base.clone());

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    tracing::info!("Event bus created");

    // Spawn the lifecycle recorder (turns qualifying events into annotations).
    let recorder = LifecycleRecorder::new(store.clone(), settings, Arc::clone(&host));
    let recorder_handle = tokio::spawn(recorder.run(event_bus.subscribe()));
    tracing::info!("Lifecycle recorder started");

    // --- App state ---
    let state = AppState {
        host,
        store,
        renderer,
        filters,
        catalog,
        event_bus: Arc::clone(&event_bus),
        config: Arc::new(config.clone()),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Drop the event bus sender to close the broadcast channel.
    // This signals the lifecycle recorder to shut down.
    drop(event_bus);
    let _ = tokio::time::timeout(
        Duration::from_secs(config.shutdown_timeout_secs),
        recorder_handle,
    )
    .await;
    tracing::info!("Lifecycle recorder shut down");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
