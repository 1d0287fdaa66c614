mod models;
mod handlers;
mod routes;
mod docs;
mod config;
mod db;
mod session;
mod websocket;
#[cfg(test)]
mod test_helpers;

use std::panic;
use std::sync::Arc;
use config::Config;
use db::{MemorySnapshotStore, PgSnapshotStore, SnapshotStore};
use routes::create_app_routes;
use session::{Outbox, SessionRegistry, SnapshotLifecycle};
use tracing::{info, error, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// State shared by every connection and HTTP handler. Starts empty on each boot.
pub struct AppState {
    pub registry: SessionRegistry,
    pub outbox: Outbox,
    pub lifecycle: SnapshotLifecycle,
}

impl AppState {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            registry: SessionRegistry::new(),
            outbox: Outbox::new(),
            lifecycle: SnapshotLifecycle::new(store),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {

    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "docsync_relay=debug,tower_http=debug,axum::rejection=trace,info".into()
        }))
        .init();

    info!("Starting server...");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
        Config::default()
    });

    // Pick the snapshot store
    let store: Arc<dyn SnapshotStore> = match &config.db_url {
        Some(db_url) => match PgSnapshotStore::connect(db_url).await {
            Ok(store) => {
                info!("Database initialized successfully");
                Arc::new(store)
            }
            Err(e) => {
                error!("Failed to initialize database: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            warn!("No database URL configured - documents are kept in memory only");
            Arc::new(MemorySnapshotStore::new())
        }
    };

    let app_state = Arc::new(AppState::new(store));
    let app_routes = create_app_routes(app_state, &config);

    let listener = match tokio::net::TcpListener::bind(config.server_address()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", config.server_address(), e);
            std::process::exit(1);
        }
    };

    info!("🚀 {} running on http://{}", config.service_name, config.server_address());
    info!("📡 WebSocket available at ws://{}/ws", config.server_address());
    if config.is_development() {
        info!("📚 Swagger UI available at http://{}/swagger", config.server_address());
    }

    if let Err(e) = axum::serve(listener, app_routes).await {
        error!("Server error: {}", e);
    }
}
