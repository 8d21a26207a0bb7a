// Wardlight web service
// Modality and department views plus the plain-text signal device endpoints

pub mod config;
pub mod database;
pub mod error_handling;
pub mod handlers;
pub mod routes;
pub mod validation;
pub mod views;

pub use config::WebConfig;
pub use database::Database;
pub use error_handling::{AppError, AppResult};

use axum::{middleware, Router};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};
use wardlight_core::{LivenessTracker, NotificationLedger};

use error_handling::{check_database_health, handle_404, trace_request, HealthStatus};

// Main application state
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<WebConfig>,
    pub ledger: NotificationLedger,
    pub tracker: LivenessTracker,
}

impl AppState {
    pub async fn new(config: WebConfig) -> anyhow::Result<Self> {
        tracing::info!("Initializing database with URL: {}", config.database_url);
        let db = Database::new(&config.database_path()).await?;
        db.migrate().await?;

        let ledger = NotificationLedger::new(db.pool().clone());
        let tracker = LivenessTracker::new(db.pool().clone());

        Ok(Self {
            db,
            config: Arc::new(config),
            ledger,
            tracker,
        })
    }

    /// Health check for the application state
    pub async fn health_check(&self) -> HealthStatus {
        let mut services = HashMap::new();
        services.insert(
            "database".to_string(),
            check_database_health(self.db.pool()).await,
        );

        let overall_status = if services.values().all(|s| s.status == "healthy") {
            "healthy"
        } else {
            "degraded"
        };

        HealthStatus {
            status: overall_status.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: VERSION.to_string(),
            services,
        }
    }
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the router; used by `serve` and by the integration tests
pub fn create_app(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.config.static_dir);

    Router::new()
        .merge(routes::app_routes())
        .nest_service("/static", static_dir)
        .fallback(handle_404)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(trace_request)),
        )
        .with_state(state)
}

/// Run the web server until Ctrl-C
pub async fn serve(config: WebConfig) -> anyhow::Result<()> {
    let port = config.port;
    tracing::info!(
        "Starting Wardlight web server on port {} serving {} departments",
        port,
        config.departments.len()
    );

    let state = AppState::new(config).await?;
    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
