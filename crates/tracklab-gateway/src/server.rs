//! HTTP server implementation using Axum.

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tracklab_analysis::OllamaClient;
use tracklab_core::TrackLabConfig;
use tracklab_core::error::Result;
use tracklab_db::Database;
use tracklab_scheduler::SchedulerClient;

use super::hub::NotificationHub;

/// Shared state for the gateway server.
pub struct AppState {
    pub config: TrackLabConfig,
    pub db: Arc<Database>,
    pub hub: Arc<NotificationHub>,
    pub ollama: Arc<OllamaClient>,
    /// Command handle into the scheduler thread (one-shot popups).
    pub scheduler: SchedulerClient,
    pub start_time: std::time::Instant,
}

/// Build the Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = match state.config.gateway.frontend_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            tracing::warn!(
                "invalid frontend_origin {:?} — CORS open to any origin",
                state.config.gateway.frontend_origin
            );
            CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
        }
    };

    Router::new()
        .route("/health", get(super::routes::health_check))
        .route("/ws/notifications", get(super::ws::ws_handler))
        .route(
            "/api/v1/logs",
            post(super::routes::create_work_log).get(super::routes::list_work_logs),
        )
        .route("/api/v1/plans/{id}/status", put(super::routes::set_plan_status))
        .route("/api/v1/analysis/run", post(super::routes::run_analysis))
        .route("/api/v1/analysis/daily-summary", get(super::routes::daily_summary))
        .route("/api/v1/analysis/status", get(super::routes::ollama_status))
        .route("/api/v1/popup/now", post(super::routes::popup_now))
        .route("/api/v1/popup/schedule", post(super::routes::schedule_popup))
        .route("/api/v1/dashboard", get(super::routes::dashboard))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(state: Arc<AppState>) -> Result<()> {
    let addr = format!(
        "{}:{}",
        state.config.gateway.host, state.config.gateway.port
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Gateway listening on http://{addr}");

    let router = build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received.");
}
