// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::application::dashboard_service::DashboardService;
use crate::application::live_feed::LiveFeed;
use crate::application::session::SessionProvider;
use crate::infrastructure::config::{load_dashboard_config, load_source_config};
use crate::infrastructure::memory_session::MemorySessionStore;
use crate::infrastructure::realtime_source::RealtimeStoreClient;
use crate::infrastructure::translations::StaticTranslations;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    current_user, export_csv, get_dashboard, health_check, login, logout, refresh_dashboard,
    set_auto_refresh, set_range, signup, stream_dashboard,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let source_config = load_source_config()?;
    let dashboard_config = load_dashboard_config()?;

    // Create the realtime store client (infrastructure layer)
    let source = Arc::new(RealtimeStoreClient::new(
        source_config.source.base_url,
        source_config.source.path,
        source_config.source.auth_token,
    ));

    // Create services (application layer)
    let feed = Arc::new(LiveFeed::spawn(source));
    let sessions: Arc<dyn SessionProvider> = Arc::new(MemorySessionStore::new());
    let dashboard = DashboardService::new(
        feed,
        Arc::new(StaticTranslations),
        sessions.clone(),
        Duration::from_secs(dashboard_config.dashboard.auto_refresh_secs),
    );

    // Create application state
    let state = Arc::new(AppState {
        dashboard,
        sessions,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/stream", get(stream_dashboard))
        .route("/dashboard/refresh", post(refresh_dashboard))
        .route("/dashboard/auto-refresh", put(set_auto_refresh))
        .route("/dashboard/range", put(set_range))
        .route("/export", get(export_csv))
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(current_user))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = dashboard_config.dashboard.listen_addr.parse()?;
    tracing::info!("starting clearwater-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
