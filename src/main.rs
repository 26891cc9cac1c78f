// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    routing::{get, post, put},
};
use tokio::sync::{broadcast, mpsc};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use chronicle_dashboard::application::ingestor::TelemetryIngestor;
use chronicle_dashboard::application::session::{DashboardSession, SessionEvent};
use chronicle_dashboard::infrastructure::config::load_dashboard_config;
use chronicle_dashboard::infrastructure::endpoint::analytics_endpoint;
use chronicle_dashboard::infrastructure::ws_connector::WebSocketConnector;
use chronicle_dashboard::presentation::app_state::AppState;
use chronicle_dashboard::presentation::handlers::{
    dashboard, health_check, resize, retry, set_legend, stream_dashboard,
};
use chronicle_dashboard::presentation::live_renderer::LiveRenderer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config()?;
    let endpoint = analytics_endpoint(&config.server);

    // Create the rendering side (presentation layer)
    let (render_events, render_rx) = broadcast::channel(256);
    let (renderer, view) = LiveRenderer::new(config.ingest.window, render_events);

    // Create the session (application layer)
    let (sink, events) = mpsc::unbounded_channel();
    let session = DashboardSession::new(
        endpoint,
        WebSocketConnector,
        renderer,
        TelemetryIngestor::new(config.ingest.window),
        config.reconnect.policy(),
        sink.clone(),
    );
    let session_task = tokio::spawn(session.run(events));

    let state = Arc::new(AppState {
        session: sink.clone(),
        view,
        events: render_rx,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(dashboard))
        .route("/dashboard/stream", get(stream_dashboard))
        .route("/retry", post(retry))
        .route("/resize", post(resize))
        .route("/legend", put(set_legend))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.http.bind.parse()?;
    tracing::info!("Starting chronicle-dashboard on {}", addr);

    let shutdown_sink = sink;
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            let _ = shutdown_sink.send(SessionEvent::Shutdown);
        })
        .await?;

    session_task.await?;
    Ok(())
}
