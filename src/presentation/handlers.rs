// HTTP request handlers
use crate::application::session::SessionEvent;
use crate::domain::chart::LegendSelection;
use crate::infrastructure::chunked_json::stream_from_broadcast;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current dashboard view
pub async fn dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let view = state.view.borrow().clone();
    match json_response(&view, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Live render events (updates, connection changes, resize notices)
pub async fn stream_dashboard(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    stream_from_broadcast(state.events.resubscribe(), accepts_brotli(&headers)).await
}

/// Manual reconnect trigger
pub async fn retry(State(state): State<Arc<AppState>>) -> StatusCode {
    forward(&state, SessionEvent::RetryRequested)
}

/// Ask renderers to recompute their layout
pub async fn resize(State(state): State<Arc<AppState>>) -> StatusCode {
    forward(&state, SessionEvent::Resize)
}

/// Replace the series visibility selection
pub async fn set_legend(
    State(state): State<Arc<AppState>>,
    Json(legend): Json<LegendSelection>,
) -> StatusCode {
    forward(&state, SessionEvent::LegendChanged(legend))
}

fn forward(state: &AppState, event: SessionEvent) -> StatusCode {
    match state.session.send(event) {
        Ok(()) => StatusCode::ACCEPTED,
        Err(_) => {
            tracing::error!("Dashboard session is no longer running");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
