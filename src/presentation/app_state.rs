// Application state for HTTP handlers
use crate::application::session::EventSink;
use crate::presentation::dashboard_view::DashboardView;
use crate::presentation::live_renderer::RenderEvent;
use tokio::sync::{broadcast, watch};

/// Holds a receiver rather than the sender so streams end once the session stops
pub struct AppState {
    pub session: EventSink,
    pub view: watch::Receiver<DashboardView>,
    pub events: broadcast::Receiver<RenderEvent>,
}
