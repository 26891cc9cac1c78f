// Presentation layer - renderer state and the HTTP surface
pub mod app_state;
pub mod dashboard_view;
pub mod handlers;
pub mod live_renderer;
