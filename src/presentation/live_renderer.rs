// Live renderer - keeps the dashboard view and publishes it to HTTP viewers
use crate::application::session::DashboardRenderer;
use crate::domain::connection::ConnectionView;
use crate::domain::view_model::ViewModelUpdate;
use crate::presentation::dashboard_view::DashboardView;
use serde::Serialize;
use tokio::sync::{broadcast, watch};

/// What stream subscribers receive
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RenderEvent {
    Update(ViewModelUpdate),
    Connection(ConnectionView),
    Resize,
}

pub struct LiveRenderer {
    view: DashboardView,
    latest: watch::Sender<DashboardView>,
    events: broadcast::Sender<RenderEvent>,
}

impl LiveRenderer {
    pub fn new(
        window: usize,
        events: broadcast::Sender<RenderEvent>,
    ) -> (Self, watch::Receiver<DashboardView>) {
        let view = DashboardView::new(window);
        let (latest, rx) = watch::channel(view.clone());
        (
            Self {
                view,
                latest,
                events,
            },
            rx,
        )
    }

    fn publish(&mut self, event: RenderEvent) {
        self.latest.send_replace(self.view.clone());
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}

impl DashboardRenderer for LiveRenderer {
    fn apply_update(&mut self, update: &ViewModelUpdate) {
        self.view.apply(update);
        for card in &update.stat_cards {
            tracing::debug!("{:?} = {}", card.card, card.display);
        }
        self.publish(RenderEvent::Update(update.clone()));
    }

    fn connection_changed(&mut self, view: ConnectionView) {
        self.view.connection = view;
        self.publish(RenderEvent::Connection(view));
    }

    fn resize(&mut self) {
        self.publish(RenderEvent::Resize);
    }
}
