// Dashboard session - connection lifecycle and the event loop feeding the ingestor
use crate::application::ingestor::TelemetryIngestor;
use crate::application::reconnect::ReconnectPolicy;
use crate::domain::chart::LegendSelection;
use crate::domain::connection::{ConnectionEvent, ConnectionState, ConnectionView};
use crate::domain::view_model::ViewModelUpdate;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

/// Everything the session reacts to, delivered one at a time.
///
/// Transport events carry the epoch of the connection that produced them.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Opened { epoch: u64 },
    Message { epoch: u64, payload: String },
    Closed { epoch: u64 },
    Errored { epoch: u64, reason: String },
    ReconnectDue { epoch: u64 },
    RetryRequested,
    Resize,
    LegendChanged(LegendSelection),
    Shutdown,
}

pub type EventSink = mpsc::UnboundedSender<SessionEvent>;

/// Opens the transport for one epoch and reports back through `sink`
pub trait Connector: Send {
    fn connect(&self, epoch: u64, endpoint: &str, sink: EventSink);
}

/// The rendering side of the dashboard
pub trait DashboardRenderer: Send {
    fn apply_update(&mut self, update: &ViewModelUpdate);
    fn connection_changed(&mut self, view: ConnectionView);
    fn resize(&mut self);
}

pub struct DashboardSession<C, R> {
    endpoint: String,
    connector: C,
    renderer: R,
    ingestor: TelemetryIngestor,
    policy: ReconnectPolicy,
    state: ConnectionState,
    epoch: u64,
    failures: u32,
    sink: EventSink,
}

impl<C: Connector, R: DashboardRenderer> DashboardSession<C, R> {
    pub fn new(
        endpoint: String,
        connector: C,
        renderer: R,
        ingestor: TelemetryIngestor,
        policy: ReconnectPolicy,
        sink: EventSink,
    ) -> Self {
        Self {
            endpoint,
            connector,
            renderer,
            ingestor,
            policy,
            state: ConnectionState::Connecting,
            epoch: 0,
            failures: 0,
            sink,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn ingestor(&self) -> &TelemetryIngestor {
        &self.ingestor
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Connect, then process events until `Shutdown`
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<SessionEvent>) {
        self.connect();
        while let Some(event) = events.recv().await {
            if !self.handle(event) {
                break;
            }
        }
        tracing::info!("Dashboard session stopped after {} connection attempts", self.epoch);
    }

    /// Open a fresh connection. Events from earlier epochs are ignored from here on.
    pub fn connect(&mut self) {
        self.epoch += 1;
        self.set_state(ConnectionState::Connecting);
        tracing::info!("Connecting to {} (attempt {})", self.endpoint, self.epoch);
        self.connector
            .connect(self.epoch, &self.endpoint, self.sink.clone());
    }

    /// Handle one event. Returns false when the session should stop.
    pub fn handle(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Opened { epoch } if self.is_current(epoch) => {
                if self.transition(ConnectionEvent::Opened) {
                    self.failures = 0;
                    tracing::info!("Connected to {}", self.endpoint);
                }
            }
            SessionEvent::Message { epoch, payload } if self.is_current(epoch) => {
                if self.state == ConnectionState::Open {
                    let time_label = display_time();
                    if let Some(update) = self.ingestor.on_message(&payload, &time_label) {
                        self.renderer.apply_update(&update);
                    }
                }
            }
            SessionEvent::Closed { epoch } if self.is_current(epoch) => {
                if self.transition(ConnectionEvent::Closed) {
                    tracing::warn!("Connection lost, retrying...");
                    self.schedule_reconnect();
                }
            }
            SessionEvent::Errored { epoch, reason } if self.is_current(epoch) => {
                if self.transition(ConnectionEvent::Errored) {
                    tracing::warn!("WebSocket error: {}", reason);
                    self.schedule_reconnect();
                }
            }
            SessionEvent::ReconnectDue { epoch } => {
                // a manual retry may already have replaced the connection this timer was for
                if self.is_current(epoch) && self.state.is_down() {
                    self.connect();
                }
            }
            SessionEvent::RetryRequested => {
                if self.state.is_down() {
                    tracing::info!("Manual retry requested");
                    self.connect();
                } else {
                    tracing::debug!("Ignoring retry while {:?}", self.state);
                }
            }
            SessionEvent::Resize => self.renderer.resize(),
            SessionEvent::LegendChanged(legend) => self.ingestor.set_legend(legend),
            SessionEvent::Shutdown => return false,
            stale => tracing::debug!("Ignoring event from a stale connection: {:?}", stale),
        }
        true
    }

    fn is_current(&self, epoch: u64) -> bool {
        epoch == self.epoch
    }

    fn transition(&mut self, event: ConnectionEvent) -> bool {
        match self.state.on(event) {
            Some(next) => {
                self.set_state(next);
                true
            }
            None => {
                tracing::debug!("Ignoring {:?} while {:?}", event, self.state);
                false
            }
        }
    }

    fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
        self.renderer.connection_changed(ConnectionView::from(state));
    }

    fn schedule_reconnect(&mut self) {
        self.failures = self.failures.saturating_add(1);
        let Some(delay) = self.policy.delay_for(self.failures) else {
            tracing::warn!(
                "Giving up on {} after {} failed attempts; waiting for a manual retry",
                self.endpoint,
                self.failures - 1
            );
            return;
        };

        let deadline = Instant::now() + delay;
        let sink = self.sink.clone();
        let epoch = self.epoch;
        tracing::debug!("Reconnecting in {:?}", delay);
        tokio::spawn(async move {
            sleep_until(deadline).await;
            let _ = sink.send(SessionEvent::ReconnectDue { epoch });
        });
    }
}

fn display_time() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
