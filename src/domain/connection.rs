// Connection lifecycle domain model
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    Opened,
    Closed,
    Errored,
    Reconnect,
}

impl ConnectionState {
    /// Next state for `event`, or `None` if the transition is not allowed
    pub fn on(self, event: ConnectionEvent) -> Option<ConnectionState> {
        use ConnectionEvent as E;
        use ConnectionState as S;

        match (self, event) {
            (S::Connecting, E::Opened) => Some(S::Open),
            (S::Connecting | S::Open, E::Errored) => Some(S::Errored),
            (S::Open, E::Closed) => Some(S::Closed),
            (S::Closed | S::Errored, E::Reconnect) => Some(S::Connecting),
            _ => None,
        }
    }

    pub fn is_down(self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::Errored)
    }
}

/// Loading/error affordances implied by a connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectionView {
    pub state: ConnectionState,
    pub loading_visible: bool,
    pub error_visible: bool,
}

impl From<ConnectionState> for ConnectionView {
    fn from(state: ConnectionState) -> Self {
        Self {
            state,
            loading_visible: state == ConnectionState::Connecting,
            error_visible: state.is_down(),
        }
    }
}
