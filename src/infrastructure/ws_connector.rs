// WebSocket transport - feeds analytics socket frames into the session
use crate::application::session::{Connector, EventSink, SessionEvent};
use futures::StreamExt;
use thiserror::Error;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to open {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: tungstenite::Error,
    },
    #[error("read failed: {0}")]
    Read(#[source] tungstenite::Error),
}

#[derive(Debug, Clone, Default)]
pub struct WebSocketConnector;

impl Connector for WebSocketConnector {
    fn connect(&self, epoch: u64, endpoint: &str, sink: EventSink) {
        let endpoint = endpoint.to_string();
        tokio::spawn(async move {
            let last = match pump(epoch, &endpoint, &sink).await {
                Ok(()) => SessionEvent::Closed { epoch },
                Err(err) => SessionEvent::Errored {
                    epoch,
                    reason: err.to_string(),
                },
            };
            let _ = sink.send(last);
        });
    }
}

/// Forward text frames until the socket closes or the session goes away
async fn pump(epoch: u64, endpoint: &str, sink: &EventSink) -> Result<(), TransportError> {
    let (mut stream, _response) =
        connect_async(endpoint)
            .await
            .map_err(|source| TransportError::Connect {
                endpoint: endpoint.to_string(),
                source,
            })?;

    if sink.send(SessionEvent::Opened { epoch }).is_err() {
        return Ok(());
    }

    while let Some(frame) = stream.next().await {
        match frame.map_err(TransportError::Read)? {
            Message::Text(payload) => {
                if sink.send(SessionEvent::Message { epoch, payload }).is_err() {
                    break;
                }
            }
            Message::Close(frame) => {
                tracing::debug!("Server closed analytics socket: {:?}", frame);
                break;
            }
            Message::Binary(bytes) => {
                tracing::debug!("Ignoring {} byte binary frame", bytes.len());
            }
            _ => {}
        }
    }

    Ok(())
}
