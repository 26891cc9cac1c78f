// Analytics socket URL construction
use crate::infrastructure::config::ServerSettings;

/// `{ws|wss}://{host}:{port}/analytics_ws/{client_id}`, secure server => `wss`
pub fn analytics_endpoint(server: &ServerSettings) -> String {
    let scheme = if server.secure { "wss" } else { "ws" };
    format!(
        "{}://{}:{}/analytics_ws/{}",
        scheme,
        server.host,
        server.port,
        urlencoding::encode(&server.client_id)
    )
}
