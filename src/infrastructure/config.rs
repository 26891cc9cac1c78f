use crate::application::reconnect::ReconnectPolicy;
use crate::domain::series::DEFAULT_WINDOW;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub server: ServerSettings,
    pub reconnect: ReconnectSettings,
    pub ingest: IngestSettings,
    pub http: HttpSettings,
}

/// Where the telemetry server's analytics socket lives
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub secure: bool,
    pub client_id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReconnectSettings {
    pub delay_ms: u64,
    pub multiplier: f64,
    pub max_delay_ms: u64,
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl ReconnectSettings {
    pub fn policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::exponential(
            Duration::from_millis(self.delay_ms),
            self.multiplier,
            Duration::from_millis(self.max_delay_ms),
        )
        .with_max_attempts(self.max_attempts)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestSettings {
    pub window: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpSettings {
    pub bind: String,
}

fn with_defaults(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(builder
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8000)?
        .set_default("server.secure", false)?
        .set_default("server.client_id", "local")?
        .set_default("reconnect.delay_ms", 3000)?
        .set_default("reconnect.multiplier", 1.0)?
        .set_default("reconnect.max_delay_ms", 3000)?
        .set_default("ingest.window", DEFAULT_WINDOW as u64)?
        .set_default("http.bind", "127.0.0.1:8090")?)
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("CHRONICLE")
        .prefix_separator("__")
        .separator("__")
}

/// Defaults, then `config/dashboard.*` if present, then `CHRONICLE__*` env vars
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    load_with_environment(environment())
}

fn load_with_environment(env: config::Environment) -> anyhow::Result<DashboardConfig> {
    let settings = with_defaults(config::Config::builder())?
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(env)
        .build()?;

    Ok(settings.try_deserialize()?)
}
