// Live host-telemetry dashboard: ingests analytics socket snapshots into
// bounded rolling series and serves the resulting view over HTTP
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
