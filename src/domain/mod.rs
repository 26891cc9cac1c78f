// Domain layer - telemetry values, rolling windows and the view model
pub mod chart;
pub mod connection;
pub mod metric;
pub mod series;
pub mod view_model;
