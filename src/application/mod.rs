// Application layer - ingestion, reconnect policy and the session loop
pub mod ingestor;
pub mod reconnect;
pub mod session;
