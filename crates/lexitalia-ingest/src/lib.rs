//! Ingestion pipeline: census → crawl → parse → seed.

mod config;
mod error;
mod orchestrator;

pub use config::IngestConfig;
pub use error::IngestError;
pub use orchestrator::{ActReport, Orchestrator, RunOptions, RunReport, classify_outcome};
