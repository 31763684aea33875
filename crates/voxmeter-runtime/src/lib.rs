pub mod config;
pub mod error;
pub mod ingest;
pub mod streaming;

pub use config::{Config, ReportConfig, WatchConfig};
pub use error::{Error, Result};
pub use ingest::{IngestReport, read_events};
pub use streaming::{SessionWatcher, StreamEvent};
