// file: src/pipeline/mod.rs
// description: ingestion pipeline module exports and public api
// reference: pipeline orchestration

pub mod ingest;
pub mod progress;
pub mod scanner;

pub use ingest::{IngestOutcome, IngestPipeline};
pub use progress::{IngestStats, ProgressTracker};
pub use scanner::{FileScanner, ScannedFile};
