pub mod ingest;

pub use ingest::{IngestOutcome, VideoIngestConfig, VideoIngestService};
