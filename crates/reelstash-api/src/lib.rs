//! Reelstash API Library
//!
//! HTTP handlers, authentication, the video ingestion pipeline and
//! application setup.

mod api_doc;
mod handlers;
pub mod services;
pub mod setup;
mod telemetry;

pub mod auth;
pub mod error;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use services::{IngestOutcome, VideoIngestConfig, VideoIngestService};
