//! Object storage setup

use anyhow::{Context, Result};
use reelstash_core::Config;
use reelstash_storage::{create_storage, Storage};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    let storage = create_storage(config)
        .await
        .context("Failed to initialize object storage")?;

    tracing::info!(
        backend = %storage.backend_type(),
        bucket = %storage.default_bucket(),
        region = %storage.region(),
        "Object storage initialized"
    );

    Ok(storage)
}
