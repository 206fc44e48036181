//! Orchestrator-facing task boundary. Each task reads its input from a JSON
//! handoff artifact written by the previous stage and removes that artifact
//! on every exit path; task-level retries and timeouts live in the external
//! scheduler, not here.

use crate::error::{IngestError, Result};
use crate::fetch::{fetch_all, FeedClient, FetchOptions};
use crate::load::{load, LoadSummary};
use crate::storage::VulnerabilityStore;
use crate::transform::transform;
use crate::types::{FlatRow, Vulnerability};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

fn write_artifact<T: Serialize>(dir: &Path, stem: &str, value: &T) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let ts = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("{}_{}.json", ts, stem));
    fs::write(&path, serde_json::to_string(value)?)?;
    Ok(path)
}

/// Scoped handle to a handoff artifact. The file is removed when the guard
/// drops, so cleanup happens on success and failure alike.
struct ArtifactGuard {
    path: PathBuf,
}

impl ArtifactGuard {
    fn read<T: DeserializeOwned>(&self) -> Result<T> {
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(
                "Failed to remove handoff artifact {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

/// Fetches the feed and writes the raw-record artifact for the next stage.
pub async fn fetch_data_task(
    client: &dyn FeedClient,
    opts: &FetchOptions,
    out_dir: &Path,
) -> Result<PathBuf> {
    let records = fetch_all(client, opts).await;
    if records.is_empty() {
        error!("Error in fetch_data task: no records fetched from the feed");
        return Err(IngestError::EmptyFetch);
    }

    let path = write_artifact(out_dir, "raw", &records)?;
    info!("Wrote {} raw records to {}", records.len(), path.display());
    Ok(path)
}

/// Flattens a raw-record artifact into a flat-row artifact. The input
/// artifact is removed on exit whether or not the stage succeeds.
pub fn transform_data_task(input: &Path, out_dir: &Path) -> Result<PathBuf> {
    let guard = ArtifactGuard {
        path: input.to_path_buf(),
    };

    let records: Vec<Vulnerability> = match guard.read() {
        Ok(records) => records,
        Err(e) => {
            error!("Error in transform_data task: {}", e);
            return Err(e);
        }
    };
    info!("Raw data size: {} records", records.len());

    let rows = match transform(&records) {
        Ok(rows) => rows,
        Err(e) => {
            error!("Error in transform_data task: {}", e);
            return Err(e);
        }
    };

    let path = write_artifact(out_dir, "flat", &rows)?;
    info!("Wrote {} flat rows to {}", rows.len(), path.display());
    Ok(path)
}

/// Loads a flat-row artifact into the destination store. The input artifact
/// is removed on exit whether or not the stage succeeds.
pub async fn save_data_task(
    input: &Path,
    store: &dyn VulnerabilityStore,
) -> Result<LoadSummary> {
    let guard = ArtifactGuard {
        path: input.to_path_buf(),
    };

    let rows: Vec<FlatRow> = match guard.read() {
        Ok(rows) => rows,
        Err(e) => {
            error!("Error in save_data task: {}", e);
            return Err(e);
        }
    };

    match load(&rows, store).await {
        Ok(summary) => Ok(summary),
        Err(e) => {
            error!("Error in save_data task: {}", e);
            Err(e)
        }
    }
}
