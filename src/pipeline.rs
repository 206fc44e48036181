use crate::error::{IngestError, Result};
use crate::fetch::{fetch_all, FeedClient, FetchOptions};
use crate::load::load;
use crate::metrics;
use crate::storage::VulnerabilityStore;
use crate::transform::transform;
use serde::Serialize;
use tracing::{error, info, instrument};
use uuid::Uuid;

/// Result of a complete pipeline run
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    pub run_id: Uuid,
    pub records_fetched: usize,
    pub rows_flattened: usize,
    pub rows_loaded: usize,
}

pub struct Pipeline;

impl Pipeline {
    async fn push_pushgateway_metrics(fetched: usize, loaded: usize, duration_secs: f64) {
        let base = match std::env::var("NVD_PUSHGATEWAY_URL") {
            Ok(v) if !v.trim().is_empty() => v,
            _ => return,
        };
        let push_url = format!(
            "{}/metrics/job/{}",
            base.trim_end_matches('/'),
            "nvd_ingest"
        );

        // Current timestamp for freshness tracking
        let timestamp_secs = chrono::Utc::now().timestamp() as f64;

        let body = format!(
            "# TYPE nvd_ingest_runs_total counter\n\
             nvd_ingest_runs_total 1\n\
             # TYPE nvd_records_fetched_total counter\n\
             nvd_records_fetched_total {}\n\
             # TYPE nvd_rows_loaded_total counter\n\
             nvd_rows_loaded_total {}\n\
             # TYPE nvd_pipeline_duration_seconds gauge\n\
             nvd_pipeline_duration_seconds {}\n\
             # TYPE nvd_pipeline_last_run_timestamp_seconds gauge\n\
             nvd_pipeline_last_run_timestamp_seconds {}\n",
            fetched, loaded, duration_secs, timestamp_secs
        );

        let client = reqwest::Client::new();
        let push_res = client
            .post(&push_url)
            .header("Content-Type", "text/plain; version=0.0.4")
            .body(body)
            .send()
            .await;

        match push_res {
            Ok(r) if r.status().is_success() => {
                tracing::info!("Pushed metrics to Pushgateway");
            }
            Ok(r) => {
                tracing::warn!(
                    "Pushgateway push responded with status {}",
                    r.status().as_u16()
                );
            }
            Err(e) => {
                tracing::warn!("Failed to push metrics to Pushgateway: {}", e);
            }
        }
    }

    /// Run fetch, transform, and load to completion as one in-process
    /// sequence, handing the dataset between stages through memory.
    #[instrument(skip_all)]
    pub async fn run(
        client: &dyn FeedClient,
        opts: &FetchOptions,
        store: &dyn VulnerabilityStore,
    ) -> Result<PipelineResult> {
        let run_id = Uuid::new_v4();
        info!("🚀 Starting ingest run {}", run_id);
        println!("🚀 Starting ingest run {run_id}");
        metrics::pipeline_run();
        let t_pipeline = std::time::Instant::now();

        // Step 1: Fetch raw records
        info!("📡 Fetching records from the feed...");
        println!("📡 Fetching records from the feed...");
        let t_fetch = std::time::Instant::now();
        let records = fetch_all(client, opts).await;
        metrics::fetch_duration(t_fetch.elapsed().as_secs_f64());
        if records.is_empty() {
            error!("No records fetched from the feed");
            return Err(IngestError::EmptyFetch);
        }
        info!("✅ Fetched {} raw records", records.len());
        println!("✅ Fetched {} raw records", records.len());
        metrics::records_fetched(records.len());

        // Step 2: Flatten into the denormalized dataset
        info!("🔧 Flattening records...");
        println!("🔧 Flattening records...");
        let rows = transform(&records)?;
        info!("✅ Flattened into {} rows", rows.len());
        println!("✅ Flattened into {} rows", rows.len());
        metrics::rows_flattened(rows.len());

        // Step 3: Bulk-load into the destination
        info!("💾 Loading rows into destination...");
        println!("💾 Loading rows into destination...");
        let summary = load(&rows, store).await?;
        info!("✅ Loaded {} rows", summary.rows_inserted);
        println!("✅ Loaded {} rows", summary.rows_inserted);
        metrics::rows_loaded(summary.rows_inserted);

        let total_secs = t_pipeline.elapsed().as_secs_f64();
        metrics::pipeline_duration(total_secs);

        // Push a minimal metrics snapshot to Pushgateway if configured
        Self::push_pushgateway_metrics(records.len(), summary.rows_inserted, total_secs).await;

        Ok(PipelineResult {
            run_id,
            records_fetched: records.len(),
            rows_flattened: rows.len(),
            rows_loaded: summary.rows_inserted,
        })
    }
}
