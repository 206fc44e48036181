//! Metric recording helpers following Prometheus naming conventions.

use metrics::{counter, histogram};

pub fn pipeline_run() {
    counter!("nvd_pipeline_runs_total").increment(1);
}

pub fn fetch_duration(secs: f64) {
    histogram!("nvd_fetch_duration_seconds").record(secs);
}

pub fn fetch_error() {
    counter!("nvd_fetch_errors_total").increment(1);
}

pub fn records_fetched(count: usize) {
    counter!("nvd_records_fetched_total").increment(count as u64);
    histogram!("nvd_records_per_run").record(count as f64);
}

pub fn rows_flattened(count: usize) {
    counter!("nvd_rows_flattened_total").increment(count as u64);
}

pub fn rows_loaded(count: usize) {
    counter!("nvd_rows_loaded_total").increment(count as u64);
}

pub fn insert_error() {
    counter!("nvd_insert_errors_total").increment(1);
}

pub fn pipeline_duration(secs: f64) {
    histogram!("nvd_pipeline_duration_seconds").record(secs);
}
