use crate::constants::{CLICKHOUSE_TIMESTAMP_FORMAT, NVD_TIMESTAMP_FORMAT};
use crate::error::{IngestError, Result};
use crate::metrics;
use crate::storage::VulnerabilityStore;
use crate::types::FlatRow;
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use tracing::{error, info};

/// One destination-shaped row, keyed by column name.
pub type CoercedRow = Map<String, Value>;

#[derive(Debug, Serialize)]
pub struct LoadSummary {
    pub rows_received: usize,
    pub rows_inserted: usize,
}

/// Timestamp columns: parsed from the feed's fixed layout and re-rendered for
/// DateTime64(9). Unparsable or absent values become null, never an error.
pub fn timestamp_value(raw: Option<&str>) -> Value {
    match raw.and_then(|s| NaiveDateTime::parse_from_str(s, NVD_TIMESTAMP_FORMAT).ok()) {
        Some(ts) => Value::String(ts.format(CLICKHOUSE_TIMESTAMP_FORMAT).to_string()),
        None => Value::Null,
    }
}

/// The vulnerable flag lands in a non-nullable String column: true/false
/// become "1"/"0", absence falls through to the empty-string null fill.
pub fn bool_flag_value(raw: Option<bool>) -> Value {
    match raw {
        Some(true) => Value::String("1".to_string()),
        Some(false) => Value::String("0".to_string()),
        None => Value::String(String::new()),
    }
}

fn string_value(raw: &Option<String>) -> Value {
    Value::String(raw.clone().unwrap_or_default())
}

fn float_value(raw: Option<f64>) -> Value {
    raw.and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// The CVSS version arrives as a string ("2.0") but its column is Float64.
fn version_value(raw: &Option<String>) -> Value {
    float_value(raw.as_deref().and_then(|s| s.parse::<f64>().ok()))
}

/// Coerces one flat row to the destination column types: booleans to 1/0,
/// the two timestamp columns parsed-or-null, the four Float64 columns kept
/// numeric, and every other absent value filled with an empty string to
/// satisfy the non-nullable String columns.
pub fn coerce_row(row: &FlatRow) -> CoercedRow {
    let mut out = Map::new();
    out.insert("cve_id".into(), string_value(&row.cve_id));
    out.insert(
        "cve_sourceIdentifier".into(),
        string_value(&row.source_identifier),
    );
    out.insert(
        "cve_published".into(),
        timestamp_value(row.published.as_deref()),
    );
    out.insert(
        "cve_lastModified".into(),
        timestamp_value(row.last_modified.as_deref()),
    );
    out.insert("cve_vulnStatus".into(), string_value(&row.vuln_status));
    out.insert("cve_cveTags".into(), string_value(&row.cve_tags));
    out.insert(
        "cve_descriptions_lang".into(),
        string_value(&row.description_lang),
    );
    out.insert(
        "cve_descriptions_value".into(),
        string_value(&row.description_value),
    );
    out.insert(
        "cve_cvssMetricV2_source".into(),
        string_value(&row.metric_source),
    );
    out.insert(
        "cve_cvssMetricV2_type".into(),
        string_value(&row.metric_type),
    );
    out.insert(
        "cve_cvssMetricV2_cvssData_version".into(),
        version_value(&row.cvss_version),
    );
    out.insert(
        "cve_cvssMetricV2_cvssData_vectorString".into(),
        string_value(&row.cvss_vector_string),
    );
    out.insert(
        "cve_cvssMetricV2_cvssData_baseScore".into(),
        float_value(row.cvss_base_score),
    );
    out.insert(
        "cve_cvssMetricV2_cvssData_accessVector".into(),
        string_value(&row.cvss_access_vector),
    );
    out.insert(
        "cve_cvssMetricV2_cvssData_accessComplexity".into(),
        string_value(&row.cvss_access_complexity),
    );
    out.insert(
        "cve_cvssMetricV2_cvssData_authentication".into(),
        string_value(&row.cvss_authentication),
    );
    out.insert(
        "cve_cvssMetricV2_cvssData_confidentialityImpact".into(),
        string_value(&row.cvss_confidentiality_impact),
    );
    out.insert(
        "cve_cvssMetricV2_cvssData_integrityImpact".into(),
        string_value(&row.cvss_integrity_impact),
    );
    out.insert(
        "cve_cvssMetricV2_cvssData_availabilityImpact".into(),
        string_value(&row.cvss_availability_impact),
    );
    out.insert(
        "cve_cvssMetricV2_baseSeverity".into(),
        string_value(&row.metric_base_severity),
    );
    out.insert(
        "cve_cvssMetricV2_exploitabilityScore".into(),
        float_value(row.metric_exploitability_score),
    );
    out.insert(
        "cve_cvssMetricV2_impactScore".into(),
        float_value(row.metric_impact_score),
    );
    out.insert(
        "cve_weakness_source".into(),
        string_value(&row.weakness_source),
    );
    out.insert("cve_weakness_type".into(), string_value(&row.weakness_type));
    out.insert("cve_weakness_lang".into(), string_value(&row.weakness_lang));
    out.insert(
        "cve_weakness_value".into(),
        string_value(&row.weakness_value),
    );
    out.insert("cve_cpe_criteria".into(), string_value(&row.cpe_criteria));
    out.insert("cve_cpe_vulnerable".into(), bool_flag_value(row.cpe_vulnerable));
    out.insert(
        "cve_cpe_matchCriteriaId".into(),
        string_value(&row.cpe_match_criteria_id),
    );
    out.insert("cve_reference_url".into(), string_value(&row.reference_url));
    out.insert(
        "cve_reference_source".into(),
        string_value(&row.reference_source),
    );
    out
}

/// Coerces the dataset and bulk-inserts it in one batch. An empty dataset is
/// a logged no-op. Table creation failures surface before any insert is
/// attempted; an insert failure is logged with a sample row and propagated
/// without partial row-by-row retry.
pub async fn load(dataset: &[FlatRow], store: &dyn VulnerabilityStore) -> Result<LoadSummary> {
    if dataset.is_empty() {
        info!("No rows to load");
        return Ok(LoadSummary {
            rows_received: 0,
            rows_inserted: 0,
        });
    }

    store.ensure_table().await?;

    let coerced: Vec<CoercedRow> = dataset.iter().map(coerce_row).collect();

    match store.insert_rows(&coerced).await {
        Ok(inserted) => {
            info!("Inserted {} rows into destination", inserted);
            Ok(LoadSummary {
                rows_received: dataset.len(),
                rows_inserted: inserted,
            })
        }
        Err(e) => {
            error!("Error inserting data into destination: {}", e);
            if let IngestError::Insertion { sample, .. } = &e {
                error!("Formatted data sample: {}", sample);
            }
            metrics::insert_error();
            Err(e)
        }
    }
}
