use crate::config::ClickHouseConfig;
use crate::error::{IngestError, Result};
use crate::load::CoercedRow;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info};

/// Destination column catalog, in table order.
pub const COLUMNS: [(&str, &str); 31] = [
    ("cve_id", "String"),
    ("cve_sourceIdentifier", "String"),
    ("cve_published", "DateTime64(9)"),
    ("cve_lastModified", "DateTime64(9)"),
    ("cve_vulnStatus", "String"),
    ("cve_cveTags", "String"),
    ("cve_descriptions_lang", "String"),
    ("cve_descriptions_value", "String"),
    ("cve_cvssMetricV2_source", "String"),
    ("cve_cvssMetricV2_type", "String"),
    ("cve_cvssMetricV2_cvssData_version", "Float64"),
    ("cve_cvssMetricV2_cvssData_vectorString", "String"),
    ("cve_cvssMetricV2_cvssData_baseScore", "Float64"),
    ("cve_cvssMetricV2_cvssData_accessVector", "String"),
    ("cve_cvssMetricV2_cvssData_accessComplexity", "String"),
    ("cve_cvssMetricV2_cvssData_authentication", "String"),
    ("cve_cvssMetricV2_cvssData_confidentialityImpact", "String"),
    ("cve_cvssMetricV2_cvssData_integrityImpact", "String"),
    ("cve_cvssMetricV2_cvssData_availabilityImpact", "String"),
    ("cve_cvssMetricV2_baseSeverity", "String"),
    ("cve_cvssMetricV2_exploitabilityScore", "Float64"),
    ("cve_cvssMetricV2_impactScore", "Float64"),
    ("cve_weakness_source", "String"),
    ("cve_weakness_type", "String"),
    ("cve_weakness_lang", "String"),
    ("cve_weakness_value", "String"),
    ("cve_cpe_criteria", "String"),
    ("cve_cpe_vulnerable", "String"),
    ("cve_cpe_matchCriteriaId", "String"),
    ("cve_reference_url", "String"),
    ("cve_reference_source", "String"),
];

// Column block of the CREATE TABLE statement, rendered once.
static COLUMN_DDL: Lazy<String> = Lazy::new(|| {
    COLUMNS
        .iter()
        .map(|(name, ty)| format!("    `{}` {}", name, ty))
        .collect::<Vec<_>>()
        .join(",\n")
});

fn create_table_sql(table: &str) -> String {
    format!(
        "CREATE TABLE {}\n(\n{}\n)\nENGINE = ReplacingMergeTree()\nORDER BY cve_id\nSETTINGS index_granularity = 8192",
        table, &*COLUMN_DDL
    )
}

/// Destination store for flattened vulnerability rows. Rows sharing a cve_id
/// converge server-side under the table's merge key, so re-ingesting a
/// previously seen id is safe.
#[async_trait]
pub trait VulnerabilityStore: Send + Sync {
    /// Create the destination table when it does not exist yet.
    async fn ensure_table(&self) -> Result<()>;

    /// Bulk-insert one batch of coerced rows.
    async fn insert_rows(&self, rows: &[CoercedRow]) -> Result<usize>;
}

/// ClickHouse over its HTTP interface.
pub struct ClickHouseStore {
    client: reqwest::Client,
    config: ClickHouseConfig,
}

impl ClickHouseStore {
    pub fn new(config: ClickHouseConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn table(&self) -> &str {
        &self.config.table
    }

    fn endpoint(&self) -> String {
        let scheme = if self.config.secure { "https" } else { "http" };
        let port = self
            .config
            .port
            .unwrap_or(if self.config.secure { 8443 } else { 8123 });
        format!("{}://{}:{}", scheme, self.config.host, port)
    }

    async fn command(&self, sql: &str) -> std::result::Result<String, String> {
        let response = self
            .client
            .post(self.endpoint())
            .basic_auth(&self.config.user, Some(&self.config.password))
            .body(sql.to_string())
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        let body = response.text().await.map_err(|e| e.to_string())?;
        if !status.is_success() {
            return Err(format!("{}: {}", status.as_u16(), body.trim()));
        }
        Ok(body)
    }
}

#[async_trait]
impl VulnerabilityStore for ClickHouseStore {
    async fn ensure_table(&self) -> Result<()> {
        let exists = self
            .command(&format!("EXISTS {}", self.config.table))
            .await
            .map_err(|e| {
                IngestError::Schema(format!(
                    "existence check for {} failed: {}",
                    self.config.table, e
                ))
            })?;

        if exists.trim() == "0" {
            self.command(&create_table_sql(&self.config.table))
                .await
                .map_err(|e| {
                    IngestError::Schema(format!("creating {} failed: {}", self.config.table, e))
                })?;
            info!("Table {} created", self.config.table);
        }
        Ok(())
    }

    async fn insert_rows(&self, rows: &[CoercedRow]) -> Result<usize> {
        let mut body = String::new();
        for row in rows {
            body.push_str(&serde_json::to_string(row)?);
            body.push('\n');
        }

        let query = format!("INSERT INTO {} FORMAT JSONEachRow", self.config.table);
        let response = self
            .client
            .post(self.endpoint())
            .query(&[
                ("query", query.as_str()),
                ("input_format_null_as_default", "1"),
            ])
            .basic_auth(&self.config.user, Some(&self.config.password))
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            let sample = rows
                .first()
                .map(|r| Value::Object(r.clone()).to_string())
                .unwrap_or_default();
            return Err(IngestError::Insertion {
                message: format!("{}: {}", status.as_u16(), message.trim()),
                sample,
            });
        }

        debug!("Inserted batch of {} rows into {}", rows.len(), self.config.table);
        Ok(rows.len())
    }
}

/// In-memory store for tests and dry runs. Mirrors the destination's
/// replacing-merge key: inserting rows for a cve_id replaces whatever that id
/// held before, so repeated ingests converge instead of duplicating.
pub struct InMemoryStore {
    rows: Mutex<HashMap<String, Vec<CoercedRow>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
        }
    }

    /// Number of distinct vulnerability ids held.
    pub fn logical_ids(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn total_rows(&self) -> usize {
        self.rows.lock().unwrap().values().map(Vec::len).sum()
    }

    pub fn rows_for(&self, cve_id: &str) -> Vec<CoercedRow> {
        self.rows
            .lock()
            .unwrap()
            .get(cve_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VulnerabilityStore for InMemoryStore {
    async fn ensure_table(&self) -> Result<()> {
        Ok(())
    }

    async fn insert_rows(&self, rows: &[CoercedRow]) -> Result<usize> {
        let mut batch: HashMap<String, Vec<CoercedRow>> = HashMap::new();
        for row in rows {
            let id = row
                .get("cve_id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            batch.entry(id).or_default().push(row.clone());
        }

        let mut map = self.rows.lock().unwrap();
        for (id, group) in batch {
            debug!("Stored {} rows for {}", group.len(), id);
            map.insert(id, group);
        }
        Ok(rows.len())
    }
}
