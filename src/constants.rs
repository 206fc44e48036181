/// Feed and destination constants shared across the pipeline

// NVD 2.0 CVE API endpoint
pub const NVD_API_URL: &str = "https://services.nvd.nist.gov/rest/json/cves/2.0";

// Pagination defaults. The feed caps resultsPerPage at 2000.
pub const DEFAULT_START_INDEX: u64 = 0;
pub const DEFAULT_PAGE_SIZE: u64 = 2000;
pub const DEFAULT_MAX_RECORDS: usize = 200;

// Destination table (database-qualified)
pub const DEFAULT_TABLE: &str = "nvd.cve_flat";

// Timestamp layout used by the feed for published/lastModified
pub const NVD_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

// Layout accepted by DateTime64(9) columns over JSONEachRow
pub const CLICKHOUSE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f";
