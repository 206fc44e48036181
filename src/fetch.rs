use crate::constants;
use crate::error::Result;
use crate::metrics;
use crate::types::Vulnerability;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info};

#[derive(Debug, Default, Deserialize)]
struct FeedPage {
    #[serde(default)]
    vulnerabilities: Vec<Vulnerability>,
}

/// A paged upstream vulnerability feed.
#[async_trait]
pub trait FeedClient: Send + Sync {
    async fn fetch_page(&self, start_index: u64, page_size: u64) -> Result<Vec<Vulnerability>>;
}

pub struct NvdClient {
    client: reqwest::Client,
    base_url: String,
}

impl NvdClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for NvdClient {
    fn default() -> Self {
        Self::new(constants::NVD_API_URL)
    }
}

#[async_trait]
impl FeedClient for NvdClient {
    async fn fetch_page(&self, start_index: u64, page_size: u64) -> Result<Vec<Vulnerability>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("startIndex", start_index), ("resultsPerPage", page_size)])
            .send()
            .await?
            .error_for_status()?;

        let page: FeedPage = response.json().await?;
        Ok(page.vulnerabilities)
    }
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub start_index: u64,
    pub page_size: u64,
    pub max_records: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            start_index: constants::DEFAULT_START_INDEX,
            page_size: constants::DEFAULT_PAGE_SIZE,
            max_records: constants::DEFAULT_MAX_RECORDS,
        }
    }
}

/// Pages through the feed, accumulating records until a page comes back
/// empty, the record budget is reached (the accumulator is truncated to
/// exactly the budget), or a short page signals the end of the feed.
///
/// A transport failure ends pagination and returns whatever was accumulated;
/// retrying the stage is the orchestrator's responsibility.
pub async fn fetch_all(client: &dyn FeedClient, opts: &FetchOptions) -> Vec<Vulnerability> {
    let mut data: Vec<Vulnerability> = Vec::new();
    let mut start_index = opts.start_index;

    loop {
        let records = match client.fetch_page(start_index, opts.page_size).await {
            Ok(records) => records,
            Err(e) => {
                error!("Error fetching page at offset {}: {}", start_index, e);
                metrics::fetch_error();
                break;
            }
        };

        if records.is_empty() {
            info!("No more records to fetch");
            break;
        }

        let page_len = records.len();
        data.extend(records);
        info!("Fetched {} records. Total: {}", page_len, data.len());

        if data.len() >= opts.max_records {
            info!("Reached max record limit of {} records", opts.max_records);
            data.truncate(opts.max_records);
            break;
        }

        start_index += opts.page_size;

        if page_len < opts.page_size as usize {
            break;
        }
    }

    data
}
