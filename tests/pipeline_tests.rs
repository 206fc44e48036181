#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use nvd_ingest::error::{IngestError, Result};
    use nvd_ingest::fetch::{FeedClient, FetchOptions};
    use nvd_ingest::pipeline::Pipeline;
    use nvd_ingest::storage::InMemoryStore;
    use nvd_ingest::types::Vulnerability;
    use serde_json::json;

    struct SinglePageFeed {
        records: Vec<Vulnerability>,
    }

    #[async_trait]
    impl FeedClient for SinglePageFeed {
        async fn fetch_page(
            &self,
            start_index: u64,
            _page_size: u64,
        ) -> Result<Vec<Vulnerability>> {
            if start_index == 0 {
                Ok(self.records.clone())
            } else {
                Ok(Vec::new())
            }
        }
    }

    fn record(value: serde_json::Value) -> Vulnerability {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_full_run_fetches_flattens_and_loads() {
        let feed = SinglePageFeed {
            records: vec![
                record(json!({
                    "cve": {
                        "id": "CVE-2024-4000",
                        "descriptions": [
                            {"lang": "en", "value": "An issue."},
                            {"lang": "es", "value": "Un problema."}
                        ],
                        "references": [
                            {"url": "https://example.com/a", "source": "vendor"}
                        ]
                    }
                })),
                record(json!({"cve": {"id": "CVE-2024-4001"}})),
            ],
        };
        let store = InMemoryStore::new();

        let result = Pipeline::run(&feed, &FetchOptions::default(), &store)
            .await
            .unwrap();

        assert_eq!(result.records_fetched, 2);
        assert_eq!(result.rows_flattened, 3);
        assert_eq!(result.rows_loaded, 3);
        assert_eq!(store.logical_ids(), 2);
        assert_eq!(store.total_rows(), 3);
    }

    #[tokio::test]
    async fn test_run_surfaces_empty_fetch() {
        let feed = SinglePageFeed {
            records: Vec::new(),
        };
        let store = InMemoryStore::new();

        let result = Pipeline::run(&feed, &FetchOptions::default(), &store).await;
        assert!(matches!(result, Err(IngestError::EmptyFetch)));
        assert_eq!(store.total_rows(), 0);
    }
}
