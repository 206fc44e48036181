#[cfg(test)]
mod tests {
    use anyhow::Result;
    use async_trait::async_trait;
    use nvd_ingest::error::IngestError;
    use nvd_ingest::fetch::{FeedClient, FetchOptions};
    use nvd_ingest::storage::InMemoryStore;
    use nvd_ingest::tasks::{fetch_data_task, save_data_task, transform_data_task};
    use nvd_ingest::types::{FlatRow, Vulnerability};
    use serde_json::json;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    struct SinglePageFeed {
        records: usize,
    }

    #[async_trait]
    impl FeedClient for SinglePageFeed {
        async fn fetch_page(
            &self,
            start_index: u64,
            _page_size: u64,
        ) -> nvd_ingest::error::Result<Vec<Vulnerability>> {
            if start_index == 0 {
                Ok(vec![Vulnerability::default(); self.records])
            } else {
                Ok(Vec::new())
            }
        }
    }

    fn write_raw_artifact(dir: &std::path::Path) -> Result<PathBuf> {
        let records = json!([
            {
                "cve": {
                    "id": "CVE-2024-3000",
                    "descriptions": [
                        {"lang": "en", "value": "An issue."},
                        {"lang": "es", "value": "Un problema."}
                    ]
                }
            }
        ]);
        let path = dir.join("raw.json");
        fs::write(&path, serde_json::to_string(&records)?)?;
        Ok(path)
    }

    #[tokio::test]
    async fn test_fetch_task_writes_raw_artifact() -> Result<()> {
        let dir = tempdir()?;
        let feed = SinglePageFeed { records: 3 };
        let opts = FetchOptions {
            start_index: 0,
            page_size: 10,
            max_records: 100,
        };

        let path = fetch_data_task(&feed, &opts, dir.path()).await?;
        assert!(path.exists());

        let content = fs::read_to_string(&path)?;
        let records: Vec<Vulnerability> = serde_json::from_str(&content)?;
        assert_eq!(records.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_task_fails_on_empty_feed() -> Result<()> {
        let dir = tempdir()?;
        let feed = SinglePageFeed { records: 0 };
        let result = fetch_data_task(&feed, &FetchOptions::default(), dir.path()).await;
        assert!(matches!(result, Err(IngestError::EmptyFetch)));
        Ok(())
    }

    #[tokio::test]
    async fn test_transform_task_consumes_input_artifact() -> Result<()> {
        let dir = tempdir()?;
        let input = write_raw_artifact(dir.path())?;

        let output = transform_data_task(&input, dir.path())?;
        assert!(!input.exists(), "input artifact should be removed");
        assert!(output.exists());

        let rows: Vec<FlatRow> = serde_json::from_str(&fs::read_to_string(&output)?)?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cve_id.as_deref(), Some("CVE-2024-3000"));
        Ok(())
    }

    #[tokio::test]
    async fn test_transform_task_removes_input_on_failure() -> Result<()> {
        let dir = tempdir()?;
        let input = dir.path().join("raw.json");
        fs::write(&input, "not json")?;

        let result = transform_data_task(&input, dir.path());
        assert!(result.is_err());
        assert!(!input.exists(), "input artifact should be removed on failure");
        Ok(())
    }

    #[tokio::test]
    async fn test_save_task_loads_and_consumes_artifact() -> Result<()> {
        let dir = tempdir()?;
        let input = write_raw_artifact(dir.path())?;
        let flat = transform_data_task(&input, dir.path())?;

        let store = InMemoryStore::new();
        let summary = save_data_task(&flat, &store).await?;
        assert_eq!(summary.rows_inserted, 2);
        assert!(!flat.exists(), "flat artifact should be removed");
        assert_eq!(store.logical_ids(), 1);
        Ok(())
    }
}
