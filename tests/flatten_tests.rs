#[cfg(test)]
mod tests {
    use nvd_ingest::flatten::flatten;
    use nvd_ingest::types::Vulnerability;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Vulnerability {
        serde_json::from_value(value).unwrap()
    }

    fn metric_fixture(source: &str) -> serde_json::Value {
        json!({
            "source": source,
            "type": "Primary",
            "cvssData": {
                "version": "2.0",
                "vectorString": "AV:N/AC:L/Au:N/C:P/I:P/A:P",
                "baseScore": 7.5,
                "accessVector": "NETWORK",
                "accessComplexity": "LOW",
                "authentication": "NONE",
                "confidentialityImpact": "PARTIAL",
                "integrityImpact": "PARTIAL",
                "availabilityImpact": "PARTIAL"
            },
            "baseSeverity": "HIGH",
            "exploitabilityScore": 10.0,
            "impactScore": 6.4
        })
    }

    #[test]
    fn test_row_count_is_product_of_group_sizes() {
        let vuln = record(json!({
            "cve": {
                "id": "CVE-2024-0001",
                "sourceIdentifier": "cve@mitre.org",
                "published": "2024-01-02T15:04:05.123",
                "lastModified": "2024-01-03T10:00:00.000",
                "vulnStatus": "Analyzed",
                "descriptions": [
                    {"lang": "en", "value": "A buffer overflow."},
                    {"lang": "es", "value": "Un desbordamiento."}
                ],
                "metrics": {
                    "cvssMetricV2": [
                        metric_fixture("nvd@nist.gov"),
                        metric_fixture("cve@mitre.org"),
                        metric_fixture("security@vendor.example")
                    ]
                }
            }
        }));

        // 2 descriptions x 3 metrics x 1 x 1 x 1
        let rows = flatten(&vuln);
        assert_eq!(rows.len(), 6);
    }

    #[test]
    fn test_record_with_all_groups_empty_yields_one_header_row() {
        let vuln = record(json!({
            "cve": {
                "id": "CVE-2024-0002",
                "sourceIdentifier": "cve@mitre.org",
                "published": "2024-02-01T00:00:00.000",
                "lastModified": "2024-02-01T00:00:00.000",
                "vulnStatus": "Received"
            }
        }));

        let rows = flatten(&vuln);
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.cve_id.as_deref(), Some("CVE-2024-0002"));
        assert_eq!(row.vuln_status.as_deref(), Some("Received"));
        assert!(row.description_lang.is_none());
        assert!(row.metric_source.is_none());
        assert!(row.cvss_base_score.is_none());
        assert!(row.weakness_source.is_none());
        assert!(row.cpe_criteria.is_none());
        assert!(row.cpe_vulnerable.is_none());
        assert!(row.reference_url.is_none());
    }

    #[test]
    fn test_weaknesses_are_preflattened_over_language_descriptions() {
        let vuln = record(json!({
            "cve": {
                "id": "CVE-2024-0003",
                "weaknesses": [
                    {
                        "source": "nvd@nist.gov",
                        "type": "Primary",
                        "description": [
                            {"lang": "en", "value": "CWE-79"},
                            {"lang": "en", "value": "CWE-89"}
                        ]
                    }
                ]
            }
        }));

        // One weakness with two language descriptions contributes two tuples
        let rows = flatten(&vuln);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].weakness_value.as_deref(), Some("CWE-79"));
        assert_eq!(rows[1].weakness_value.as_deref(), Some("CWE-89"));
        assert_eq!(rows[0].weakness_source.as_deref(), Some("nvd@nist.gov"));
        assert_eq!(rows[1].weakness_source.as_deref(), Some("nvd@nist.gov"));
    }

    #[test]
    fn test_configurations_are_preflattened_over_nodes_and_matches() {
        let vuln = record(json!({
            "cve": {
                "id": "CVE-2024-0004",
                "configurations": [
                    {
                        "nodes": [
                            {
                                "cpeMatch": [
                                    {"criteria": "cpe:2.3:a:ex:one:*", "vulnerable": true, "matchCriteriaId": "A"},
                                    {"criteria": "cpe:2.3:a:ex:two:*", "vulnerable": false, "matchCriteriaId": "B"}
                                ]
                            },
                            {
                                "cpeMatch": [
                                    {"criteria": "cpe:2.3:a:ex:three:*", "vulnerable": true, "matchCriteriaId": "C"}
                                ]
                            }
                        ]
                    },
                    {
                        "nodes": [
                            {
                                "cpeMatch": [
                                    {"criteria": "cpe:2.3:a:ex:four:*", "vulnerable": true, "matchCriteriaId": "D"}
                                ]
                            }
                        ]
                    }
                ]
            }
        }));

        // Every cpeMatch entry across every node of every configuration is one tuple
        let rows = flatten(&vuln);
        assert_eq!(rows.len(), 4);
        let ids: Vec<_> = rows
            .iter()
            .map(|r| r.cpe_match_criteria_id.as_deref().unwrap())
            .collect();
        assert_eq!(ids, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_two_descriptions_one_metric_two_references() {
        let vuln = record(json!({
            "cve": {
                "id": "CVE-2024-0005",
                "sourceIdentifier": "cve@mitre.org",
                "published": "2024-03-01T12:00:00.000",
                "lastModified": "2024-03-02T12:00:00.000",
                "vulnStatus": "Analyzed",
                "descriptions": [
                    {"lang": "en", "value": "An issue."},
                    {"lang": "fr", "value": "Un probleme."}
                ],
                "metrics": {"cvssMetricV2": [metric_fixture("nvd@nist.gov")]},
                "references": [
                    {"url": "https://example.com/advisory", "source": "vendor"},
                    {"url": "https://example.com/patch", "source": "vendor"}
                ]
            }
        }));

        // 2 x 1 x 1 (placeholder weaknesses) x 1 (placeholder configs) x 2
        let rows = flatten(&vuln);
        assert_eq!(rows.len(), 4);

        for row in &rows {
            assert_eq!(row.cve_id.as_deref(), Some("CVE-2024-0005"));
            assert_eq!(row.metric_source.as_deref(), Some("nvd@nist.gov"));
            assert!(row.weakness_source.is_none());
            assert!(row.weakness_value.is_none());
            assert!(row.cpe_criteria.is_none());
            assert!(row.cpe_vulnerable.is_none());
        }

        // References vary fastest, descriptions slowest
        assert_eq!(rows[0].description_lang.as_deref(), Some("en"));
        assert_eq!(rows[0].reference_url.as_deref(), Some("https://example.com/advisory"));
        assert_eq!(rows[1].description_lang.as_deref(), Some("en"));
        assert_eq!(rows[1].reference_url.as_deref(), Some("https://example.com/patch"));
        assert_eq!(rows[2].description_lang.as_deref(), Some("fr"));
        assert_eq!(rows[2].reference_url.as_deref(), Some("https://example.com/advisory"));
        assert_eq!(rows[3].description_lang.as_deref(), Some("fr"));
        assert_eq!(rows[3].reference_url.as_deref(), Some("https://example.com/patch"));
    }

    #[test]
    fn test_cve_tags_joined_with_pipe() {
        let vuln = record(json!({
            "cve": {
                "id": "CVE-2024-0006",
                "cveTags": ["disputed", "unsupported-when-assigned"]
            }
        }));

        let rows = flatten(&vuln);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].cve_tags.as_deref(),
            Some("disputed|unsupported-when-assigned")
        );
    }

    #[test]
    fn test_absent_cve_tags_stay_absent() {
        let vuln = record(json!({"cve": {"id": "CVE-2024-0007"}}));
        let rows = flatten(&vuln);
        assert!(rows[0].cve_tags.is_none());
    }
}
