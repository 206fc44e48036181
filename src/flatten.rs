use crate::types::{FlatRow, Vulnerability};
use serde_json::Value;

// Candidate tuples drawn from each repeated group. A group's absence is
// represented by the Default (all-empty) tuple so the cartesian product
// below never collapses to zero rows.

#[derive(Debug, Clone, Default)]
struct DescriptionCols {
    lang: Option<String>,
    value: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct MetricCols {
    source: Option<String>,
    metric_type: Option<String>,
    version: Option<String>,
    vector_string: Option<String>,
    base_score: Option<f64>,
    access_vector: Option<String>,
    access_complexity: Option<String>,
    authentication: Option<String>,
    confidentiality_impact: Option<String>,
    integrity_impact: Option<String>,
    availability_impact: Option<String>,
    base_severity: Option<String>,
    exploitability_score: Option<f64>,
    impact_score: Option<f64>,
}

#[derive(Debug, Clone, Default)]
struct WeaknessCols {
    source: Option<String>,
    weakness_type: Option<String>,
    lang: Option<String>,
    value: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct CpeCols {
    criteria: Option<String>,
    vulnerable: Option<bool>,
    match_criteria_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct ReferenceCols {
    url: Option<String>,
    source: Option<String>,
}

fn or_placeholder<T: Default>(items: Vec<T>) -> Vec<T> {
    if items.is_empty() {
        vec![T::default()]
    } else {
        items
    }
}

fn render_tags(tags: &[Value]) -> Option<String> {
    if tags.is_empty() {
        return None;
    }
    let parts: Vec<String> = tags
        .iter()
        .map(|tag| match tag {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    Some(parts.join("|"))
}

/// Expands one nested record into fully flat rows: one row per combination of
/// elements drawn from the five repeated groups, each group floored at a
/// single placeholder element when empty. A record with all groups empty
/// yields exactly one header-only row.
pub fn flatten(record: &Vulnerability) -> Vec<FlatRow> {
    let cve = &record.cve;
    let cve_tags = render_tags(&cve.cve_tags);

    let descriptions = or_placeholder(
        cve.descriptions
            .iter()
            .map(|d| DescriptionCols {
                lang: d.lang.clone(),
                value: d.value.clone(),
            })
            .collect(),
    );

    let metrics = or_placeholder(
        cve.metrics
            .cvss_metric_v2
            .iter()
            .map(|m| MetricCols {
                source: m.source.clone(),
                metric_type: m.metric_type.clone(),
                version: m.cvss_data.version.clone(),
                vector_string: m.cvss_data.vector_string.clone(),
                base_score: m.cvss_data.base_score,
                access_vector: m.cvss_data.access_vector.clone(),
                access_complexity: m.cvss_data.access_complexity.clone(),
                authentication: m.cvss_data.authentication.clone(),
                confidentiality_impact: m.cvss_data.confidentiality_impact.clone(),
                integrity_impact: m.cvss_data.integrity_impact.clone(),
                availability_impact: m.cvss_data.availability_impact.clone(),
                base_severity: m.base_severity.clone(),
                exploitability_score: m.exploitability_score,
                impact_score: m.impact_score,
            })
            .collect(),
    );

    // Weaknesses are pre-flattened one level: a weakness with N language
    // descriptions contributes N independent tuples to the product.
    let mut weaknesses = Vec::new();
    for w in &cve.weaknesses {
        for desc in &w.description {
            weaknesses.push(WeaknessCols {
                source: w.source.clone(),
                weakness_type: w.weakness_type.clone(),
                lang: desc.lang.clone(),
                value: desc.value.clone(),
            });
        }
    }
    let weaknesses = or_placeholder(weaknesses);

    // Likewise every match criteria across every node of every configuration
    // becomes one independent tuple.
    let mut cpes = Vec::new();
    for config in &cve.configurations {
        for node in &config.nodes {
            for cpe in &node.cpe_match {
                cpes.push(CpeCols {
                    criteria: cpe.criteria.clone(),
                    vulnerable: cpe.vulnerable,
                    match_criteria_id: cpe.match_criteria_id.clone(),
                });
            }
        }
    }
    let cpes = or_placeholder(cpes);

    let references = or_placeholder(
        cve.references
            .iter()
            .map(|r| ReferenceCols {
                url: r.url.clone(),
                source: r.source.clone(),
            })
            .collect(),
    );

    let mut rows = Vec::with_capacity(
        descriptions.len() * metrics.len() * weaknesses.len() * cpes.len() * references.len(),
    );

    for desc in &descriptions {
        for metric in &metrics {
            for weak in &weaknesses {
                for cpe in &cpes {
                    for reference in &references {
                        rows.push(FlatRow {
                            cve_id: cve.id.clone(),
                            source_identifier: cve.source_identifier.clone(),
                            published: cve.published.clone(),
                            last_modified: cve.last_modified.clone(),
                            vuln_status: cve.vuln_status.clone(),
                            cve_tags: cve_tags.clone(),
                            description_lang: desc.lang.clone(),
                            description_value: desc.value.clone(),
                            metric_source: metric.source.clone(),
                            metric_type: metric.metric_type.clone(),
                            cvss_version: metric.version.clone(),
                            cvss_vector_string: metric.vector_string.clone(),
                            cvss_base_score: metric.base_score,
                            cvss_access_vector: metric.access_vector.clone(),
                            cvss_access_complexity: metric.access_complexity.clone(),
                            cvss_authentication: metric.authentication.clone(),
                            cvss_confidentiality_impact: metric.confidentiality_impact.clone(),
                            cvss_integrity_impact: metric.integrity_impact.clone(),
                            cvss_availability_impact: metric.availability_impact.clone(),
                            metric_base_severity: metric.base_severity.clone(),
                            metric_exploitability_score: metric.exploitability_score,
                            metric_impact_score: metric.impact_score,
                            weakness_source: weak.source.clone(),
                            weakness_type: weak.weakness_type.clone(),
                            weakness_lang: weak.lang.clone(),
                            weakness_value: weak.value.clone(),
                            cpe_criteria: cpe.criteria.clone(),
                            cpe_vulnerable: cpe.vulnerable,
                            cpe_match_criteria_id: cpe.match_criteria_id.clone(),
                            reference_url: reference.url.clone(),
                            reference_source: reference.source.clone(),
                        });
                    }
                }
            }
        }
    }

    rows
}
