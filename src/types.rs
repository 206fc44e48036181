use serde::{Deserialize, Serialize};

/// One entry of the feed's `vulnerabilities` array, as received.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vulnerability {
    #[serde(default)]
    pub cve: Cve,
}

/// The nested CVE record: a scalar header plus five repeated groups.
/// Fields the feed omits deserialize to their defaults; unknown fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cve {
    pub id: Option<String>,
    pub source_identifier: Option<String>,
    pub published: Option<String>,
    pub last_modified: Option<String>,
    pub vuln_status: Option<String>,
    pub cve_tags: Vec<serde_json::Value>,
    pub descriptions: Vec<LangString>,
    pub metrics: MetricsBlock,
    pub weaknesses: Vec<Weakness>,
    pub configurations: Vec<Configuration>,
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LangString {
    pub lang: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricsBlock {
    pub cvss_metric_v2: Vec<CvssMetricV2>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvssMetricV2 {
    pub source: Option<String>,
    #[serde(rename = "type")]
    pub metric_type: Option<String>,
    pub cvss_data: CvssDataV2,
    pub base_severity: Option<String>,
    pub exploitability_score: Option<f64>,
    pub impact_score: Option<f64>,
}

/// CVSS v2 score vector. `version` arrives as a string ("2.0") and is
/// coerced to the destination's numeric column at load time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvssDataV2 {
    pub version: Option<String>,
    pub vector_string: Option<String>,
    pub base_score: Option<f64>,
    pub access_vector: Option<String>,
    pub access_complexity: Option<String>,
    pub authentication: Option<String>,
    pub confidentiality_impact: Option<String>,
    pub integrity_impact: Option<String>,
    pub availability_impact: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Weakness {
    pub source: Option<String>,
    #[serde(rename = "type")]
    pub weakness_type: Option<String>,
    pub description: Vec<LangString>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub nodes: Vec<ConfigNode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigNode {
    #[serde(rename = "cpeMatch")]
    pub cpe_match: Vec<CpeMatch>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CpeMatch {
    pub criteria: Option<String>,
    pub vulnerable: Option<bool>,
    pub match_criteria_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Reference {
    pub url: Option<String>,
    pub source: Option<String>,
}

/// One fully scalar output row: the header plus exactly one element from each
/// repeated group. Serde names match the destination column names, so a
/// serialized row doubles as a JSONEachRow line and as the handoff format
/// between the transform and load stages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatRow {
    pub cve_id: Option<String>,
    #[serde(rename = "cve_sourceIdentifier")]
    pub source_identifier: Option<String>,
    #[serde(rename = "cve_published")]
    pub published: Option<String>,
    #[serde(rename = "cve_lastModified")]
    pub last_modified: Option<String>,
    #[serde(rename = "cve_vulnStatus")]
    pub vuln_status: Option<String>,
    #[serde(rename = "cve_cveTags")]
    pub cve_tags: Option<String>,

    #[serde(rename = "cve_descriptions_lang")]
    pub description_lang: Option<String>,
    #[serde(rename = "cve_descriptions_value")]
    pub description_value: Option<String>,

    #[serde(rename = "cve_cvssMetricV2_source")]
    pub metric_source: Option<String>,
    #[serde(rename = "cve_cvssMetricV2_type")]
    pub metric_type: Option<String>,
    #[serde(rename = "cve_cvssMetricV2_cvssData_version")]
    pub cvss_version: Option<String>,
    #[serde(rename = "cve_cvssMetricV2_cvssData_vectorString")]
    pub cvss_vector_string: Option<String>,
    #[serde(rename = "cve_cvssMetricV2_cvssData_baseScore")]
    pub cvss_base_score: Option<f64>,
    #[serde(rename = "cve_cvssMetricV2_cvssData_accessVector")]
    pub cvss_access_vector: Option<String>,
    #[serde(rename = "cve_cvssMetricV2_cvssData_accessComplexity")]
    pub cvss_access_complexity: Option<String>,
    #[serde(rename = "cve_cvssMetricV2_cvssData_authentication")]
    pub cvss_authentication: Option<String>,
    #[serde(rename = "cve_cvssMetricV2_cvssData_confidentialityImpact")]
    pub cvss_confidentiality_impact: Option<String>,
    #[serde(rename = "cve_cvssMetricV2_cvssData_integrityImpact")]
    pub cvss_integrity_impact: Option<String>,
    #[serde(rename = "cve_cvssMetricV2_cvssData_availabilityImpact")]
    pub cvss_availability_impact: Option<String>,
    #[serde(rename = "cve_cvssMetricV2_baseSeverity")]
    pub metric_base_severity: Option<String>,
    #[serde(rename = "cve_cvssMetricV2_exploitabilityScore")]
    pub metric_exploitability_score: Option<f64>,
    #[serde(rename = "cve_cvssMetricV2_impactScore")]
    pub metric_impact_score: Option<f64>,

    #[serde(rename = "cve_weakness_source")]
    pub weakness_source: Option<String>,
    #[serde(rename = "cve_weakness_type")]
    pub weakness_type: Option<String>,
    #[serde(rename = "cve_weakness_lang")]
    pub weakness_lang: Option<String>,
    #[serde(rename = "cve_weakness_value")]
    pub weakness_value: Option<String>,

    #[serde(rename = "cve_cpe_criteria")]
    pub cpe_criteria: Option<String>,
    #[serde(rename = "cve_cpe_vulnerable")]
    pub cpe_vulnerable: Option<bool>,
    #[serde(rename = "cve_cpe_matchCriteriaId")]
    pub cpe_match_criteria_id: Option<String>,

    #[serde(rename = "cve_reference_url")]
    pub reference_url: Option<String>,
    #[serde(rename = "cve_reference_source")]
    pub reference_source: Option<String>,
}
