use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregated product usage for one (region, sex, age) segment, codes already
/// mapped to their display labels. Per-prescriber box counts are flattened
/// into the JSON object under their prescriber labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedRecord {
    pub total_boites: f64,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Sex")]
    pub sex: String,
    #[serde(rename = "Age")]
    pub age: String,
    #[serde(rename = "Medication")]
    pub medication: Option<String>,
    #[serde(rename = "Generic")]
    pub generic: Option<String>,
    #[serde(flatten)]
    pub prescribers: BTreeMap<String, f64>,
}

/// One row of a brand-vs-generic comparison table. The dimension columns are
/// populated according to the table's grain; `brand_share` is null when the
/// combined total is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub brand_total: f64,
    pub generic_total: f64,
    pub combined_total: f64,
    pub brand_share: Option<f64>,
    #[serde(rename = "Region")]
    pub region: Option<String>,
    #[serde(rename = "Sex")]
    pub sex: Option<String>,
    #[serde(rename = "Age")]
    pub age: Option<String>,
    #[serde(rename = "Prescriber")]
    pub prescriber: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteQueryResponse {
    pub unified_df: Vec<UnifiedRecord>,
    pub unified_df_gen: Vec<UnifiedRecord>,
    pub metrics: BTreeMap<String, Vec<MetricsRecord>>,
}

/// Required query parameters for `/api/v1/execute-query`; both lists are
/// passed as repeated keys (`cip_list=...&cip_list=...`).
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteQueryParams {
    pub cip_list: Vec<String>,
    pub gen_list: Vec<String>,
}
