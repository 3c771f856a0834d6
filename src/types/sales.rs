use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrugType {
    Brand,
    Generic,
}

/// One row of the sales dataset, serialized with the API's camelCase names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRecord {
    pub id: String,
    pub beneficiary_region: i32,
    pub gender: i32,
    pub age: i32,
    pub generic_number: i64,
    pub total_boxes: i64,
    pub regions: HashMap<String, i64>,
    pub company: String,
    pub drug_name: String,
    pub drug_type: DrugType,
    pub revenue: f64,
    pub date: String,
    pub growth: Option<f64>,
    pub prescriber: Option<String>,
    pub volume_share: Option<f64>,
    pub region: Option<String>,
}

/// Headline figures for the dashboard overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiData {
    pub total_revenue: f64,
    pub revenue_change: f64,
    pub total_units: i64,
    pub units_change: f64,
    pub generic_ratio: f64,
    pub generic_ratio_change: f64,
    pub active_companies: i64,
    pub companies_change: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrugTypeFilter {
    Brand,
    Generic,
    All,
}

/// Query parameters accepted by `/api/v1/sales`. Repeated keys
/// (`companies=A&companies=B`) collect into the vector fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalesParams {
    #[serde(default)]
    pub cip13_codes: Vec<String>,
    #[serde(default)]
    pub companies: Vec<String>,
    #[serde(default)]
    pub regions: Vec<String>,
    pub drug_type: Option<DrugTypeFilter>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub age_groups: Vec<i32>,
    #[serde(default)]
    pub gender: Vec<i32>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}
