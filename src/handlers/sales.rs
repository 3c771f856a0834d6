use axum::{Json, extract::State};
use axum_extra::extract::Query;
use chrono::NaiveDate;
use serde_json::{Value, json};
use std::collections::HashMap;

use crate::router::InsightState;
use crate::types::{DrugType, DrugTypeFilter, KpiData, SalesParams, SalesRecord};

/// Region codes served by `/api/v1/master/regions`.
const REGION_CODES: [&str; 6] = ["1", "2", "3", "35", "42", "99"];

pub async fn sales_handler(
    State(state): State<InsightState>,
    Query(params): Query<SalesParams>,
) -> Json<Vec<SalesRecord>> {
    Json(filter_sales(&state.sales, &params))
}

pub async fn kpis_handler(State(state): State<InsightState>) -> Json<KpiData> {
    Json(state.kpis.as_ref().clone())
}

pub async fn company_comparison_handler() -> Json<Value> {
    Json(json!({ "message": "Mock company comparison data" }))
}

pub async fn region_master_handler() -> Json<Vec<String>> {
    Json(REGION_CODES.iter().map(|c| c.to_string()).collect())
}

/// Apply the declared filter parameters, then the offset/limit window.
/// `cip13_codes` is accepted for API compatibility; this projection carries
/// no CIP13 column to match it against.
pub(crate) fn filter_sales(records: &[SalesRecord], params: &SalesParams) -> Vec<SalesRecord> {
    let filtered = records
        .iter()
        .filter(|r| record_matches(r, params))
        .skip(params.offset.unwrap_or(0));
    match params.limit {
        Some(limit) => filtered.take(limit).cloned().collect(),
        None => filtered.cloned().collect(),
    }
}

fn record_matches(record: &SalesRecord, params: &SalesParams) -> bool {
    if !params.companies.is_empty() && !params.companies.contains(&record.company) {
        return false;
    }
    if !params.regions.is_empty() {
        let region = record.beneficiary_region.to_string();
        if !params.regions.iter().any(|code| *code == region) {
            return false;
        }
    }
    if let Some(filter) = params.drug_type {
        let keep = match filter {
            DrugTypeFilter::All => true,
            DrugTypeFilter::Brand => record.drug_type == DrugType::Brand,
            DrugTypeFilter::Generic => record.drug_type == DrugType::Generic,
        };
        if !keep {
            return false;
        }
    }
    if !params.age_groups.is_empty() && !params.age_groups.contains(&record.age) {
        return false;
    }
    if !params.gender.is_empty() && !params.gender.contains(&record.gender) {
        return false;
    }
    if params.start_date.is_some() || params.end_date.is_some() {
        // Records with unparseable dates pass through untouched.
        if let Ok(date) = NaiveDate::parse_from_str(&record.date, "%Y-%m-%d") {
            if params.start_date.is_some_and(|start| date < start) {
                return false;
            }
            if params.end_date.is_some_and(|end| date > end) {
                return false;
            }
        }
    }
    true
}

/// The in-memory sales dataset served until the live query layer replaces it.
pub fn sample_sales() -> Vec<SalesRecord> {
    vec![
        SalesRecord {
            id: "1".to_string(),
            beneficiary_region: 5,
            gender: 1,
            age: 20,
            generic_number: 813,
            total_boxes: 3718,
            regions: HashMap::from([
                ("1".to_string(), 3072),
                ("2".to_string(), 0),
                ("3".to_string(), 33),
                ("35".to_string(), 35),
                ("42".to_string(), 467),
                ("99".to_string(), 111),
            ]),
            company: "Sanofi".to_string(),
            drug_name: "Doliprane".to_string(),
            drug_type: DrugType::Brand,
            revenue: 185_900.0,
            date: "2024-01-15".to_string(),
            growth: None,
            prescriber: None,
            volume_share: None,
            region: None,
        },
        SalesRecord {
            id: "2".to_string(),
            beneficiary_region: 5,
            gender: 1,
            age: 20,
            generic_number: 814,
            total_boxes: 9625,
            regions: HashMap::from([
                ("1".to_string(), 8009),
                ("2".to_string(), 0),
                ("3".to_string(), 148),
                ("35".to_string(), 68),
                ("42".to_string(), 1087),
                ("99".to_string(), 313),
            ]),
            company: "Pfizer".to_string(),
            drug_name: "Generic Paracetamol".to_string(),
            drug_type: DrugType::Generic,
            revenue: 481_250.0,
            date: "2024-01-16".to_string(),
            growth: None,
            prescriber: None,
            volume_share: None,
            region: None,
        },
    ]
}

pub fn sample_kpis() -> KpiData {
    KpiData {
        total_revenue: 45_600_000.0,
        revenue_change: 12.5,
        total_units: 2_340_000,
        units_change: 8.7,
        generic_ratio: 34.2,
        generic_ratio_change: -2.1,
        active_companies: 45,
        companies_change: 5.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drug_type_filter_selects_matching_records() {
        let records = sample_sales();
        let params = SalesParams {
            drug_type: Some(DrugTypeFilter::Generic),
            ..SalesParams::default()
        };
        let filtered = filter_sales(&records, &params);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].company, "Pfizer");

        let all = filter_sales(
            &records,
            &SalesParams {
                drug_type: Some(DrugTypeFilter::All),
                ..SalesParams::default()
            },
        );
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn company_and_date_filters_combine() {
        let records = sample_sales();
        let params = SalesParams {
            companies: vec!["Sanofi".to_string()],
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 15),
            ..SalesParams::default()
        };
        let filtered = filter_sales(&records, &params);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "1");
    }

    #[test]
    fn limit_and_offset_window_the_result() {
        let records = sample_sales();
        let windowed = filter_sales(
            &records,
            &SalesParams {
                offset: Some(1),
                limit: Some(5),
                ..SalesParams::default()
            },
        );
        assert_eq!(windowed.len(), 1);
        assert_eq!(windowed[0].id, "2");

        let capped = filter_sales(
            &records,
            &SalesParams {
                limit: Some(1),
                ..SalesParams::default()
            },
        );
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].id, "1");
    }

    #[test]
    fn unknown_region_filter_matches_nothing() {
        let records = sample_sales();
        let params = SalesParams {
            regions: vec!["93".to_string()],
            ..SalesParams::default()
        };
        assert!(filter_sales(&records, &params).is_empty());
    }
}
