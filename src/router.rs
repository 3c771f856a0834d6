use axum::{Router, routing::get};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::error::InsightError;
use crate::handlers::{analytics, sales};
use crate::service::reference_maps::ReferenceMaps;
use crate::types::{KpiData, SalesRecord};

/// Shared state for all routes. Everything is read-only after startup.
#[derive(Clone)]
pub struct InsightState {
    pub config: Arc<AppConfig>,
    pub maps: Arc<ReferenceMaps>,
    pub sales: Arc<Vec<SalesRecord>>,
    pub kpis: Arc<KpiData>,
}

impl InsightState {
    pub fn new(config: Arc<AppConfig>, maps: Arc<ReferenceMaps>) -> Self {
        Self {
            config,
            maps,
            sales: Arc::new(sales::sample_sales()),
            kpis: Arc::new(sales::sample_kpis()),
        }
    }
}

pub fn insight_router(state: InsightState) -> Router {
    Router::new()
        .route("/api/v1/sales", get(sales::sales_handler))
        .route("/api/v1/kpis", get(sales::kpis_handler))
        .route("/api/v1/sales/companies", get(sales::company_comparison_handler))
        .route("/api/v1/master/regions", get(sales::region_master_handler))
        .route("/api/v1/execute-query", get(analytics::execute_query_handler))
        .with_state(state)
}

/// Bind the service listener. A failure here (port in use, permission
/// denied) must abort startup with a non-zero exit.
pub async fn bind_listener(addr: &str) -> Result<TcpListener, InsightError> {
    TcpListener::bind(addr)
        .await
        .map_err(InsightError::ServiceStartup)
}
