pub mod analytics;
pub mod sales;

pub use analytics::{ExecuteQueryParams, ExecuteQueryResponse, MetricsRecord, UnifiedRecord};
pub use sales::{DrugType, DrugTypeFilter, KpiData, SalesParams, SalesRecord};
