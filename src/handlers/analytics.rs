use axum::{Json, extract::State};
use axum_extra::extract::Query;

use crate::error::InsightError;
use crate::router::InsightState;
use crate::service::query_exec::run_product_comparison;
use crate::types::{ExecuteQueryParams, ExecuteQueryResponse};

pub async fn execute_query_handler(
    State(state): State<InsightState>,
    Query(params): Query<ExecuteQueryParams>,
) -> Result<Json<ExecuteQueryResponse>, InsightError> {
    let response = run_product_comparison(
        &state.config.azure_sql,
        &state.maps,
        &params.cip_list,
        &params.gen_list,
    )
    .await?;
    Ok(Json(response))
}
