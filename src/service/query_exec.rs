use crate::config::AzureSqlConfig;
use crate::db::{AzureSqlConnection, ProductColumn};
use crate::error::InsightError;
use crate::service::comparison::compare_brand_generic;
use crate::service::reference_maps::ReferenceMaps;
use crate::service::usage::{ProductKind, aggregate_usage, to_unified_records};
use crate::types::ExecuteQueryResponse;
use tracing::debug;

/// Run the brand (CIP13) and generic (GEN_NUM) usage queries, aggregate each
/// side, and build the full comparison payload.
pub async fn run_product_comparison(
    cfg: &AzureSqlConfig,
    maps: &ReferenceMaps,
    cip_list: &[String],
    gen_list: &[String],
) -> Result<ExecuteQueryResponse, InsightError> {
    let conn = AzureSqlConnection::new(cfg);

    let brand_rows = conn.query_usage_rows(ProductColumn::Cip13, cip_list).await?;
    let generic_rows = conn.query_usage_rows(ProductColumn::GenNum, gen_list).await?;
    debug!(
        brand_rows = brand_rows.len(),
        generic_rows = generic_rows.len(),
        "usage rows fetched"
    );

    let brand = aggregate_usage(brand_rows);
    let generic = aggregate_usage(generic_rows);

    let metrics = compare_brand_generic(&brand, &generic, maps);
    Ok(ExecuteQueryResponse {
        unified_df: to_unified_records(&brand, ProductKind::Brand, maps),
        unified_df_gen: to_unified_records(&generic, ProductKind::Generic, maps),
        metrics,
    })
}
