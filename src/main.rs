use mimalloc::MiMalloc;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use pharma_insight::config::AppConfig;
use pharma_insight::db::AzureSqlConnection;
use pharma_insight::router;
use pharma_insight::service::reference_maps::ReferenceMaps;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();

    // Fail fast: no listener is created until the connection settings are
    // complete. The error names the missing variable, never its value.
    let cfg = match AppConfig::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            eprintln!("startup failed: {e}");
            return Err(e.into());
        }
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        server = %cfg.azure_sql.server,
        database = %cfg.azure_sql.database,
        username = %cfg.azure_sql.username,
        loglevel = %cfg.loglevel,
        data_dir = %cfg.data_dir.display(),
    );

    let maps = Arc::new(ReferenceMaps::load_from_dir(&cfg.data_dir)?);

    // Reachability probe only; request handlers open their own connections.
    AzureSqlConnection::new(&cfg.azure_sql).test_connection().await;

    let state = router::InsightState::new(cfg.clone(), maps);
    let app = router::insight_router(state);

    let addr = cfg.bind_addr();
    let listener = router::bind_listener(&addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
