use capdns_domain::config::DatabaseConfig;
use capdns_infrastructure::database::{create_pool, init_schema};
use sqlx::SqlitePool;
use tracing::{error, info};

/// Open the datastore and make sure the schema exists before any worker
/// connects.
pub async fn init_database(cfg: &DatabaseConfig) -> anyhow::Result<SqlitePool> {
    info!("Initializing datastore: {}", cfg.url());

    let pool = create_pool(&cfg.url(), cfg).await.map_err(|e| {
        error!("Failed to open datastore: {}", e);
        anyhow::anyhow!(e)
    })?;

    init_schema(&pool).await.map_err(|e| {
        error!("Failed to initialize datastore schema: {}", e);
        anyhow::anyhow!(e)
    })?;

    info!("Datastore ready (max_connections={})", cfg.max_connections);
    Ok(pool)
}
