use capdns_domain::config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

pub async fn create_pool(
    database_url: &str,
    cfg: &DatabaseConfig,
) -> Result<SqlitePool, sqlx::Error> {
    // Every worker's pool bulk-writes the same file concurrently.
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(30));

    SqlitePoolOptions::new()
        .max_connections(cfg.max_connections)
        .connect_with(options)
        .await
}

/// Create the record and processed-file tables plus the indexes the
/// aggregation queries rely on (time, node, requester). Idempotent; run
/// once from the bootstrap before any worker connects.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS dns_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            node TEXT NOT NULL,
            time TEXT NOT NULL,
            requester_ip TEXT NOT NULL,
            responder_ip TEXT NOT NULL,
            authoritative INTEGER NOT NULL,
            truncated INTEGER NOT NULL,
            recursion_desired INTEGER NOT NULL,
            recursion_available INTEGER NOT NULL,
            response_code INTEGER NOT NULL,
            question TEXT NOT NULL,
            dnssec INTEGER NOT NULL,
            answer_count INTEGER NOT NULL,
            authority_count INTEGER NOT NULL,
            additional_count INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS processed_files (
            filename TEXT PRIMARY KEY
        )
        "#,
    )
    .execute(pool)
    .await?;

    for sql in [
        "CREATE INDEX IF NOT EXISTS idx_dns_records_time ON dns_records(time)",
        "CREATE INDEX IF NOT EXISTS idx_dns_records_node ON dns_records(node)",
        "CREATE INDEX IF NOT EXISTS idx_dns_records_requester ON dns_records(requester_ip)",
    ] {
        sqlx::query(sql).execute(pool).await?;
    }

    Ok(())
}
