use async_trait::async_trait;
use capdns_application::ports::ProcessedFileStore;
use capdns_domain::DomainError;
use sqlx::SqlitePool;

/// Duplicate guard backed by the `processed_files` table. Inserts are
/// idempotent so concurrent workers racing on the same file name never
/// see an error, only at-most-once processing.
pub struct SqliteProcessedFileRepository {
    pool: SqlitePool,
}

impl SqliteProcessedFileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProcessedFileStore for SqliteProcessedFileRepository {
    async fn contains(&self, filename: &str) -> Result<bool, DomainError> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM processed_files WHERE filename = ?")
                .bind(filename)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        Ok(row.is_some())
    }

    async fn insert(&self, filename: &str) -> Result<(), DomainError> {
        sqlx::query("INSERT OR IGNORE INTO processed_files (filename) VALUES (?)")
            .bind(filename)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}
