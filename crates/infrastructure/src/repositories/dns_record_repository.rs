use async_trait::async_trait;
use capdns_application::ports::RecordStore;
use capdns_domain::{DnsRecord, DomainError};
use sqlx::SqlitePool;
use tracing::debug;

// SQLite is limited to 999 bound parameters per statement.
const COLS_PER_ROW: usize = 14;
const ROWS_PER_CHUNK: usize = 999 / COLS_PER_ROW;

pub struct SqliteDnsRecordRepository {
    pool: SqlitePool,
}

impl SqliteDnsRecordRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn build_multi_insert_sql(n: usize) -> String {
    debug_assert!(n > 0 && n <= ROWS_PER_CHUNK);
    const HEADER: &str = "INSERT INTO dns_records \
        (node, time, requester_ip, responder_ip, authoritative, truncated, \
         recursion_desired, recursion_available, response_code, question, \
         dnssec, answer_count, authority_count, additional_count) \
        VALUES ";
    const PLACEHOLDER: &str = "(?,?,?,?,?,?,?,?,?,?,?,?,?,?)";
    let mut sql = String::with_capacity(HEADER.len() + n * (PLACEHOLDER.len() + 1));
    sql.push_str(HEADER);
    for i in 0..n {
        if i > 0 {
            sql.push(',');
        }
        sql.push_str(PLACEHOLDER);
    }
    sql
}

#[async_trait]
impl RecordStore for SqliteDnsRecordRepository {
    async fn insert_batch(&self, records: &[DnsRecord]) -> Result<u64, DomainError> {
        if records.is_empty() {
            return Ok(0);
        }

        let start = std::time::Instant::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        let mut inserted = 0u64;
        for chunk in records.chunks(ROWS_PER_CHUNK) {
            let sql = build_multi_insert_sql(chunk.len());
            let mut q = sqlx::query(&sql);
            for record in chunk {
                let question = serde_json::to_string(&record.questions)
                    .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
                q = q
                    .bind(record.node.as_str())
                    .bind(record.time.to_rfc3339())
                    .bind(record.requester_ip.to_string())
                    .bind(record.responder_ip.to_string())
                    .bind(record.flags.authoritative as i64)
                    .bind(record.flags.truncated as i64)
                    .bind(record.flags.recursion_desired as i64)
                    .bind(record.flags.recursion_available as i64)
                    .bind(record.flags.response_code as i64)
                    .bind(question)
                    .bind(record.dnssec as i64)
                    .bind(record.answer_count as i64)
                    .bind(record.authority_count as i64)
                    .bind(record.additional_count as i64);
            }
            let result = q
                .execute(&mut *tx)
                .await
                .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
            inserted += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        debug!(
            count = inserted,
            duration_ms = start.elapsed().as_millis() as u64,
            "Record batch committed"
        );

        Ok(inserted)
    }
}
