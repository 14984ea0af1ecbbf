pub mod dns_record_repository;
pub mod processed_file_repository;

pub use dns_record_repository::SqliteDnsRecordRepository;
pub use processed_file_repository::SqliteProcessedFileRepository;
