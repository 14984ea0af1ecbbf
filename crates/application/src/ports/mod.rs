mod processed_file_store;
mod record_store;

pub use processed_file_store::ProcessedFileStore;
pub use record_store::RecordStore;
