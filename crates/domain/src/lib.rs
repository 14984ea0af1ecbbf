//! capdns Domain Layer
pub mod config;
pub mod dns_record;
pub mod errors;
pub mod job;
pub mod region;
pub mod stats;

pub use config::{CliOverrides, Config};
pub use dns_record::{DnsRecord, HeaderFlags, Question};
pub use errors::DomainError;
pub use job::{CaptureJob, CaptureName};
pub use region::{Region, RegionTable};
pub use stats::{AggregateStats, FileStats};
