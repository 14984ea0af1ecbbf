//! capdns Ingestion Layer: the dispatcher and its capture workers.
pub mod dispatcher;
pub mod protocol;
pub mod worker;

pub use dispatcher::Dispatcher;
pub use protocol::{WorkerCommand, WorkerEvent};
pub use worker::{CaptureWorker, WorkerConfig};
