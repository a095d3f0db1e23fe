pub mod generation;
pub mod report;

pub use generation::{GenerationWorker, WorkerSettings, GENERATION_METHOD};
pub use report::CycleReport;

pub use tokio_util::sync::CancellationToken;
