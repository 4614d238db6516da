//! Batch ingestion: sequential classification with per-item failure isolation.

mod coordinator;
mod types;

pub use coordinator::BatchCoordinator;
pub use types::{
    BatchError, BatchOutcome, BatchProgress, BatchState, BatchSummary, ItemFailure,
    ProgressCallback, RecordCallback, StateCallback,
};
