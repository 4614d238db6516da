use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::classifier::ClassificationError;
use crate::ticket::TicketRecord;

/// Progress of the batch currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
}

impl BatchProgress {
    pub fn is_finished(&self) -> bool {
        self.completed >= self.total
    }

    /// Completion in percent, `0..=100`.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}

/// Coordinator lifecycle. There is no cancelled state; a started batch
/// always runs to `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BatchState {
    Idle,
    Running { completed: usize, total: usize },
    Done { succeeded: usize, failed: usize },
}

/// A batch item whose classification failed and was dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemFailure {
    /// Zero-based position in the batch input.
    pub index: usize,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ItemFailure {
    pub fn new(index: usize, error: &ClassificationError) -> Self {
        Self {
            index,
            error: error.to_string(),
            status: error.status(),
        }
    }
}

/// Everything a finished batch produced.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub batch_id: String,
    pub total: usize,
    /// Successful records, in input order.
    pub records: Vec<TicketRecord>,
    pub failures: Vec<ItemFailure>,
}

impl BatchOutcome {
    pub fn summary(&self) -> BatchSummary {
        BatchSummary::from_records(&self.records)
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Per-priority tally of a batch's successful records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub by_priority: BTreeMap<String, usize>,
}

impl BatchSummary {
    pub fn from_records(records: &[TicketRecord]) -> Self {
        let mut by_priority = BTreeMap::new();
        for record in records {
            *by_priority
                .entry(record.priority.as_str().to_lowercase())
                .or_insert(0) += 1;
        }
        Self {
            processed: records.len(),
            by_priority,
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Successfully processed {} tickets", self.processed)?;
        if !self.by_priority.is_empty() {
            let parts: Vec<String> = self
                .by_priority
                .iter()
                .map(|(priority, count)| format!("{} {} priority", count, priority))
                .collect();
            write!(f, ": {}", parts.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("Nothing to submit: no tickets found in input")]
    EmptyBatch,
}

/// Called after every batch item, success or failure.
pub type ProgressCallback = std::sync::Arc<dyn Fn(&str, BatchProgress) + Send + Sync>;

/// Called once per successfully recorded ticket.
pub type RecordCallback = std::sync::Arc<dyn Fn(&str, &TicketRecord) + Send + Sync>;

/// Called on every state transition.
pub type StateCallback = std::sync::Arc<dyn Fn(&str, BatchState) + Send + Sync>;
