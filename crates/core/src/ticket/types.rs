use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::classifier::{ClassificationResult, Priority};

/// A successfully classified ticket. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketRecord {
    /// Locally generated, unique within the session.
    pub id: String,
    pub content: String,
    pub priority: Priority,
    pub confidence: f64,
    pub priority_scores: BTreeMap<String, f64>,
    /// When classification succeeded.
    pub created_at: DateTime<Utc>,
}

impl TicketRecord {
    pub fn new(id: String, content: String, result: ClassificationResult) -> Self {
        Self {
            id,
            content,
            priority: result.priority,
            confidence: result.confidence,
            priority_scores: result.priority_scores,
            created_at: Utc::now(),
        }
    }
}
