//! Types for talking to the ticket analysis service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Priority label assigned by the analyzer.
///
/// Labels are normalized to lowercase. Anything outside the known set is kept
/// verbatim so it can still be counted under its own name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    High,
    Medium,
    Low,
    Unknown,
    Other(String),
}

impl Priority {
    pub fn parse(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "high" => Priority::High,
            "medium" => Priority::Medium,
            "low" => Priority::Low,
            "" | "unknown" => Priority::Unknown,
            _ => Priority::Other(label),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
            Priority::Unknown => "unknown",
            Priority::Other(label) => label,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Priority {
    fn from(label: String) -> Self {
        Priority::parse(&label)
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        priority.as_str().to_string()
    }
}

/// Outcome of classifying one ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub priority: Priority,
    /// Analyzer certainty in `[0, 1]`.
    pub confidence: f64,
    /// Score per priority label, as reported.
    pub priority_scores: BTreeMap<String, f64>,
}

impl ClassificationResult {
    /// Build a result from an `/analyze` response body.
    ///
    /// Missing or mistyped fields fall back to `unknown`, `0` and an empty map.
    /// The second element names the fields that were defaulted.
    pub fn from_response(body: &Value) -> (Self, Vec<&'static str>) {
        let mut defaulted = Vec::new();

        let priority = match body.get("priority").and_then(Value::as_str) {
            Some(label) if !label.trim().is_empty() => Priority::parse(label),
            _ => {
                defaulted.push("priority");
                Priority::Unknown
            }
        };

        let confidence = match body.get("confidence").and_then(Value::as_f64) {
            Some(c) if c.is_finite() => c.clamp(0.0, 1.0),
            _ => {
                defaulted.push("confidence");
                0.0
            }
        };

        let priority_scores = match body.get("priority_scores").and_then(Value::as_object) {
            Some(scores) => scores
                .iter()
                .filter_map(|(label, score)| score.as_f64().map(|s| (label.clone(), s)))
                .collect(),
            None => {
                defaulted.push("priority_scores");
                BTreeMap::new()
            }
        };

        (
            Self {
                priority,
                confidence,
                priority_scores,
            },
            defaulted,
        )
    }
}

/// A knowledge-base article suggested for a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub snippet: Option<String>,
    /// Identifier of the source ticket/article, when the index has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orig_id: Option<Value>,
}

/// Hard failure of an `/analyze` call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClassificationError {
    #[error("Analyzer returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Analyzer request failed: {0}")]
    Transport(String),

    #[error("Analyzer request timed out")]
    Timeout,

    #[error("Invalid analyzer response: {0}")]
    InvalidBody(String),
}

impl ClassificationError {
    /// HTTP status, if the analyzer answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClassificationError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure of a `/recommend` call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecommendationError {
    #[error("Recommendation service returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Recommendation request failed: {0}")]
    Transport(String),

    #[error("Recommendation request timed out")]
    Timeout,

    #[error("Recommendations unavailable: {0}")]
    Service(String),

    #[error("Invalid recommendation response: {0}")]
    InvalidBody(String),
}

/// Something that can assign a priority to ticket text.
///
/// One call is one round trip; implementations must not retry internally.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Name of this classifier for logging.
    fn name(&self) -> &str;

    async fn classify(&self, ticket: &str) -> Result<ClassificationResult, ClassificationError>;
}

/// Something that can suggest articles for ticket text.
#[async_trait]
pub trait Recommender: Send + Sync {
    async fn recommend(
        &self,
        ticket: &str,
        top_k: u32,
    ) -> Result<Vec<Recommendation>, RecommendationError>;
}
