//! Testing utilities and mock implementations.
//!
//! Mocks of the analyzer-facing traits, so the coordinator and the HTTP
//! layer can be exercised without a running analysis service.
//!
//! # Example
//!
//! ```rust,ignore
//! use triage_core::testing::{fixtures, MockClassifier};
//!
//! let classifier = Arc::new(MockClassifier::new());
//! classifier.push_result(Ok(fixtures::classification(Priority::Low))).await;
//! let coordinator = BatchCoordinator::new(classifier.clone(), Arc::new(Session::new()));
//! ```

mod mock_classifier;
mod mock_recommender;

pub use mock_classifier::{MockClassifier, RecordedClassification};
pub use mock_recommender::{MockRecommender, RecordedRecommendation};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::collections::BTreeMap;

    use crate::classifier::{ClassificationError, ClassificationResult, Priority, Recommendation};

    /// A classification whose score map favours `priority`.
    pub fn classification(priority: Priority) -> ClassificationResult {
        let label = priority.as_str().to_string();
        ClassificationResult {
            priority,
            confidence: 0.9,
            priority_scores: BTreeMap::from([(label, 0.9)]),
        }
    }

    /// An analyzer HTTP failure with the given status.
    pub fn http_error(status: u16) -> ClassificationError {
        ClassificationError::Http {
            status,
            message: "mock analyzer failure".to_string(),
        }
    }

    pub fn recommendation(title: &str, score: f64) -> Recommendation {
        Recommendation {
            title: Some(title.to_string()),
            score,
            snippet: Some(format!("How to: {}", title.to_lowercase())),
            orig_id: None,
        }
    }

    /// Three tickets separated by horizontal rules.
    pub const THREE_TICKET_UPLOAD: &str =
        "Ticket A body\n---\nTicket B body\n---\nTicket C body";
}
