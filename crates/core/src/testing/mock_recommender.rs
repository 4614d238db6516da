//! Mock recommender for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::classifier::{Recommendation, RecommendationError, Recommender};

/// A recorded recommendation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRecommendation {
    pub ticket: String,
    pub top_k: u32,
}

/// Mock implementation of the Recommender trait.
///
/// Returns the first `top_k` configured results, or the injected error once.
#[derive(Debug, Default, Clone)]
pub struct MockRecommender {
    results: Arc<RwLock<Vec<Recommendation>>>,
    next_error: Arc<RwLock<Option<RecommendationError>>>,
    requests: Arc<RwLock<Vec<RecordedRecommendation>>>,
}

impl MockRecommender {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_results(&self, results: Vec<Recommendation>) {
        *self.results.write().await = results;
    }

    /// Fail the next request with `error`.
    pub async fn set_next_error(&self, error: RecommendationError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn recorded_requests(&self) -> Vec<RecordedRecommendation> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl Recommender for MockRecommender {
    async fn recommend(
        &self,
        ticket: &str,
        top_k: u32,
    ) -> Result<Vec<Recommendation>, RecommendationError> {
        self.requests.write().await.push(RecordedRecommendation {
            ticket: ticket.to_string(),
            top_k,
        });

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        Ok(self
            .results
            .read()
            .await
            .iter()
            .take(top_k as usize)
            .cloned()
            .collect())
    }
}
