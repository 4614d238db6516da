//! HTTP client for the ticket analysis service.

use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::{AnalyzerConfig, ConfigError};
use crate::metrics::{CLASSIFICATIONS_TOTAL, CLASSIFICATION_DURATION, RECOMMENDATIONS_TOTAL};

use super::{
    AnalyzerEndpoints, ClassificationError, ClassificationResult, Classifier, Recommendation,
    RecommendationError, Recommender,
};

/// Longest slice of an error body kept in error messages.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Client for `POST /analyze` and `POST /recommend`.
pub struct AnalyzerClient {
    client: Client,
    endpoints: AnalyzerEndpoints,
}

impl AnalyzerClient {
    /// Create a client for the origin resolved from `config`.
    pub fn new(config: &AnalyzerConfig) -> Result<Self, ConfigError> {
        let endpoints =
            AnalyzerEndpoints::from_origin(&config.origin()).map_err(ConfigError::ValidationError)?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            ConfigError::ValidationError(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self { client, endpoints })
    }

    pub fn endpoints(&self) -> &AnalyzerEndpoints {
        &self.endpoints
    }

    async fn post_analyze(
        &self,
        ticket: &str,
    ) -> Result<(ClassificationResult, Vec<&'static str>), ClassificationError> {
        let form = Form::new().text("ticket", ticket.to_string());

        let response = self
            .client
            .post(self.endpoints.analyze.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassificationError::Timeout
                } else {
                    ClassificationError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassificationError::Http {
                status: status.as_u16(),
                message: error_body(response).await,
            });
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ClassificationError::Timeout
            } else {
                ClassificationError::InvalidBody(e.to_string())
            }
        })?;
        let value: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|e| ClassificationError::InvalidBody(format!("not JSON: {}", e)))?;

        Ok(ClassificationResult::from_response(&value))
    }
}

#[async_trait]
impl Classifier for AnalyzerClient {
    fn name(&self) -> &str {
        "analyzer"
    }

    async fn classify(&self, ticket: &str) -> Result<ClassificationResult, ClassificationError> {
        let start = Instant::now();
        debug!(url = %self.endpoints.analyze, chars = ticket.len(), "Classifying ticket");

        let outcome = self.post_analyze(ticket).await;
        CLASSIFICATION_DURATION.observe(start.elapsed().as_secs_f64());

        match outcome {
            Ok((result, defaulted)) => {
                if defaulted.is_empty() {
                    CLASSIFICATIONS_TOTAL.with_label_values(&["ok"]).inc();
                } else {
                    warn!(
                        fields = ?defaulted,
                        "Analyzer response incomplete, using defaults"
                    );
                    CLASSIFICATIONS_TOTAL.with_label_values(&["degraded"]).inc();
                }
                debug!(
                    priority = %result.priority,
                    confidence = result.confidence,
                    "Ticket classified"
                );
                Ok(result)
            }
            Err(e) => {
                CLASSIFICATIONS_TOTAL.with_label_values(&["failed"]).inc();
                Err(e)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecommendResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    results: Option<Vec<Recommendation>>,
    #[serde(default)]
    error: Option<String>,
}

#[async_trait]
impl Recommender for AnalyzerClient {
    async fn recommend(
        &self,
        ticket: &str,
        top_k: u32,
    ) -> Result<Vec<Recommendation>, RecommendationError> {
        // Older analyzer builds read top_k from the query string, newer ones
        // from the form. Send both.
        let mut url = self.endpoints.recommend.clone();
        url.query_pairs_mut()
            .append_pair("top_k", &top_k.to_string());
        let form = Form::new()
            .text("ticket", ticket.to_string())
            .text("top_k", top_k.to_string());

        debug!(url = %url, top_k = top_k, "Requesting recommendations");

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                RECOMMENDATIONS_TOTAL.with_label_values(&["failed"]).inc();
                if e.is_timeout() {
                    RecommendationError::Timeout
                } else {
                    RecommendationError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            RECOMMENDATIONS_TOTAL.with_label_values(&["failed"]).inc();
            return Err(RecommendationError::Http {
                status: status.as_u16(),
                message: error_body(response).await,
            });
        }

        let body: RecommendResponse = response.json().await.map_err(|e| {
            RECOMMENDATIONS_TOTAL.with_label_values(&["failed"]).inc();
            RecommendationError::InvalidBody(e.to_string())
        })?;

        if !body.ok {
            RECOMMENDATIONS_TOTAL
                .with_label_values(&["unavailable"])
                .inc();
            return Err(RecommendationError::Service(
                body.error
                    .unwrap_or_else(|| "no reason given".to_string()),
            ));
        }

        RECOMMENDATIONS_TOTAL.with_label_values(&["ok"]).inc();
        Ok(body.results.unwrap_or_default())
    }
}

/// Read a failed response's body for diagnostics.
async fn error_body(response: Response) -> String {
    let body = response.text().await.unwrap_or_default();
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}
