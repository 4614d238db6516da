//! Mock classifier for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::classifier::{ClassificationError, ClassificationResult, Classifier, Priority};

/// A recorded classification call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedClassification {
    /// Ticket text as received.
    pub ticket: String,
    /// When the call was made.
    pub timestamp: Instant,
}

type ClassifyOutcome = Result<ClassificationResult, ClassificationError>;

/// Produces an outcome from the ticket text, or `None` to fall through.
type TicketHandler = Box<dyn Fn(&str) -> Option<ClassifyOutcome> + Send + Sync>;

/// Mock implementation of the Classifier trait.
///
/// Outcomes are taken in order from a script queue, then from the ticket
/// handler, then the default result. Every call is recorded.
///
/// # Example
///
/// ```rust,ignore
/// use triage_core::testing::{fixtures, MockClassifier};
///
/// let classifier = MockClassifier::new();
/// classifier.push_results(vec![
///     Ok(fixtures::classification(Priority::High)),
///     Err(fixtures::http_error(500)),
/// ]).await;
///
/// let outcome = coordinator.run_batch(tickets).await;
/// assert_eq!(classifier.call_count().await, 2);
/// ```
pub struct MockClassifier {
    script: Arc<RwLock<VecDeque<ClassifyOutcome>>>,
    default_result: Arc<RwLock<ClassificationResult>>,
    handler: Arc<RwLock<Option<TicketHandler>>>,
    calls: Arc<RwLock<Vec<RecordedClassification>>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl std::fmt::Debug for MockClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockClassifier")
            .field("script", &"<script>")
            .field("handler", &"<handler>")
            .field("delay", &self.delay)
            .finish()
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClassifier {
    /// Create a mock that classifies everything as medium priority.
    pub fn new() -> Self {
        Self {
            script: Arc::new(RwLock::new(VecDeque::new())),
            default_result: Arc::new(RwLock::new(super::fixtures::classification(
                Priority::Medium,
            ))),
            handler: Arc::new(RwLock::new(None)),
            calls: Arc::new(RwLock::new(Vec::new())),
            delay: None,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Sleep this long inside every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Result returned once the script is exhausted.
    pub async fn set_default(&self, result: ClassificationResult) {
        *self.default_result.write().await = result;
    }

    /// Queue one outcome.
    pub async fn push_result(&self, outcome: ClassifyOutcome) {
        self.script.write().await.push_back(outcome);
    }

    /// Queue outcomes for the next calls, in order.
    pub async fn push_results(&self, outcomes: Vec<ClassifyOutcome>) {
        self.script.write().await.extend(outcomes);
    }

    /// Decide outcomes from the ticket text.
    pub async fn set_handler<F>(&self, handler: F)
    where
        F: Fn(&str) -> Option<ClassifyOutcome> + Send + Sync + 'static,
    {
        *self.handler.write().await = Some(Box::new(handler));
    }

    pub async fn recorded_calls(&self) -> Vec<RecordedClassification> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    pub async fn clear_recorded(&self) {
        self.calls.write().await.clear();
    }

    /// Highest number of calls that were ever running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn next_outcome(&self, ticket: &str) -> ClassifyOutcome {
        if let Some(outcome) = self.script.write().await.pop_front() {
            return outcome;
        }
        if let Some(ref handler) = *self.handler.read().await {
            if let Some(outcome) = handler(ticket) {
                return outcome;
            }
        }
        Ok(self.default_result.read().await.clone())
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    fn name(&self) -> &str {
        "mock"
    }

    async fn classify(&self, ticket: &str) -> Result<ClassificationResult, ClassificationError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        self.calls.write().await.push(RecordedClassification {
            ticket: ticket.to_string(),
            timestamp: Instant::now(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = self.next_outcome(ticket).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}
