//! Sequential batch runner.
//!
//! Tickets are classified one at a time, in input order. A failed item is
//! logged and dropped; the batch always continues with the next item.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::classifier::{ClassificationError, Classifier};
use crate::ingest::RawUpload;
use crate::metrics::{BATCHES_COMPLETED, BATCH_DURATION, BATCH_ITEM_FAILURES};
use crate::session::Session;
use crate::ticket::TicketRecord;

use super::types::{
    BatchError, BatchOutcome, BatchProgress, BatchState, ItemFailure, ProgressCallback,
    RecordCallback, StateCallback,
};

/// Drives batches of tickets through a [`Classifier`] into a [`Session`].
pub struct BatchCoordinator {
    classifier: Arc<dyn Classifier>,
    session: Arc<Session>,
    /// Held for the duration of a batch or single submission.
    run_lock: Mutex<()>,
    state: RwLock<BatchState>,
    progress_callback: Option<ProgressCallback>,
    record_callback: Option<RecordCallback>,
    state_callback: Option<StateCallback>,
}

impl BatchCoordinator {
    pub fn new(classifier: Arc<dyn Classifier>, session: Arc<Session>) -> Self {
        Self {
            classifier,
            session,
            run_lock: Mutex::new(()),
            state: RwLock::new(BatchState::Idle),
            progress_callback: None,
            record_callback: None,
            state_callback: None,
        }
    }

    /// Observe `BatchProgress` after every item.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Observe every ticket as soon as it is recorded.
    pub fn with_record_callback(mut self, callback: RecordCallback) -> Self {
        self.record_callback = Some(callback);
        self
    }

    /// Observe `Running` and `Done` transitions.
    pub fn with_state_callback(mut self, callback: StateCallback) -> Self {
        self.state_callback = Some(callback);
        self
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub async fn state(&self) -> BatchState {
        *self.state.read().await
    }

    /// Split an upload and run the resulting tickets as one batch.
    pub async fn run_upload(&self, upload: &RawUpload) -> Result<BatchOutcome, BatchError> {
        let tickets = upload.candidates();
        if tickets.is_empty() {
            debug!(filename = ?upload.filename(), "Upload contains no tickets");
            return Err(BatchError::EmptyBatch);
        }
        Ok(self.run_batch(tickets).await)
    }

    /// Classify `tickets` in order and record every success.
    ///
    /// Waits for any batch already in progress to finish first.
    pub async fn run_batch(&self, tickets: Vec<String>) -> BatchOutcome {
        let _guard = self.run_lock.lock().await;

        let batch_id = Uuid::new_v4().to_string();
        let total = tickets.len();
        let mut outcome = BatchOutcome {
            batch_id: batch_id.clone(),
            total,
            records: Vec::with_capacity(total),
            failures: Vec::new(),
        };
        if total == 0 {
            return outcome;
        }

        info!(batch_id = %batch_id, total = total, classifier = self.classifier.name(), "Batch started");
        let started = Instant::now();
        self.set_state(&batch_id, BatchState::Running { completed: 0, total })
            .await;

        for (index, ticket) in tickets.into_iter().enumerate() {
            match self.classify_and_record(&batch_id, ticket).await {
                Ok(record) => outcome.records.push(record),
                Err(e) => {
                    BATCH_ITEM_FAILURES.inc();
                    error!(
                        batch_id = %batch_id,
                        index = index,
                        error = %e,
                        "Ticket classification failed, continuing batch"
                    );
                    outcome.failures.push(ItemFailure::new(index, &e));
                }
            }

            let progress = BatchProgress {
                completed: index + 1,
                total,
            };
            self.set_state(
                &batch_id,
                BatchState::Running {
                    completed: progress.completed,
                    total,
                },
            )
            .await;
            if let Some(ref callback) = self.progress_callback {
                callback(&batch_id, progress);
            }
        }

        let label = if outcome.failures.is_empty() {
            "complete"
        } else if outcome.records.is_empty() {
            "failed"
        } else {
            "partial"
        };
        BATCH_DURATION
            .with_label_values(&[label])
            .observe(started.elapsed().as_secs_f64());
        BATCHES_COMPLETED.inc();

        self.set_state(
            &batch_id,
            BatchState::Done {
                succeeded: outcome.records.len(),
                failed: outcome.failures.len(),
            },
        )
        .await;
        info!(
            batch_id = %batch_id,
            succeeded = outcome.records.len(),
            failed = outcome.failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Batch finished"
        );

        outcome
    }

    /// Classify a single ticket outside any batch.
    ///
    /// Side effects match a one-item batch, but the classification error is
    /// returned instead of being absorbed.
    pub async fn submit_single(&self, ticket: &str) -> Result<TicketRecord, ClassificationError> {
        let _guard = self.run_lock.lock().await;
        self.classify_and_record("single", ticket.trim().to_string())
            .await
    }

    async fn classify_and_record(
        &self,
        batch_id: &str,
        ticket: String,
    ) -> Result<TicketRecord, ClassificationError> {
        let result = self.classifier.classify(&ticket).await?;
        let record = self.session.record(ticket, result).await;
        if let Some(ref callback) = self.record_callback {
            callback(batch_id, &record);
        }
        Ok(record)
    }

    async fn set_state(&self, batch_id: &str, state: BatchState) {
        *self.state.write().await = state;
        if let Some(ref callback) = self.state_callback {
            callback(batch_id, state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Priority;
    use crate::testing::{fixtures, MockClassifier};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    fn coordinator(classifier: Arc<MockClassifier>) -> BatchCoordinator {
        BatchCoordinator::new(classifier, Arc::new(Session::new()))
    }

    fn tickets(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_middle_failure_is_isolated() {
        let classifier = Arc::new(MockClassifier::new());
        classifier
            .push_results(vec![
                Ok(fixtures::classification(Priority::High)),
                Err(fixtures::http_error(500)),
                Ok(fixtures::classification(Priority::Low)),
            ])
            .await;

        let progress = Arc::new(StdMutex::new(Vec::new()));
        let seen = progress.clone();
        let coordinator = coordinator(classifier.clone()).with_progress_callback(Arc::new(
            move |_: &str, p: BatchProgress| seen.lock().unwrap().push(p.completed),
        ));

        let outcome = coordinator
            .run_batch(tickets(&["one", "two", "three"]))
            .await;

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].content, "one");
        assert_eq!(outcome.records[1].content, "three");
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].index, 1);
        assert_eq!(outcome.failures[0].status, Some(500));

        assert_eq!(*progress.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(classifier.call_count().await, 3);
        assert_eq!(coordinator.session().stats().await.total_tickets, 2);
    }

    #[tokio::test]
    async fn test_progress_reaches_total_exactly_once() {
        let classifier = Arc::new(MockClassifier::new());
        let totals = Arc::new(StdMutex::new(0));
        let seen = totals.clone();
        let coordinator = coordinator(classifier).with_progress_callback(Arc::new(move |_: &str, p: BatchProgress| {
            if p.is_finished() {
                *seen.lock().unwrap() += 1;
            }
        }));

        coordinator.run_batch(tickets(&["a", "b", "c", "d"])).await;
        assert_eq!(*totals.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_records_visible_before_batch_ends() {
        let classifier = Arc::new(MockClassifier::new());
        let session = Arc::new(Session::new());
        let observed = Arc::new(StdMutex::new(Vec::new()));
        let seen = observed.clone();
        let coordinator = BatchCoordinator::new(classifier, session.clone())
            .with_record_callback(Arc::new(move |_: &str, record: &TicketRecord| {
                seen.lock().unwrap().push(record.id.clone())
            }));

        let outcome = coordinator.run_batch(tickets(&["a", "b"])).await;
        let ids: Vec<String> = outcome.records.iter().map(|r| r.id.clone()).collect();
        assert_eq!(*observed.lock().unwrap(), ids);

        // Ticket list is most-recent-first.
        let listed: Vec<String> = session.tickets().await.into_iter().map(|r| r.id).collect();
        assert_eq!(listed, vec![ids[1].clone(), ids[0].clone()]);
    }

    #[tokio::test]
    async fn test_state_transitions() {
        let classifier = Arc::new(MockClassifier::new());
        classifier
            .push_results(vec![
                Ok(fixtures::classification(Priority::High)),
                Err(ClassificationError::Timeout),
            ])
            .await;
        let states = Arc::new(StdMutex::new(Vec::new()));
        let seen = states.clone();
        let coordinator = coordinator(classifier)
            .with_state_callback(Arc::new(move |_: &str, s: BatchState| seen.lock().unwrap().push(s)));

        assert_eq!(coordinator.state().await, BatchState::Idle);
        coordinator.run_batch(tickets(&["a", "b"])).await;

        let states = states.lock().unwrap().clone();
        assert_eq!(
            states,
            vec![
                BatchState::Running {
                    completed: 0,
                    total: 2
                },
                BatchState::Running {
                    completed: 1,
                    total: 2
                },
                BatchState::Running {
                    completed: 2,
                    total: 2
                },
                BatchState::Done {
                    succeeded: 1,
                    failed: 1
                },
            ]
        );
        assert_eq!(
            coordinator.state().await,
            BatchState::Done {
                succeeded: 1,
                failed: 1
            }
        );
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_calls() {
        let classifier = Arc::new(MockClassifier::new());
        let coordinator = coordinator(classifier.clone());

        let outcome = coordinator.run_batch(Vec::new()).await;
        assert_eq!(outcome.total, 0);
        assert!(outcome.records.is_empty());
        assert_eq!(classifier.call_count().await, 0);
        assert_eq!(coordinator.state().await, BatchState::Idle);
    }

    #[tokio::test]
    async fn test_run_upload_with_only_separators() {
        let classifier = Arc::new(MockClassifier::new());
        let coordinator = coordinator(classifier.clone());

        let result = coordinator
            .run_upload(&RawUpload::from_text("---\n---\n"))
            .await;
        assert_eq!(result.unwrap_err(), BatchError::EmptyBatch);
        assert_eq!(classifier.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_submit_single_returns_error() {
        let classifier = Arc::new(MockClassifier::new());
        classifier.push_result(Err(fixtures::http_error(503))).await;
        let coordinator = coordinator(classifier);

        let err = coordinator.submit_single("printer on fire").await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(coordinator.session().ticket_count().await, 0);

        let record = coordinator.submit_single("  printer on fire  ").await.unwrap();
        assert_eq!(record.content, "printer on fire");
        assert_eq!(coordinator.session().ticket_count().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_batches_never_overlap() {
        let classifier = Arc::new(MockClassifier::new().with_delay(Duration::from_millis(20)));
        let coordinator = Arc::new(coordinator(classifier.clone()));

        let first = {
            let c = coordinator.clone();
            tokio::spawn(async move { c.run_batch(tickets(&["a1", "a2", "a3"])).await })
        };
        let second = {
            let c = coordinator.clone();
            tokio::spawn(async move { c.run_batch(tickets(&["b1", "b2", "b3"])).await })
        };
        first.await.unwrap();
        second.await.unwrap();

        assert_eq!(classifier.max_in_flight(), 1);
        let calls = classifier.recorded_calls().await;
        assert_eq!(calls.len(), 6);
        // Each batch's items are contiguous.
        let prefixes: Vec<char> = calls.iter().map(|c| c.ticket.chars().next().unwrap()).collect();
        assert!(prefixes[..3].iter().all(|p| *p == prefixes[0]));
        assert!(prefixes[3..].iter().all(|p| *p == prefixes[3]));
    }
}
