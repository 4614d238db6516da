//! Batch lifecycle integration tests.
//!
//! These tests drive the whole ingestion path:
//! raw upload -> split -> sequential classification -> session state

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use httpmock::prelude::*;
use serde_json::json;

use triage_core::{
    batch::BatchProgress,
    classifier::Priority,
    config::AnalyzerConfig,
    stats::analytics,
    testing::{fixtures, MockClassifier},
    AnalyzerClient, BatchCoordinator, BatchError, RawUpload, Session,
};

/// Test helper wiring a coordinator to a fresh session.
struct TestHarness {
    classifier: Arc<MockClassifier>,
    session: Arc<Session>,
    progress: Arc<Mutex<Vec<BatchProgress>>>,
}

impl TestHarness {
    fn new() -> Self {
        Self {
            classifier: Arc::new(MockClassifier::new()),
            session: Arc::new(Session::new()),
            progress: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn coordinator(&self) -> BatchCoordinator {
        let progress = self.progress.clone();
        BatchCoordinator::new(self.classifier.clone(), self.session.clone()).with_progress_callback(
            Arc::new(move |_batch_id: &str, p: BatchProgress| {
                progress.lock().unwrap().push(p);
            }),
        )
    }
}

#[tokio::test]
async fn test_upload_end_to_end() {
    let harness = TestHarness::new();
    harness
        .classifier
        .push_results(vec![
            Ok(fixtures::classification(Priority::High)),
            Ok(fixtures::classification(Priority::Medium)),
            Ok(fixtures::classification(Priority::Low)),
        ])
        .await;
    let coordinator = harness.coordinator();

    let upload = tokio_test::assert_ok!(RawUpload::from_file(
        "tickets.txt",
        fixtures::THREE_TICKET_UPLOAD.as_bytes().to_vec(),
    ));
    let outcome = tokio_test::assert_ok!(coordinator.run_upload(&upload).await);

    let priorities: Vec<Priority> = outcome.records.iter().map(|r| r.priority.clone()).collect();
    assert_eq!(
        priorities,
        vec![Priority::High, Priority::Medium, Priority::Low]
    );
    let contents: Vec<&str> = outcome.records.iter().map(|r| r.content.as_str()).collect();
    assert_eq!(
        contents,
        vec!["Ticket A body", "Ticket B body", "Ticket C body"]
    );

    let stats = harness.session.stats().await;
    assert_eq!(
        stats.tickets_by_priority,
        BTreeMap::from([
            ("high".to_string(), 1),
            ("low".to_string(), 1),
            ("medium".to_string(), 1),
        ])
    );
    assert_eq!(stats.total_tickets, 3);
    assert_eq!(stats.latest_tickets[0].id, outcome.records[2].id);

    let summary = outcome.summary();
    assert_eq!(summary.processed, 3);

    let progress = harness.progress.lock().unwrap().clone();
    assert_eq!(progress.len(), 3);
    assert!(progress.iter().all(|p| p.total == 3));
    assert_eq!(progress.last().unwrap().completed, 3);
}

#[tokio::test]
async fn test_partial_failure_keeps_earlier_records() {
    let harness = TestHarness::new();
    harness
        .classifier
        .set_handler(|ticket| {
            if ticket.starts_with("Ticket B") {
                Some(Err(fixtures::http_error(502)))
            } else {
                None
            }
        })
        .await;
    let coordinator = harness.coordinator();

    let outcome = coordinator
        .run_upload(&RawUpload::from_text(fixtures::THREE_TICKET_UPLOAD))
        .await
        .unwrap();

    assert_eq!(outcome.total, 3);
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.records[0].content, "Ticket A body");
    assert_eq!(outcome.records[1].content, "Ticket C body");
    assert_eq!(outcome.failures[0].index, 1);
    assert!(!outcome.is_complete());

    assert_eq!(harness.session.ticket_count().await, 2);
    assert_eq!(harness.session.stats().await.total_tickets, 2);
    assert_eq!(harness.progress.lock().unwrap().last().unwrap().completed, 3);
}

#[tokio::test]
async fn test_every_item_failing_still_completes() {
    let harness = TestHarness::new();
    harness
        .classifier
        .set_handler(|_| Some(Err(fixtures::http_error(500))))
        .await;
    let coordinator = harness.coordinator();

    let outcome = coordinator
        .run_batch(vec!["one".to_string(), "two".to_string()])
        .await;

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.failures.len(), 2);
    assert_eq!(harness.progress.lock().unwrap().len(), 2);

    // Session stays usable.
    let record = coordinator.submit_single("three").await;
    assert!(record.is_err());
    harness.classifier.set_handler(|_| None).await;
    assert!(coordinator.submit_single("four").await.is_ok());
}

#[tokio::test]
async fn test_blank_paragraph_upload() {
    let harness = TestHarness::new();
    let coordinator = harness.coordinator();

    let outcome = coordinator
        .run_upload(&RawUpload::from_text(
            "VPN drops every hour\n\nPrinter out of toner\n\n  indented note",
        ))
        .await
        .unwrap();

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.records[0].content, "VPN drops every hour");
    assert!(outcome.records[1].content.ends_with("indented note"));
}

#[tokio::test]
async fn test_separator_only_upload_is_empty() {
    let harness = TestHarness::new();
    let coordinator = harness.coordinator();

    let err = coordinator
        .run_upload(&RawUpload::from_text("---\n---\n"))
        .await
        .unwrap_err();

    assert_eq!(err, BatchError::EmptyBatch);
    assert_eq!(harness.classifier.call_count().await, 0);
    assert!(harness.progress.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_analytics_follow_session() {
    let harness = TestHarness::new();
    harness
        .classifier
        .push_results(vec![
            Ok(fixtures::classification(Priority::High)),
            Ok(fixtures::classification(Priority::High)),
            Ok(fixtures::classification(Priority::Low)),
            Ok(fixtures::classification(Priority::Unknown)),
        ])
        .await;
    let coordinator = harness.coordinator();
    coordinator
        .run_batch(vec!["a".into(), "b".into(), "c".into(), "d".into()])
        .await;

    let stats = harness.session.stats().await;
    let report = analytics::analytics(&stats);
    assert_eq!(report.total_tickets, 4);
    assert_eq!(report.distribution[0].percent, 50.0);
    assert_eq!(report.distribution[2].percent, 25.0);
    assert_eq!(report.knowledge_graph.connections, 3);
    assert_eq!(report.trend.len(), 1);
    assert_eq!(report.trend[0].height, 1.0);
}

#[tokio::test]
async fn test_batch_against_http_analyzer() {
    let server = MockServer::start_async().await;
    let urgent = server.mock(|when, then| {
        when.method(POST).path("/analyze").body_includes("outage");
        then.status(200).json_body(json!({
            "priority": "HIGH",
            "confidence": 0.93,
            "priority_scores": {"high": 0.93, "medium": 0.05, "low": 0.02}
        }));
    });
    let degraded = server.mock(|when, then| {
        when.method(POST).path("/analyze").body_includes("question");
        then.status(200).json_body(json!({}));
    });
    let failing = server.mock(|when, then| {
        when.method(POST).path("/analyze").body_includes("crash");
        then.status(500).body("model not loaded");
    });

    let config = AnalyzerConfig {
        page_url: Some(server.base_url()),
        ..Default::default()
    };
    let client = Arc::new(AnalyzerClient::new(&config).unwrap());
    let session = Arc::new(Session::new());
    let coordinator = BatchCoordinator::new(client, session.clone());

    let outcome = coordinator
        .run_upload(&RawUpload::from_text(
            "Full outage in EU region\n---\nAnalyzer crash report\n---\nA question about invoices",
        ))
        .await
        .unwrap();

    urgent.assert();
    degraded.assert();
    failing.assert();

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.records[0].priority, Priority::High);
    assert_eq!(outcome.records[1].priority, Priority::Unknown);
    assert_eq!(outcome.records[1].confidence, 0.0);
    assert!(outcome.records[1].priority_scores.is_empty());
    assert_eq!(outcome.failures[0].index, 1);
    assert_eq!(outcome.failures[0].status, Some(500));

    let stats = session.stats().await;
    assert_eq!(stats.count_for("high"), 1);
    assert_eq!(stats.count_for("unknown"), 1);
}
