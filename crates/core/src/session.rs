//! Per-session application state shared by the coordinator and the server.

use tokio::sync::RwLock;
use tracing::debug;

use crate::classifier::ClassificationResult;
use crate::metrics;
use crate::stats::{AggregateStats, StatsAccumulator};
use crate::ticket::{TicketIdGenerator, TicketList, TicketRecord};

/// Ticket list plus the running stats aggregate.
///
/// Both are only ever appended to through [`Session::record`], which updates
/// them together so a reader never sees a ticket the stats do not count.
#[derive(Debug, Default)]
pub struct Session {
    tickets: RwLock<TicketList>,
    stats: RwLock<StatsAccumulator>,
    ids: TicketIdGenerator,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn a classification into a ticket record and fold it into the
    /// session state.
    pub async fn record(&self, content: String, result: ClassificationResult) -> TicketRecord {
        let record = TicketRecord::new(self.ids.next_id(), content, result);

        // Lock order: tickets, then stats.
        let mut tickets = self.tickets.write().await;
        let mut stats = self.stats.write().await;
        tickets.push(record.clone());
        stats.record(&record);

        metrics::TICKETS_RECORDED
            .with_label_values(&[record.priority.as_str()])
            .inc();
        debug!(id = %record.id, priority = %record.priority, "Ticket recorded");

        record
    }

    /// All tickets, most recent first.
    pub async fn tickets(&self) -> Vec<TicketRecord> {
        self.tickets.read().await.iter().cloned().collect()
    }

    pub async fn ticket(&self, id: &str) -> Option<TicketRecord> {
        self.tickets.read().await.get(id).cloned()
    }

    pub async fn ticket_count(&self) -> usize {
        self.tickets.read().await.len()
    }

    pub async fn stats(&self) -> AggregateStats {
        self.stats.read().await.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Priority;
    use std::collections::BTreeMap;

    fn result(priority: Priority) -> ClassificationResult {
        ClassificationResult {
            priority,
            confidence: 0.8,
            priority_scores: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn test_record_updates_list_and_stats() {
        let session = Session::new();
        let first = session.record("a".to_string(), result(Priority::High)).await;
        let second = session.record("b".to_string(), result(Priority::Low)).await;

        assert_ne!(first.id, second.id);

        let tickets = session.tickets().await;
        assert_eq!(tickets.len(), 2);
        assert_eq!(tickets[0].id, second.id);

        let stats = session.stats().await;
        assert_eq!(stats.total_tickets, 2);
        assert_eq!(stats.count_for("high"), 1);
        assert_eq!(stats.count_for("low"), 1);
        assert_eq!(stats.latest_tickets[0].id, second.id);
    }

    #[tokio::test]
    async fn test_ticket_lookup() {
        let session = Session::new();
        let record = session.record("disk full".to_string(), result(Priority::Medium)).await;

        let found = session.ticket(&record.id).await.unwrap();
        assert_eq!(found.content, "disk full");
        assert!(session.ticket("T000000-0").await.is_none());
        assert_eq!(session.ticket_count().await, 1);
    }

    #[tokio::test]
    async fn test_new_session_is_empty() {
        let session = Session::new();
        assert!(session.tickets().await.is_empty());
        assert_eq!(session.stats().await.total_tickets, 0);
    }
}
