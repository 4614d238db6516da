use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::ticket::TicketRecord;

/// How many entries the recent-activity feed keeps.
pub const LATEST_TICKETS_CAPACITY: usize = 5;

/// One line of the recent-activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    pub priority: String,
    /// When the ticket was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Read-only view of the running aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_tickets: u64,
    pub tickets_by_priority: BTreeMap<String, u64>,
    /// Keyed by local calendar day, `YYYY-MM-DD`.
    pub tickets_by_day: BTreeMap<String, u64>,
    /// Most recent first, at most [`LATEST_TICKETS_CAPACITY`] entries.
    pub latest_tickets: Vec<ActivityEntry>,
}

impl AggregateStats {
    pub fn count_for(&self, priority: &str) -> u64 {
        self.tickets_by_priority.get(priority).copied().unwrap_or(0)
    }
}

/// Streaming aggregate over every recorded ticket.
///
/// Only the fields needed for the counters are kept; the aggregate cannot be
/// rebuilt from the ticket list and is never derived from it.
#[derive(Debug, Default)]
pub struct StatsAccumulator {
    total: u64,
    by_priority: BTreeMap<String, u64>,
    by_day: BTreeMap<String, u64>,
    latest: VecDeque<ActivityEntry>,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, ticket: &TicketRecord) {
        self.record_at(ticket, Local::now());
    }

    pub fn record_at(&mut self, ticket: &TicketRecord, now: DateTime<Local>) {
        let priority = ticket.priority.as_str().to_lowercase();

        self.total += 1;
        *self.by_priority.entry(priority.clone()).or_insert(0) += 1;
        *self
            .by_day
            .entry(now.format("%Y-%m-%d").to_string())
            .or_insert(0) += 1;

        self.latest.push_front(ActivityEntry {
            id: ticket.id.clone(),
            priority,
            timestamp: now.with_timezone(&Utc),
        });
        self.latest.truncate(LATEST_TICKETS_CAPACITY);
    }

    pub fn snapshot(&self) -> AggregateStats {
        AggregateStats {
            total_tickets: self.total,
            tickets_by_priority: self.by_priority.clone(),
            tickets_by_day: self.by_day.clone(),
            latest_tickets: self.latest.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ClassificationResult, Priority};
    use chrono::TimeZone;

    fn record(id: &str, priority: Priority) -> TicketRecord {
        TicketRecord::new(
            id.to_string(),
            "body".to_string(),
            ClassificationResult {
                priority,
                confidence: 0.5,
                priority_scores: BTreeMap::new(),
            },
        )
    }

    #[test]
    fn test_empty_snapshot() {
        let stats = StatsAccumulator::new().snapshot();
        assert_eq!(stats, AggregateStats::default());
        assert_eq!(stats.count_for("high"), 0);
    }

    #[test]
    fn test_counts_sum_to_total() {
        let priorities = [
            Priority::High,
            Priority::Low,
            Priority::Low,
            Priority::Unknown,
            Priority::Medium,
            Priority::Other("critical".to_string()),
            Priority::High,
        ];
        let mut acc = StatsAccumulator::new();
        for (i, p) in priorities.iter().enumerate() {
            acc.record(&record(&format!("T{}", i), p.clone()));
        }

        let stats = acc.snapshot();
        assert_eq!(stats.total_tickets, 7);
        assert_eq!(stats.tickets_by_priority.values().sum::<u64>(), 7);
        assert_eq!(stats.count_for("high"), 2);
        assert_eq!(stats.count_for("low"), 2);
        assert_eq!(stats.count_for("unknown"), 1);
        assert_eq!(stats.count_for("critical"), 1);
    }

    #[test]
    fn test_latest_keeps_last_five_newest_first() {
        let mut acc = StatsAccumulator::new();
        for i in 1..=8 {
            acc.record(&record(&format!("T{}", i), Priority::Low));
        }

        let ids: Vec<String> = acc
            .snapshot()
            .latest_tickets
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["T8", "T7", "T6", "T5", "T4"]);
    }

    #[test]
    fn test_latest_shorter_than_capacity() {
        let mut acc = StatsAccumulator::new();
        acc.record(&record("T1", Priority::High));
        acc.record(&record("T2", Priority::Medium));

        let latest = acc.snapshot().latest_tickets;
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].id, "T2");
        assert_eq!(latest[0].priority, "medium");
    }

    #[test]
    fn test_day_buckets_use_recording_time() {
        let mut acc = StatsAccumulator::new();
        let monday = Local.with_ymd_and_hms(2024, 3, 4, 9, 30, 0).unwrap();
        let tuesday = Local.with_ymd_and_hms(2024, 3, 5, 23, 59, 0).unwrap();

        acc.record_at(&record("T1", Priority::High), monday);
        acc.record_at(&record("T2", Priority::Low), monday);
        acc.record_at(&record("T3", Priority::Low), tuesday);

        let stats = acc.snapshot();
        assert_eq!(stats.tickets_by_day.get("2024-03-04"), Some(&2));
        assert_eq!(stats.tickets_by_day.get("2024-03-05"), Some(&1));
        assert_eq!(stats.latest_tickets[0].timestamp, tuesday.with_timezone(&Utc));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut acc = StatsAccumulator::new();
        acc.record(&record("T1", Priority::High));
        let before = acc.snapshot();
        acc.record(&record("T2", Priority::High));
        assert_eq!(before.total_tickets, 1);
        assert_eq!(acc.snapshot().total_tickets, 2);
    }
}
