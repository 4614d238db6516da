use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Generates ticket ids of the form `T<last 6 digits of epoch ms>-<seq>`.
///
/// The millisecond part keeps ids short and roughly time ordered; the
/// sequence number makes them unique when several tickets complete within
/// the same millisecond.
#[derive(Debug, Default)]
pub struct TicketIdGenerator {
    sequence: AtomicU64,
}

impl TicketIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> String {
        self.next_id_at(Utc::now())
    }

    pub fn next_id_at(&self, now: DateTime<Utc>) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let millis = now.timestamp_millis().rem_euclid(1_000_000);
        format!("T{:06}-{}", millis, seq)
    }
}
