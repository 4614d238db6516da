use std::collections::VecDeque;

use super::TicketRecord;

/// Append-only ticket list, most recent first.
#[derive(Debug, Default)]
pub struct TicketList {
    records: VecDeque<TicketRecord>,
}

impl TicketList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: TicketRecord) {
        self.records.push_front(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &TicketRecord> {
        self.records.iter()
    }

    pub fn get(&self, id: &str) -> Option<&TicketRecord> {
        self.records.iter().find(|r| r.id == id)
    }
}
