//! Classified ticket records.

mod id;
mod list;
mod types;

pub use id::TicketIdGenerator;
pub use list::TicketList;
pub use types::TicketRecord;
