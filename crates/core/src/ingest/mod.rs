//! Turning user input into ticket candidates.

mod split;
mod upload;

pub use split::split;
pub use split::split as split_tickets;
pub use upload::{is_supported_upload, InputMethod, RawUpload, TicketInput, UploadError};
