pub mod batches;
pub mod handlers;
pub mod middleware;
pub mod recommend;
pub mod routes;
pub mod stats;
pub mod tickets;
pub mod ws;

pub use routes::create_router;
pub use ws::{WsBroadcaster, WsMessage};
