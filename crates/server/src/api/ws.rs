//! WebSocket support for real-time dashboard updates.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use triage_core::batch::{BatchProgress, BatchState};
use triage_core::TicketRecord;

use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT};
use crate::state::AppState;

/// How often idle connections get a heartbeat.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// WebSocket message sent to clients for real-time updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// A batch began processing.
    BatchStarted { batch_id: String, total: usize },
    /// One more batch item was attempted.
    BatchProgress {
        batch_id: String,
        completed: usize,
        total: usize,
        /// 0.0 - 100.0
        percent: f64,
    },
    /// A ticket was classified and recorded. `batch_id` is `single` for
    /// one-off submissions.
    TicketRecorded {
        batch_id: String,
        ticket_id: String,
        priority: String,
        confidence: f64,
    },
    /// A batch finished.
    BatchCompleted {
        batch_id: String,
        succeeded: usize,
        failed: usize,
    },
    /// Server heartbeat (sent periodically to keep connection alive).
    Heartbeat { timestamp: i64 },
}

impl WsMessage {
    fn type_label(&self) -> &'static str {
        match self {
            WsMessage::BatchStarted { .. } => "batch_started",
            WsMessage::BatchProgress { .. } => "batch_progress",
            WsMessage::TicketRecorded { .. } => "ticket_recorded",
            WsMessage::BatchCompleted { .. } => "batch_completed",
            WsMessage::Heartbeat { .. } => "heartbeat",
        }
    }
}

/// Broadcaster for WebSocket messages using tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct WsBroadcaster {
    sender: broadcast::Sender<WsMessage>,
}

impl WsBroadcaster {
    /// Create a new broadcaster with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Broadcast a message to all connected clients.
    pub fn broadcast(&self, msg: WsMessage) {
        // Ignore send errors - they just mean no one is listening
        let _ = self.sender.send(msg);
    }

    /// Subscribe to receive messages.
    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.sender.subscribe()
    }

    pub fn batch_progress(&self, batch_id: &str, progress: BatchProgress) {
        self.broadcast(WsMessage::BatchProgress {
            batch_id: batch_id.to_string(),
            completed: progress.completed,
            total: progress.total,
            percent: progress.percent(),
        });
    }

    pub fn ticket_recorded(&self, batch_id: &str, record: &TicketRecord) {
        self.broadcast(WsMessage::TicketRecorded {
            batch_id: batch_id.to_string(),
            ticket_id: record.id.clone(),
            priority: record.priority.to_string(),
            confidence: record.confidence,
        });
    }

    /// Announce batch start and completion. Intermediate `Running` states
    /// are covered by progress messages.
    pub fn batch_state(&self, batch_id: &str, state: BatchState) {
        match state {
            BatchState::Running {
                completed: 0,
                total,
            } => self.broadcast(WsMessage::BatchStarted {
                batch_id: batch_id.to_string(),
                total,
            }),
            BatchState::Done { succeeded, failed } => {
                self.broadcast(WsMessage::BatchCompleted {
                    batch_id: batch_id.to_string(),
                    succeeded,
                    failed,
                })
            }
            _ => {}
        }
    }
}

impl Default for WsBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe to broadcast messages
    let mut rx = state.ws_broadcaster().subscribe();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();

    info!("WebSocket client connected");

    // Forward broadcast messages and heartbeats to this client
    let send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await;

        loop {
            let msg = tokio::select! {
                result = rx.recv() => match result {
                    Ok(msg) => msg,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("WebSocket client lagged, skipped {} messages", n);
                        WS_LAG_EVENTS.inc();
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed");
                        break;
                    }
                },
                _ = heartbeat.tick() => WsMessage::Heartbeat {
                    timestamp: chrono::Utc::now().timestamp(),
                },
            };

            WS_MESSAGES_SENT.with_label_values(&[msg.type_label()]).inc();

            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, client disconnected");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize WsMessage: {}", e);
                }
            }
        }
    });

    // Handle incoming messages from client (ping/pong, close)
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(Message::Text(text)) => {
                debug!("Received text message: {}", text);
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}
