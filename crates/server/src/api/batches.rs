//! Batch API handlers.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};
use triage_core::{
    split_tickets, BatchError, BatchOutcome, BatchSummary, ItemFailure, RawUpload, TicketInput,
    TicketRecord,
};

use super::handlers::{api_error, ApiError};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for submitting a text blob as a batch
#[derive(Debug, Deserialize)]
pub struct SubmitBatchBody {
    pub text: String,
    /// Name of the file the text came from, if any
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewBody {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub count: usize,
    pub tickets: Vec<String>,
}

/// Response for a finished batch
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub batch_id: String,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub summary: BatchSummary,
    /// Human-readable summary line
    pub message: String,
    pub records: Vec<TicketRecord>,
    pub failures: Vec<ItemFailure>,
}

impl From<BatchOutcome> for BatchResponse {
    fn from(outcome: BatchOutcome) -> Self {
        let summary = outcome.summary();
        Self {
            batch_id: outcome.batch_id,
            total: outcome.total,
            succeeded: outcome.records.len(),
            failed: outcome.failures.len(),
            message: summary.to_string(),
            summary,
            records: outcome.records,
            failures: outcome.failures,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/batches
pub async fn submit_batch(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmitBatchBody>,
) -> Result<Json<BatchResponse>, ApiError> {
    let input = match body.filename {
        Some(filename) => TicketInput::Uploaded(
            RawUpload::from_file(filename, body.text.into_bytes())
                .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?,
        ),
        None => TicketInput::Typed(body.text),
    };

    run_input(&state, input).await
}

/// POST /api/v1/batches/upload
///
/// Multipart form with a single `.txt` file in the `file` field.
pub async fn upload_batch(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<BatchResponse>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err(api_error(
                    StatusCode::BAD_REQUEST,
                    format!("Malformed multipart body: {}", e),
                ))
            }
        };
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.txt").to_string();
        match field.bytes().await {
            Ok(bytes) => file = Some((filename, bytes.to_vec())),
            Err(e) => {
                return Err(api_error(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read file: {}", e),
                ))
            }
        }
    }

    let Some((filename, bytes)) = file else {
        return Err(api_error(StatusCode::BAD_REQUEST, "No file provided"));
    };

    let upload = RawUpload::from_file(filename, bytes)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
    info!(
        filename = ?upload.filename(),
        size = %upload.size_label(),
        "Batch file uploaded"
    );

    run_input(&state, TicketInput::Uploaded(upload)).await
}

/// POST /api/v1/batches/preview
///
/// Show how text would be split without classifying anything.
pub async fn preview_batch(Json(body): Json<PreviewBody>) -> Json<PreviewResponse> {
    let tickets = split_tickets(&body.text);
    Json(PreviewResponse {
        count: tickets.len(),
        tickets,
    })
}

/// Run the batch on its own task so a dropped request does not stop it.
async fn run_input(
    state: &AppState,
    input: TicketInput,
) -> Result<Json<BatchResponse>, ApiError> {
    if !input.has_content() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Ticket text is empty"));
    }
    let method = input.method();
    let upload = input.into_upload();

    let coordinator = Arc::clone(state.coordinator());
    let handle = tokio::spawn(async move { coordinator.run_upload(&upload).await });

    match handle.await {
        Ok(Ok(outcome)) => {
            debug!(?method, batch_id = %outcome.batch_id, "Batch request finished");
            Ok(Json(BatchResponse::from(outcome)))
        }
        Ok(Err(e @ BatchError::EmptyBatch)) => {
            Err(api_error(StatusCode::BAD_REQUEST, e.to_string()))
        }
        Err(e) => {
            error!("Batch task failed: {}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Batch processing task failed",
            ))
        }
    }
}
