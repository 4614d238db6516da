//! Ticket API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use triage_core::{TicketInput, TicketRecord};

use super::handlers::{api_error, ApiError};
use crate::state::AppState;

/// Maximum allowed limit for ticket listings
const MAX_LIMIT: usize = 1000;

/// Default limit for ticket listings
const DEFAULT_LIMIT: usize = 100;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for submitting a single ticket
#[derive(Debug, Deserialize)]
pub struct SubmitTicketBody {
    pub ticket: String,
}

/// Query parameters for listing tickets
#[derive(Debug, Deserialize)]
pub struct ListTicketsParams {
    /// Filter by priority label
    pub priority: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Response for listing tickets
#[derive(Debug, Serialize)]
pub struct ListTicketsResponse {
    /// Most recent first.
    pub tickets: Vec<TicketRecord>,
    /// Matching tickets before pagination.
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/tickets
///
/// Classify and record one ticket. Unlike a batch item, a classification
/// failure is reported to the caller.
pub async fn submit_ticket(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmitTicketBody>,
) -> Result<(StatusCode, Json<TicketRecord>), ApiError> {
    let input = TicketInput::Typed(body.ticket);
    if !input.has_content() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Ticket text is empty"));
    }
    let upload = input.into_upload();

    match state.coordinator().submit_single(upload.content()).await {
        Ok(record) => Ok((StatusCode::CREATED, Json(record))),
        Err(e) => {
            warn!(error = %e, "Single ticket submission failed");
            Err(api_error(StatusCode::BAD_GATEWAY, e.to_string()))
        }
    }
}

/// GET /api/v1/tickets
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTicketsParams>,
) -> Json<ListTicketsResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0);
    let priority = params.priority.map(|p| p.to_lowercase());

    let matching: Vec<TicketRecord> = state
        .session()
        .tickets()
        .await
        .into_iter()
        .filter(|t| {
            priority
                .as_deref()
                .is_none_or(|p| t.priority.as_str() == p)
        })
        .collect();
    let total = matching.len();

    Json(ListTicketsResponse {
        tickets: matching.into_iter().skip(offset).take(limit).collect(),
        total,
        limit,
        offset,
    })
}

/// GET /api/v1/tickets/{id}
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TicketRecord>, ApiError> {
    state
        .session()
        .ticket(&id)
        .await
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Ticket not found: {}", id)))
}
