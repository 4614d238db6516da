//! Article recommendations for a recorded ticket.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use triage_core::Recommendation;

use super::handlers::api_error;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendParams {
    pub top_k: Option<u32>,
}

/// Mirrors the analyzer's `{ok, results | error}` envelope.
#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Recommendation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /api/v1/tickets/{id}/recommendations
///
/// Failures stay local to this request and never touch batch or stats state.
pub async fn recommend_for_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<RecommendParams>,
) -> Response {
    let Some(ticket) = state.session().ticket(&id).await else {
        return api_error(StatusCode::NOT_FOUND, format!("Ticket not found: {}", id))
            .into_response();
    };

    let top_k = params
        .top_k
        .unwrap_or(state.config().recommend.default_top_k)
        .max(1);

    match state.recommender().recommend(&ticket.content, top_k).await {
        Ok(results) => Json(RecommendResponse {
            ok: true,
            results: Some(results),
            error: None,
        })
        .into_response(),
        Err(e) => {
            warn!(ticket_id = %id, error = %e, "Recommendation request failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(RecommendResponse {
                    ok: false,
                    results: None,
                    error: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}
