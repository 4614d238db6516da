//! Aggregate stats and dashboard analytics.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use triage_core::stats::{analytics, AnalyticsReport, DashboardOverview};
use triage_core::AggregateStats;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub overview: DashboardOverview,
    #[serde(flatten)]
    pub report: AnalyticsReport,
}

/// GET /api/v1/stats
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<AggregateStats> {
    Json(state.session().stats().await)
}

/// GET /api/v1/analytics
pub async fn get_analytics(State(state): State<Arc<AppState>>) -> Json<AnalyticsResponse> {
    let stats = state.session().stats().await;
    Json(AnalyticsResponse {
        overview: analytics::overview(&stats, Utc::now()),
        report: analytics::analytics(&stats),
    })
}
