//! Dashboard views derived from an [`AggregateStats`] snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::accumulator::AggregateStats;

/// Priorities shown as dedicated cards and distribution bars.
pub const DASHBOARD_PRIORITIES: [&str; 3] = ["high", "medium", "low"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityShare {
    pub priority: String,
    pub count: u64,
    /// Percentage of all tickets, one decimal place.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub day: String,
    /// Day of month, as printed under the bar.
    pub label: String,
    pub count: u64,
    /// Bar height relative to the busiest day, in `[0, 1]`.
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: u64,
    pub connections: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentActivity {
    pub id: String,
    pub priority: String,
    pub timestamp: DateTime<Utc>,
    pub time_ago: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardOverview {
    pub total_tickets: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
    pub recent_activity: Vec<RecentActivity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub total_tickets: u64,
    pub distribution: Vec<PriorityShare>,
    pub trend: Vec<TrendPoint>,
    pub knowledge_graph: GraphStats,
}

pub fn priority_distribution(stats: &AggregateStats) -> Vec<PriorityShare> {
    let denominator = stats.total_tickets.max(1) as f64;
    DASHBOARD_PRIORITIES
        .iter()
        .map(|priority| {
            let count = stats.count_for(priority);
            let percent = (count as f64 / denominator * 1000.0).round() / 10.0;
            PriorityShare {
                priority: priority.to_string(),
                count,
                percent,
            }
        })
        .collect()
}

pub fn trend(stats: &AggregateStats) -> Vec<TrendPoint> {
    let busiest = stats.tickets_by_day.values().copied().max().unwrap_or(0).max(1) as f64;
    // BTreeMap iteration over YYYY-MM-DD keys is already chronological.
    stats
        .tickets_by_day
        .iter()
        .map(|(day, &count)| TrendPoint {
            day: day.clone(),
            label: day.rsplit('-').next().unwrap_or(day).to_string(),
            count,
            height: count as f64 / busiest,
        })
        .collect()
}

pub fn format_time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    if seconds < 60 {
        "just now".to_string()
    } else if seconds < 3_600 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 86_400 {
        format!("{}h ago", seconds / 3_600)
    } else {
        format!("{}d ago", seconds / 86_400)
    }
}

pub fn knowledge_graph(stats: &AggregateStats) -> GraphStats {
    GraphStats {
        nodes: stats.total_tickets,
        connections: stats.total_tickets.saturating_sub(1),
    }
}

pub fn overview(stats: &AggregateStats, now: DateTime<Utc>) -> DashboardOverview {
    DashboardOverview {
        total_tickets: stats.total_tickets,
        high: stats.count_for("high"),
        medium: stats.count_for("medium"),
        low: stats.count_for("low"),
        recent_activity: stats
            .latest_tickets
            .iter()
            .map(|entry| RecentActivity {
                id: entry.id.clone(),
                priority: entry.priority.clone(),
                timestamp: entry.timestamp,
                time_ago: format_time_ago(entry.timestamp, now),
            })
            .collect(),
    }
}

pub fn analytics(stats: &AggregateStats) -> AnalyticsReport {
    AnalyticsReport {
        total_tickets: stats.total_tickets,
        distribution: priority_distribution(stats),
        trend: trend(stats),
        knowledge_graph: knowledge_graph(stats),
    }
}
