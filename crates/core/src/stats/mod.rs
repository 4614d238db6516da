//! Running aggregate over classified tickets, and the views derived from it.

mod accumulator;
pub mod analytics;

pub use accumulator::{ActivityEntry, AggregateStats, StatsAccumulator, LATEST_TICKETS_CAPACITY};
pub use analytics::{
    AnalyticsReport, DashboardOverview, GraphStats, PriorityShare, RecentActivity, TrendPoint,
};
