pub mod batch;
pub mod classifier;
pub mod config;
pub mod ingest;
pub mod metrics;
pub mod session;
pub mod stats;
pub mod testing;
pub mod ticket;

pub use batch::{
    BatchCoordinator, BatchError, BatchOutcome, BatchProgress, BatchState, BatchSummary,
    ItemFailure,
};
pub use classifier::{
    AnalyzerClient, ClassificationError, ClassificationResult, Classifier, Priority,
    Recommendation, RecommendationError, Recommender,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use ingest::{split_tickets, InputMethod, RawUpload, TicketInput, UploadError};
pub use session::Session;
pub use stats::{AggregateStats, StatsAccumulator};
pub use ticket::TicketRecord;
