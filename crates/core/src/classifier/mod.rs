//! Ticket classification and article recommendation.
//!
//! The analysis service is an opaque HTTP collaborator. This module provides
//! the `Classifier` and `Recommender` traits the rest of the crate depends
//! on, plus `AnalyzerClient`, the reqwest implementation of both.

mod analyzer;
mod origin;
mod types;

pub use analyzer::AnalyzerClient;
pub use origin::{resolve_origin, AnalyzerEndpoints};
pub use types::*;
