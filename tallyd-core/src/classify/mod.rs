//! Request classification.
//!
//! Turns a request target such as `/content/csl/activation?id=1` into a
//! method identity (`csl_activation`), a status and any extracted values.

mod classifier;
mod types;


pub use classifier::RuleSet;
pub use types::{AggregationRule, ExtractionRule, NO_GROUP, ProcessedRequest, RequestStatus};
