//! # Report
//!
//! From paired (actual, predicted) labels to the JSON report body.
//!
//! - [`confusion`]: 2×2 confusion matrix in sorted label order
//! - [`metrics`]: accuracy, specificity, sensitivity and their intervals
//! - [`evaluation`]: per-file result accumulator
//! - [`schema`]: optional report schema attached before posting

pub mod confusion;
pub mod evaluation;
pub mod metrics;
pub mod schema;

pub use confusion::ConfusionMatrix;
pub use evaluation::{Evaluation, ResultRecord};
pub use metrics::{confidence_interval, MetricSummary, MetricsReport};
pub use schema::load_schema;
