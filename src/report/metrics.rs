//! # Report Metrics
//!
//! Accuracy, specificity and sensitivity with a 95% interval half-width.
//!
//! The interval is computed as
//!
//! ```text
//! CI(p, n) = 1.96 * (sqrt(p) - (1 - p)) / n
//! ```
//!
//! and reported as `round(|CI|, 4)`. Note this is not the Wald interval
//! `1.96 * sqrt(p(1-p)/n)`.

use log::warn;
use serde::{Deserialize, Serialize};

use super::confusion::ConfusionMatrix;
use crate::common::error::MetricsError;

const Z_95: f64 = 1.96;

/// Interval half-width as reported.
pub fn confidence_interval(p: f64, n: usize) -> f64 {
    let ci = Z_95 * (p.sqrt() - (1.0 - p)) / n as f64;
    round4(ci.abs())
}

/// Round to 4 decimals on the exact binary value, ties to even.
///
/// Scaling by 10^4 first would round the product instead, which can land on
/// a spurious `.5` (0.00035 * 10^4 == 3.5).
fn round4(value: f64) -> f64 {
    format!("{:.4}", value).parse().unwrap_or(value)
}

/// One metric in the report body.
///
/// An undefined metric (zero denominator) serializes as
/// `{"value": null, "CI": null, "n": n}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub value: Option<f64>,
    #[serde(rename = "CI")]
    pub ci: Option<f64>,
    pub n: usize,
}

impl MetricSummary {
    pub fn new(value: f64, n: usize) -> Self {
        Self {
            value: Some(value),
            ci: Some(confidence_interval(value, n)),
            n,
        }
    }

    pub fn undefined(n: usize) -> Self {
        Self {
            value: None,
            ci: None,
            n,
        }
    }

    fn from_result(label: &str, result: Result<f64, MetricsError>, n: usize) -> Self {
        match result {
            Ok(value) => Self::new(value, n),
            Err(e) => {
                warn!("An error occurred while calculating {}: {}", label, e);
                Self::undefined(n)
            }
        }
    }

    pub fn is_defined(&self) -> bool {
        self.value.is_some()
    }

    /// `Accuracy: 0.85 ± 0.0123 (95% CI, n=20)`
    pub fn describe(&self, label: &str) -> String {
        match (self.value, self.ci) {
            (Some(value), Some(ci)) => format!(
                "{}: {:.2} ± {} (95% CI, n={})",
                label, value, ci, self.n
            ),
            _ => format!("{}: nan ± nan (95% CI, n={})", label, self.n),
        }
    }
}

/// The `report` object posted to the enclave.
///
/// Each metric is computed on its own; an undefined one does not hide the
/// others.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub accuracy: MetricSummary,
    pub specificity: MetricSummary,
    pub sensitivity: MetricSummary,
}

impl MetricsReport {
    pub fn from_matrix(matrix: &ConfusionMatrix) -> Self {
        let n = matrix.total();
        Self {
            accuracy: MetricSummary::from_result("accuracy", matrix.accuracy(), n),
            specificity: MetricSummary::from_result("specificity", matrix.specificity(), n),
            sensitivity: MetricSummary::from_result("sensitivity", matrix.weighted_recall(), n),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.accuracy.is_defined() && self.specificity.is_defined() && self.sensitivity.is_defined()
    }

    /// Human-readable lines, one per metric.
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            self.accuracy.describe("Accuracy"),
            self.specificity.describe("Specificity"),
            self.sensitivity.describe("Sensitivity"),
        ]
    }

    /// `{"report": {...}}`, the shape posted as the report's `json_data`.
    pub fn to_json_data(&self) -> serde_json::Value {
        serde_json::json!({ "report": self })
    }
}
