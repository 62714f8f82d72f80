use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use super::confusion::ConfusionMatrix;
use super::metrics::MetricsReport;
use crate::common::error::MetricsError;
use crate::inference::BinaryLabel;

/// One scored file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(rename = "blob.name")]
    pub blob_name: String,
    pub actual: BinaryLabel,
    pub prediction: BinaryLabel,
}

/// Accumulates per-file results over a run and turns them into a report.
#[derive(Debug)]
pub struct Evaluation {
    start_time: Instant,
    records: Vec<ResultRecord>,
}

impl Default for Evaluation {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluation {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            records: Vec::new(),
        }
    }

    pub fn record(&mut self, blob_name: impl Into<String>, actual: BinaryLabel, prediction: BinaryLabel) {
        self.records.push(ResultRecord {
            blob_name: blob_name.into(),
            actual,
            prediction,
        });
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn confusion_matrix(&self) -> Result<ConfusionMatrix, MetricsError> {
        ConfusionMatrix::from_pairs(self.records.iter().map(|r| (r.actual, r.prediction)))
    }

    /// Aggregate everything recorded so far.
    pub fn aggregate(&self) -> Result<MetricsReport, MetricsError> {
        let matrix = self.confusion_matrix()?;
        let report = MetricsReport::from_matrix(&matrix);

        info!(
            "Scored {} files in {:.1}s (tn={}, fp={}, fn={}, tp={})",
            self.records.len(),
            self.start_time.elapsed().as_secs_f64(),
            matrix.tn,
            matrix.fp,
            matrix.fn_,
            matrix.tp
        );
        Ok(report)
    }

    /// Write an already aggregated report plus the per-file results as
    /// pretty JSON.
    pub fn export_to_json<P: AsRef<Path>>(&self, report: &MetricsReport, path: P) -> anyhow::Result<()> {
        let output = serde_json::json!({
            "report": report,
            "results": self.records,
            "duration_secs": self.start_time.elapsed().as_secs(),
        });

        let json_string = serde_json::to_string_pretty(&output)?;
        let mut file = File::create(path)?;
        file.write_all(json_string.as_bytes())?;

        Ok(())
    }
}
