//! # Validation Runner
//!
//! Orchestrates one COVID-19 X-ray classification run against an enclave.
//!
//! ## Run Workflow
//!
//! 1. **Announce**: post a start message to the enclave log
//! 2. **Enumerate**: list the data container
//! 3. **Score**: for each file, download, predict, reduce both labels, record
//! 4. **Aggregate**: confusion matrix → accuracy / specificity / sensitivity
//! 5. **Report**: print, optionally validate, then post the report
//!
//! The run is strictly sequential. A file outside the labeled folders is
//! logged to the enclave and then scored as `covid`, unless
//! `skip_unlabeled` is set. Empty downloads and files without a prediction are
//! skipped. Only listing, aggregation and report posting failures end the run.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let client = EnclaveClient::new(&config.enclave)?;
//! let classifier = load_model(&client, &config.validation.model_path).await?;
//! let runner = ValidationRunner::new(client, classifier, config);
//! let summary = runner.run().await?;
//! ```

use anyhow::{bail, Result};
use log::{error, info, warn};
use std::path::Path;

use crate::common::config::AppConfig;
use crate::common::error::MetricsError;
use crate::enclave::{EnclaveClient, File, LogData, LogStatus, Report, ReportStatus};
use crate::inference::{actual_class, Class, Classifier, LinearClassifier};
use crate::report::{load_schema, Evaluation, MetricsReport};

pub const START_MESSAGE: &str = "Starting the COVID-19 X-Ray Classification Report";

/// What happened to a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Scored,
    Unlabeled,
    Empty,
    NoPrediction,
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunSummary {
    pub files_listed: usize,
    pub files_scored: usize,
    pub metrics: MetricsReport,
    pub report: Report,
}

/// Load the pretrained model, reporting the outcome to the enclave log.
///
/// # Errors
/// Returns the load error after posting it with `Failed` status; the caller
/// is expected to exit.
pub async fn load_model<P: AsRef<Path>>(client: &EnclaveClient, path: P) -> Result<LinearClassifier> {
    match LinearClassifier::load(path.as_ref()) {
        Ok(model) => {
            remote_log(
                client,
                LogData::with_status("Model loaded successfully", LogStatus::InProgress),
            )
            .await;
            Ok(model)
        }
        Err(e) => {
            error!("❌ Failed to load model {}: {}", path.as_ref().display(), e);
            remote_log(
                client,
                LogData::with_status(
                    format!("An error occurred while loading the model: {}", e),
                    LogStatus::Failed,
                ),
            )
            .await;
            Err(e.into())
        }
    }
}

/// Post to the enclave log without letting a log failure end the run.
async fn remote_log(client: &EnclaveClient, log: LogData) {
    if let Err(e) = client.post_log(&log).await {
        warn!("⚠️  Could not post log '{}': {}", log.message, e);
    }
}

pub struct ValidationRunner<C: Classifier> {
    client: EnclaveClient,
    classifier: C,
    config: AppConfig,
}

impl<C: Classifier> ValidationRunner<C> {
    pub fn new(client: EnclaveClient, classifier: C, config: AppConfig) -> Self {
        Self {
            client,
            classifier,
            config,
        }
    }

    fn sas_url(&self) -> Option<&str> {
        self.config.enclave.sas_url.as_deref()
    }

    async fn log(&self, message: impl Into<String>, status: LogStatus) {
        remote_log(&self.client, LogData::with_status(message, status)).await;
    }

    /// Execute the full run and post the report.
    pub async fn run(&self) -> Result<RunSummary> {
        info!("🚀 {}", START_MESSAGE);
        remote_log(&self.client, LogData::message(START_MESSAGE)).await;

        let files = self.client.list_files(self.sas_url()).await?.files;
        info!("Found {} files in the data container", files.len());

        let mut evaluation = Evaluation::new();
        for file in &files {
            let outcome = self.score_file(file, &mut evaluation).await?;
            if outcome != FileOutcome::Scored {
                info!("Skipped {} ({:?})", file.name, outcome);
            }
        }

        let metrics = match evaluation.aggregate() {
            Ok(metrics) => metrics,
            Err(MetricsError::NoResults) => {
                self.log("No results to generate a report", LogStatus::Failed)
                    .await;
                bail!("no files could be scored");
            }
            Err(e) => {
                self.log(
                    format!("Not enough data to calculate confusion matrix: {}", e),
                    LogStatus::Failed,
                )
                .await;
                bail!("not enough data to calculate confusion matrix: {}", e);
            }
        };

        for line in metrics.summary_lines() {
            info!("{}", line);
        }

        let json_data = metrics.to_json_data();
        println!("{}", serde_json::to_string_pretty(&json_data)?);

        if let Some(path) = &self.config.validation.report_output {
            evaluation.export_to_json(&metrics, path)?;
            info!("Report exported to: {}", path.display());
        }

        let report = Report::new(
            self.config.validation.report_name.clone(),
            ReportStatus::Completed,
            json_data,
        )
        .with_schema(load_schema(&self.config.validation.schema_path)?);

        self.submit(&report).await?;

        Ok(RunSummary {
            files_listed: files.len(),
            files_scored: evaluation.len(),
            metrics,
            report,
        })
    }

    /// Download, predict and record one file.
    ///
    /// Only transport failures are errors; everything else is an outcome.
    async fn score_file(&self, file: &File, evaluation: &mut Evaluation) -> Result<FileOutcome> {
        let actual = match actual_class(&file.name) {
            Some(class) => class,
            None => {
                self.log(
                    format!(
                        "When looking for the data labels in the parent folder name of covid/nofinding/pneumonia, this file ({}) was not correctly labeled",
                        file.name
                    ),
                    LogStatus::InProgress,
                )
                .await;
                if self.config.validation.skip_unlabeled {
                    return Ok(FileOutcome::Unlabeled);
                }
                // Unlabeled files keep the default actual class
                Class::Covid
            }
        };

        let content = self.client.download_file(&file.name, self.sas_url()).await?;
        if content.is_empty() {
            return Ok(FileOutcome::Empty);
        }

        let predicted = match self.classifier.predict(&content) {
            Ok(class) => class,
            Err(e) => {
                warn!("No prediction for {}: {}", file.name, e);
                self.log(
                    format!(
                        "The model did not return a prediction for the file ({})",
                        file.name
                    ),
                    LogStatus::InProgress,
                )
                .await;
                return Ok(FileOutcome::NoPrediction);
            }
        };

        evaluation.record(file.name.clone(), actual.reduce(), predicted.reduce());
        Ok(FileOutcome::Scored)
    }

    /// Optionally validate, then post the report.
    async fn submit(&self, report: &Report) -> Result<()> {
        if self.config.validation.validate_before_post {
            let outcome = self.client.validate_report(report).await?;
            if !outcome.valid {
                let reasons = outcome.errors.join("; ");
                self.log(
                    format!("The report failed validation: {}", reasons),
                    LogStatus::Failed,
                )
                .await;
                bail!("report failed validation: {}", reasons);
            }
            info!("✅ Report passed validation");
        }

        self.client.post_report(report).await?;
        info!("✅ Posted report '{}'", report.name);
        Ok(())
    }
}
