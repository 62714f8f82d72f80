//! # Enclave API Models
//!
//! Request and response bodies for the enclave data, log and report endpoints.
//! All bodies are JSON except file downloads, which are raw bytes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// DATA API
// ============================================================================

/// A blob in the enclave's data container.
///
/// # Fields
/// - `name`: `/`-separated path inside the container (e.g. `covid/img001.png`)
/// - `size`: size in bytes, when the enclave reports it
/// - `last_modified`: RFC 3339 timestamp, when the enclave reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl File {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
            last_modified: None,
        }
    }
}

/// Response body of `GET api/v1/data/files`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<File>,
}

// ============================================================================
// LOG API
// ============================================================================

/// Progress state attached to a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogStatus {
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Failed")]
    Failed,
    #[serde(rename = "Completed")]
    Completed,
}

/// Body of `POST api/v1/log`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogData {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LogStatus>,
}

impl LogData {
    /// A log entry without a status.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status: LogStatus) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }
}

// ============================================================================
// REPORT API
// ============================================================================

/// Lifecycle state of a posted report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Failed")]
    Failed,
    #[serde(rename = "Completed")]
    Completed,
}

/// JSON schema supplied by the data steward.
///
/// Carried opaquely; the enclave validates reports against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportJsonSchema(pub Value);

/// Body of `POST api/v1/report` and `POST api/v1/report/validate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub name: String,
    pub status: ReportStatus,
    pub json_data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_schema: Option<ReportJsonSchema>,
}

impl Report {
    pub fn new(name: impl Into<String>, status: ReportStatus, json_data: Value) -> Self {
        Self {
            name: name.into(),
            status,
            json_data,
            json_schema: None,
        }
    }

    pub fn with_schema(mut self, schema: Option<ReportJsonSchema>) -> Self {
        self.json_schema = schema;
        self
    }
}

// ============================================================================
// RESPONSES
// ============================================================================

/// Generic acknowledgement returned by the log and report endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Response body of `POST api/v1/report/validate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
}
