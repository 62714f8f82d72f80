//! Typed errors for the library layers.
//!
//! Binaries and the validation runner work in `anyhow::Result` and wrap these.

use thiserror::Error;

/// Failures talking to the enclave API.
#[derive(Debug, Error)]
pub enum EnclaveError {
    #[error("invalid enclave url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
}

/// Failures loading a model or producing a prediction.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse model file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("unknown class label `{0}`")]
    UnknownLabel(String),
}

/// Failures aggregating results into a report.
#[derive(Debug, Error, PartialEq)]
pub enum MetricsError {
    #[error("no results to generate a report")]
    NoResults,

    #[error("expected 2 distinct labels, found {0}")]
    NotEnoughData(usize),

    #[error("{0} is undefined: denominator is zero")]
    Undefined(&'static str),
}
