//! # Enclave API
//!
//! The [`EnclaveClient`] issues the HTTP calls; [`models`] holds the bodies it
//! sends and receives.

pub mod client;
pub mod models;

pub use client::EnclaveClient;
pub use models::{
    ApiMessage, File, FileList, LogData, LogStatus, Report, ReportJsonSchema, ReportStatus,
    ValidationOutcome,
};
