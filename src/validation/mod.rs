//! # COVID-19 X-Ray Validation
//!
//! Scores a pretrained classifier against the labeled X-rays in an enclave's
//! data container and posts the resulting performance report.

pub mod runner;

pub use runner::{load_model, FileOutcome, RunSummary, ValidationRunner, START_MESSAGE};
