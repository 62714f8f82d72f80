//! # enclave-algo
//!
//! Algorithm packages that run inside an enclave and talk to its HTTP API.
//!
//! ## Modules
//!
//! - [`common`]: configuration, error types and logging shared by every binary
//! - [`enclave`]: typed client for the enclave data, log and report endpoints
//! - [`inference`]: image preprocessing, class labels and the classifier seam
//! - [`report`]: confusion matrix, confidence intervals and report assembly
//! - [`validation`]: the COVID-19 X-ray classification run
//! - [`sandbox`]: local stand-in for the enclave API

pub mod common;
pub mod enclave;
pub mod inference;
pub mod report;
pub mod sandbox;
pub mod validation;

pub use enclave::EnclaveClient;
pub use validation::ValidationRunner;
