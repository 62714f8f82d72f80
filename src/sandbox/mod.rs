//! # Enclave Sandbox
//!
//! An axum server speaking the enclave API over a local directory, for running
//! algorithm packages outside an enclave and for integration tests.

pub mod server;

pub use server::{router, serve, SandboxState};
