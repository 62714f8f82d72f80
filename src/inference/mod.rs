//! # Inference
//!
//! Everything between downloaded file bytes and a reduced label:
//! [`preprocess`] decodes and normalizes, a [`Classifier`] predicts a
//! three-class [`Class`], and [`Class::reduce`] collapses it for scoring.

pub mod classifier;
pub mod labels;
pub mod preprocess;

pub use classifier::{Classifier, LinearClassifier, LinearModel};
pub use labels::{actual_class, BinaryLabel, Class};
pub use preprocess::preprocess;
