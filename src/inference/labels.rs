//! Class labels and the three-class → binary reduction used for scoring.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::common::error::InferenceError;

/// What the model predicts for an X-ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Class {
    Covid,
    NoFinding,
    Pneumonia,
}

impl Class {
    pub const ALL: [Class; 3] = [Class::Covid, Class::NoFinding, Class::Pneumonia];

    pub fn as_str(&self) -> &'static str {
        match self {
            Class::Covid => "covid",
            Class::NoFinding => "nofinding",
            Class::Pneumonia => "pneumonia",
        }
    }

    /// Collapse to covid / not-covid. Pneumonia counts as not-covid.
    pub fn reduce(self) -> BinaryLabel {
        match self {
            Class::Covid => BinaryLabel::Covid,
            Class::NoFinding | Class::Pneumonia => BinaryLabel::NoFinding,
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Class {
    type Err = InferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "covid" => Ok(Class::Covid),
            "nofinding" => Ok(Class::NoFinding),
            "pneumonia" => Ok(Class::Pneumonia),
            other => Err(InferenceError::UnknownLabel(other.to_string())),
        }
    }
}

/// Reduced label used for scoring.
///
/// The derived ordering (`Covid < NoFinding`) matches the sorted label order
/// the confusion matrix is laid out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryLabel {
    Covid,
    NoFinding,
}

impl BinaryLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryLabel::Covid => "covid",
            BinaryLabel::NoFinding => "nofinding",
        }
    }
}

impl fmt::Display for BinaryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ground truth for a blob: its top-level folder.
///
/// `covid/img1.png` is covid; `img1.png` or `other/img1.png` is unlabeled.
pub fn actual_class(file_name: &str) -> Option<Class> {
    let folder = file_name.split('/').next()?;
    folder.parse().ok()
}
