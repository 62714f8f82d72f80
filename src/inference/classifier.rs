//! # Classifier
//!
//! [`Classifier`] is the seam between the validation run and a model. The
//! bundled [`LinearClassifier`] reads a JSON model file:
//!
//! ```json
//! {
//!   "labels": ["covid", "nofinding", "pneumonia"],
//!   "input_size": 32,
//!   "weights": [[...1024 floats...], [...], [...]],
//!   "bias": [0.1, -0.2, 0.05]
//! }
//! ```
//!
//! One weight row and one bias per label; each row holds
//! `input_size * input_size` values matching [`preprocess`](super::preprocess).
//!
//! `models/multi-class-pg.json` is a small example in this format (bright
//! images score covid, dark ones nofinding) so the binaries run out of the
//! box. Replace it with a trained model.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::labels::Class;
use super::preprocess::preprocess;
use crate::common::error::InferenceError;

/// Anything that can label an X-ray from its file bytes.
pub trait Classifier {
    fn predict(&self, image_bytes: &[u8]) -> Result<Class, InferenceError>;
}

/// On-disk model format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub labels: Vec<String>,
    pub input_size: u32,
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
}

/// Softmax-linear classifier over preprocessed grayscale pixels.
#[derive(Debug, Clone)]
pub struct LinearClassifier {
    labels: Vec<Class>,
    input_size: u32,
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
}

impl LinearClassifier {
    /// Load and validate a model file.
    ///
    /// # Errors
    /// - The file can't be read or isn't valid JSON
    /// - A label isn't one of `covid`, `nofinding`, `pneumonia`
    /// - Weight or bias dimensions don't match the labels and input size
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let model: LinearModel = serde_json::from_str(&content)?;
        let classifier = Self::from_model(model)?;

        info!(
            "Loaded model {} ({} classes, {}x{} input)",
            path.display(),
            classifier.labels.len(),
            classifier.input_size,
            classifier.input_size
        );
        Ok(classifier)
    }

    pub fn from_model(model: LinearModel) -> Result<Self, InferenceError> {
        if model.labels.is_empty() {
            return Err(InferenceError::InvalidModel("no labels".to_string()));
        }
        if model.input_size == 0 {
            return Err(InferenceError::InvalidModel(
                "input size must be positive".to_string(),
            ));
        }

        let labels = model
            .labels
            .iter()
            .map(|l| l.parse::<Class>())
            .collect::<Result<Vec<_>, _>>()?;

        if model.weights.len() != labels.len() || model.bias.len() != labels.len() {
            return Err(InferenceError::InvalidModel(format!(
                "{} labels but {} weight rows and {} biases",
                labels.len(),
                model.weights.len(),
                model.bias.len()
            )));
        }

        let features = (model.input_size * model.input_size) as usize;
        if let Some(row) = model.weights.iter().position(|w| w.len() != features) {
            return Err(InferenceError::InvalidModel(format!(
                "weight row {} has {} values, expected {}",
                row,
                model.weights[row].len(),
                features
            )));
        }

        Ok(Self {
            labels,
            input_size: model.input_size,
            weights: model.weights,
            bias: model.bias,
        })
    }

    pub fn input_size(&self) -> u32 {
        self.input_size
    }

    /// Class probabilities in label order.
    pub fn probabilities(&self, features: &[f32]) -> Vec<f32> {
        let logits: Vec<f32> = self
            .weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| row.iter().zip(features).map(|(w, x)| w * x).sum::<f32>() + b)
            .collect();
        softmax(&logits)
    }
}

impl Classifier for LinearClassifier {
    fn predict(&self, image_bytes: &[u8]) -> Result<Class, InferenceError> {
        let features = preprocess(image_bytes, self.input_size)?;
        let probs = self.probabilities(&features);

        let (best, confidence) = probs
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::MIN), |acc, (i, p)| if p > acc.1 { (i, p) } else { acc });

        let class = self.labels[best];
        debug!("Predicted {} ({:.3})", class, confidence);
        Ok(class)
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::{Cursor, Write};

    fn png(value: u8) -> Vec<u8> {
        let img = RgbImage::from_pixel(8, 8, Rgb([value, value, value]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    /// Bright images score covid, dark ones nofinding.
    fn brightness_model() -> LinearModel {
        LinearModel {
            labels: vec!["covid".into(), "nofinding".into(), "pneumonia".into()],
            input_size: 2,
            weights: vec![vec![1.0; 4], vec![-1.0; 4], vec![0.0; 4]],
            bias: vec![-2.0, 2.0, -5.0],
        }
    }

    #[test]
    fn test_predicts_by_brightness() {
        let classifier = LinearClassifier::from_model(brightness_model()).unwrap();
        assert_eq!(classifier.predict(&png(255)).unwrap(), Class::Covid);
        assert_eq!(classifier.predict(&png(0)).unwrap(), Class::NoFinding);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let classifier = LinearClassifier::from_model(brightness_model()).unwrap();
        let probs = classifier.probabilities(&[0.5; 4]);
        assert_eq!(probs.len(), 3);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        let mut model = brightness_model();
        model.weights[1] = vec![0.0; 3];
        assert!(matches!(
            LinearClassifier::from_model(model),
            Err(InferenceError::InvalidModel(_))
        ));

        let mut model = brightness_model();
        model.bias.pop();
        assert!(LinearClassifier::from_model(model).is_err());
    }

    #[test]
    fn test_rejects_unknown_label() {
        let mut model = brightness_model();
        model.labels[2] = "tuberculosis".into();
        assert!(matches!(
            LinearClassifier::from_model(model),
            Err(InferenceError::UnknownLabel(l)) if l == "tuberculosis"
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&brightness_model()).unwrap().as_bytes())
            .unwrap();

        let classifier = LinearClassifier::load(file.path()).unwrap();
        assert_eq!(classifier.input_size(), 2);

        assert!(matches!(
            LinearClassifier::load("does/not/exist.json"),
            Err(InferenceError::Io(_))
        ));
    }

    #[test]
    fn test_bundled_example_model_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/models/multi-class-pg.json");
        let classifier = LinearClassifier::load(path).unwrap();
        assert_eq!(classifier.input_size(), 4);
        assert_eq!(classifier.labels, vec![Class::Covid, Class::NoFinding, Class::Pneumonia]);
        assert_eq!(classifier.predict(&png(250)).unwrap(), Class::Covid);
        assert_eq!(classifier.predict(&png(5)).unwrap(), Class::NoFinding);
    }
}
