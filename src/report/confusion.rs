//! 2×2 confusion matrix over reduced labels.
//!
//! Laid out in sorted label order, `covid` first:
//!
//! ```text
//!                     predicted covid   predicted nofinding
//! actual covid              tn                 fp
//! actual nofinding          fn                 tp
//! ```

use std::collections::BTreeSet;

use crate::common::error::MetricsError;
use crate::inference::BinaryLabel;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tp: usize,
}

impl ConfusionMatrix {
    /// Count `(actual, predicted)` pairs.
    ///
    /// # Errors
    /// - [`MetricsError::NoResults`] for no pairs
    /// - [`MetricsError::NotEnoughData`] when only one label occurs across
    ///   actual and predicted values, so no 2×2 matrix exists
    pub fn from_pairs<I>(pairs: I) -> Result<Self, MetricsError>
    where
        I: IntoIterator<Item = (BinaryLabel, BinaryLabel)>,
    {
        let mut matrix = Self::default();
        let mut seen = BTreeSet::new();

        for (actual, predicted) in pairs {
            seen.insert(actual);
            seen.insert(predicted);
            match (actual, predicted) {
                (BinaryLabel::Covid, BinaryLabel::Covid) => matrix.tn += 1,
                (BinaryLabel::Covid, BinaryLabel::NoFinding) => matrix.fp += 1,
                (BinaryLabel::NoFinding, BinaryLabel::Covid) => matrix.fn_ += 1,
                (BinaryLabel::NoFinding, BinaryLabel::NoFinding) => matrix.tp += 1,
            }
        }

        match seen.len() {
            0 => Err(MetricsError::NoResults),
            2 => Ok(matrix),
            found => Err(MetricsError::NotEnoughData(found)),
        }
    }

    pub fn total(&self) -> usize {
        self.tn + self.fp + self.fn_ + self.tp
    }

    /// `(tp + tn) / n`
    pub fn accuracy(&self) -> Result<f64, MetricsError> {
        ratio(self.tp + self.tn, self.total(), "accuracy")
    }

    /// `tn / (tn + fp)`
    pub fn specificity(&self) -> Result<f64, MetricsError> {
        ratio(self.tn, self.tn + self.fp, "specificity")
    }

    /// Per-label recall averaged with weights equal to each label's support.
    ///
    /// A label that never occurs as an actual value has zero weight.
    pub fn weighted_recall(&self) -> Result<f64, MetricsError> {
        let n = self.total();
        if n == 0 {
            return Err(MetricsError::Undefined("sensitivity"));
        }

        let per_label = [(self.tn, self.tn + self.fp), (self.tp, self.fn_ + self.tp)];
        let weighted: f64 = per_label
            .iter()
            .filter(|(_, support)| *support > 0)
            .map(|(hits, support)| {
                let recall = *hits as f64 / *support as f64;
                recall * (*support as f64 / n as f64)
            })
            .sum();

        Ok(weighted)
    }
}

fn ratio(num: usize, den: usize, metric: &'static str) -> Result<f64, MetricsError> {
    if den == 0 {
        return Err(MetricsError::Undefined(metric));
    }
    Ok(num as f64 / den as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::BinaryLabel::{Covid as C, NoFinding as N};

    #[test]
    fn test_layout() {
        let m = ConfusionMatrix::from_pairs(vec![(C, C), (C, C), (C, N), (N, C), (N, N), (N, N), (N, N)])
            .unwrap();
        assert_eq!(m, ConfusionMatrix { tn: 2, fp: 1, fn_: 1, tp: 3 });
        assert_eq!(m.total(), 7);
        assert!((m.accuracy().unwrap() - 5.0 / 7.0).abs() < 1e-12);
        assert!((m.specificity().unwrap() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_recall_equals_accuracy() {
        let m = ConfusionMatrix { tn: 5, fp: 3, fn_: 2, tp: 10 };
        let expected = (5.0 / 8.0) * (8.0 / 20.0) + (10.0 / 12.0) * (12.0 / 20.0);
        assert!((m.weighted_recall().unwrap() - expected).abs() < 1e-12);
        assert!((m.weighted_recall().unwrap() - m.accuracy().unwrap()).abs() < 1e-12);
    }

    #[test]
    fn test_single_label_is_not_enough() {
        assert_eq!(
            ConfusionMatrix::from_pairs(vec![(C, C), (C, C)]),
            Err(MetricsError::NotEnoughData(1))
        );
        assert_eq!(
            ConfusionMatrix::from_pairs(Vec::<(BinaryLabel, BinaryLabel)>::new()),
            Err(MetricsError::NoResults)
        );
    }

    #[test]
    fn test_specificity_undefined_without_actual_covid() {
        let m = ConfusionMatrix::from_pairs(vec![(N, C), (N, N)]).unwrap();
        assert_eq!(m.specificity(), Err(MetricsError::Undefined("specificity")));
        assert!((m.weighted_recall().unwrap() - 0.5).abs() < 1e-12);
    }
}
