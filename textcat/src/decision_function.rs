//! Multiclass decision functions over sparse text features.

use bincode::{
    de::Decoder,
    enc::Encoder,
    error::{DecodeError, EncodeError},
    Decode, Encode,
};
use hashbrown::HashSet;

use crate::errors::{CategorizerError, Result};
use crate::text_feature::SparseVector;

/// Scores a sparse feature vector against a fixed set of classes.
pub trait DecisionFunction {
    /// Returns the labels this function can output, in scoring order.
    fn predictable_labels(&self) -> &[u32];

    /// Returns the number of distinct outputs.
    fn number_of_classes(&self) -> usize;

    /// Returns the best scoring label and its score.
    ///
    /// Ties go to the label that comes first in [`predictable_labels()`](Self::predictable_labels).
    fn predict(&self, x: &SparseVector) -> (u32, f64);
}

/// One linear function per class; the class with the largest value wins.
///
/// The score of class `c` is `w_c · x + b_c`.
#[derive(Clone, Debug, PartialEq)]
pub struct MulticlassLinearDecisionFunction {
    labels: Vec<u32>,
    weights: Vec<Vec<f64>>,
    biases: Vec<f64>,
}

impl MulticlassLinearDecisionFunction {
    /// Creates a new decision function.
    ///
    /// # Arguments
    ///
    /// * `labels` - The label of each class.
    /// * `weights` - Dense weight row of each class. Rows may differ in length; missing
    ///               trailing weights are zero.
    /// * `biases` - Bias of each class.
    ///
    /// # Errors
    ///
    /// If the three sequences differ in length, are empty, or `labels` has duplicates, an error
    /// variant will be returned.
    pub fn new(labels: Vec<u32>, weights: Vec<Vec<f64>>, biases: Vec<f64>) -> Result<Self> {
        if labels.is_empty() {
            return Err(CategorizerError::invalid_argument(
                "labels",
                "at least one class is required",
            ));
        }
        if weights.len() != labels.len() || biases.len() != labels.len() {
            return Err(CategorizerError::invalid_argument(
                "weights",
                format!(
                    "{} labels, {} weight rows and {} biases",
                    labels.len(),
                    weights.len(),
                    biases.len()
                ),
            ));
        }
        let mut seen = HashSet::with_capacity(labels.len());
        for &label in &labels {
            if !seen.insert(label) {
                return Err(CategorizerError::invalid_argument(
                    "labels",
                    format!("duplicate label: {label}"),
                ));
            }
        }
        Ok(Self {
            labels,
            weights,
            biases,
        })
    }

    /// Gets the weight rows.
    pub fn weights(&self) -> &[Vec<f64>] {
        &self.weights
    }

    /// Gets the biases.
    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    /// Computes the score of every class, in label order.
    pub fn scores(&self, x: &SparseVector) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.biases)
            .map(|(w, b)| x.dot(w) + b)
            .collect()
    }
}

impl DecisionFunction for MulticlassLinearDecisionFunction {
    fn predictable_labels(&self) -> &[u32] {
        &self.labels
    }

    fn number_of_classes(&self) -> usize {
        self.labels.len()
    }

    fn predict(&self, x: &SparseVector) -> (u32, f64) {
        let scores = self.scores(x);
        let mut best = 0;
        for (i, &score) in scores.iter().enumerate().skip(1) {
            if score > scores[best] {
                best = i;
            }
        }
        (self.labels[best], scores[best])
    }
}

impl Encode for MulticlassLinearDecisionFunction {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        Encode::encode(&self.labels, encoder)?;
        Encode::encode(&self.weights, encoder)?;
        Encode::encode(&self.biases, encoder)?;
        Ok(())
    }
}

impl Decode for MulticlassLinearDecisionFunction {
    fn decode<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        let labels = Decode::decode(decoder)?;
        let weights = Decode::decode(decoder)?;
        let biases = Decode::decode(decoder)?;
        Self::new(labels, weights, biases).map_err(|e| DecodeError::OtherString(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_argmax() {
        let df = MulticlassLinearDecisionFunction::new(
            vec![0, 1, 2],
            vec![vec![1., 0.], vec![0., 1.], vec![0.5, 0.5]],
            vec![0., 0., 0.25],
        )
        .unwrap();
        let x = SparseVector::from_pairs(vec![(0, 1.), (1, 3.)]);

        assert_eq!(vec![1., 3., 2.25], df.scores(&x));
        assert_eq!((1, 3.), df.predict(&x));
    }

    #[test]
    fn test_predict_empty_vector_uses_biases() {
        let df = MulticlassLinearDecisionFunction::new(
            vec![4, 2, 7],
            vec![vec![1.], vec![2.], vec![3.]],
            vec![-1., 0.5, 0.25],
        )
        .unwrap();

        assert_eq!((2, 0.5), df.predict(&SparseVector::default()));
    }

    #[test]
    fn test_predict_tie_goes_to_first_label() {
        let df = MulticlassLinearDecisionFunction::new(
            vec![3, 1, 2],
            vec![vec![], vec![], vec![]],
            vec![1., 1., 1.],
        )
        .unwrap();

        assert_eq!((3, 1.), df.predict(&SparseVector::default()));
    }

    #[test]
    fn test_short_rows_treat_missing_weights_as_zero() {
        let df = MulticlassLinearDecisionFunction::new(
            vec![0, 1],
            vec![vec![1.], vec![0., 0., 5.]],
            vec![0., 0.],
        )
        .unwrap();
        let x = SparseVector::from_pairs(vec![(2, 1.)]);

        assert_eq!((1, 5.), df.predict(&x));
    }

    #[test]
    fn test_number_of_classes() {
        let df = MulticlassLinearDecisionFunction::new(
            vec![0, 5],
            vec![vec![], vec![]],
            vec![0., 0.],
        )
        .unwrap();

        assert_eq!(2, df.number_of_classes());
        assert_eq!(&[0, 5], df.predictable_labels());
    }

    #[test]
    fn test_new_rejects_empty() {
        let df = MulticlassLinearDecisionFunction::new(vec![], vec![], vec![]);

        assert!(matches!(df, Err(CategorizerError::InvalidArgument(_))));
    }

    #[test]
    fn test_decode_reports_inconsistency() {
        let mut buf = vec![];
        let fields = (vec![1u32, 1], vec![Vec::<f64>::new(), vec![]], vec![0f64, 0.]);
        crate::serialization::encode(&fields, &mut buf).unwrap();

        let err = crate::serialization::decode::<MulticlassLinearDecisionFunction, _>(
            &mut buf.as_slice(),
        )
        .unwrap_err();

        assert!(matches!(err, CategorizerError::DecodeError(_)));
        assert!(err.to_string().contains("duplicate label: 1"));
    }

    #[test]
    fn test_new_rejects_length_mismatch() {
        let df = MulticlassLinearDecisionFunction::new(vec![0, 1], vec![vec![]], vec![0., 0.]);

        assert!(matches!(df, Err(CategorizerError::InvalidArgument(_))));
    }

    #[test]
    fn test_new_rejects_duplicate_labels() {
        let df = MulticlassLinearDecisionFunction::new(
            vec![1, 1],
            vec![vec![], vec![]],
            vec![0., 0.],
        );

        assert!(matches!(df, Err(CategorizerError::InvalidArgument(_))));
    }
}
