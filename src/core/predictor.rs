/// Single-sequence inference: embed, average, reduce, classify, threshold.
use crate::model::ModelBundle;
use crate::{BgcError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Minimum confidence for a class to be reported
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> Result<Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(BgcError::InvalidThreshold(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

impl TryFrom<f64> for Threshold {
    type Error = BgcError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Threshold> for f64 {
    fn from(threshold: Threshold) -> f64 {
        threshold.0
    }
}

/// Outcome for one sequence. `label` is `None` when the best class fell
/// below the threshold; `confidence` is reported either way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Option<String>,
    pub confidence: f64,
}

impl Prediction {
    pub fn is_assigned(&self) -> bool {
        self.label.is_some()
    }
}

/// Mean of the embedding vectors of every in-vocabulary residue. Unknown
/// residues are skipped, so the mean runs over the surviving count.
pub fn sequence_representation(residues: &[u8], bundle: &ModelBundle) -> Result<Vec<f64>> {
    let vocabulary = bundle.embedding();
    let mut sum = vec![0.0_f64; vocabulary.dimension()];
    let mut known = 0usize;

    for vector in residues.iter().filter_map(|&r| vocabulary.vector(r)) {
        for (s, v) in sum.iter_mut().zip(vector) {
            *s += f64::from(*v);
        }
        known += 1;
    }

    if known == 0 {
        return Err(BgcError::EmptyEmbedding);
    }

    let count = known as f64;
    sum.iter_mut().for_each(|s| *s /= count);
    Ok(sum)
}

/// Index and value of the largest probability. Ties keep the lowest index;
/// NaN never wins.
pub fn best_class(probabilities: &[f64]) -> Option<(usize, f64)> {
    probabilities
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, p)| !p.is_nan())
        .fold(None, |best, (i, p)| match best {
            Some((_, best_p)) if p <= best_p => best,
            _ => Some((i, p)),
        })
}

/// Classify one sequence against a bundle
pub fn predict(residues: &[u8], bundle: &ModelBundle, threshold: Threshold) -> Result<Prediction> {
    let representation = sequence_representation(residues, bundle)?;
    let reduced = bundle.reducer().transform(&representation)?;
    let probabilities = bundle.classifier().predict_proba(&reduced)?;

    if probabilities.len() != bundle.labels().len() {
        return Err(BgcError::Model(format!(
            "classifier returned {} probabilities for {} labels",
            probabilities.len(),
            bundle.labels().len()
        )));
    }

    let (index, confidence) = best_class(&probabilities)
        .ok_or_else(|| BgcError::Model("classifier returned no usable probabilities".to_string()))?;

    let label = if confidence >= threshold.value() {
        Some(bundle.labels().inverse_transform(index)?.to_string())
    } else {
        None
    };

    Ok(Prediction { label, confidence })
}

/// A bundle paired with a threshold, cheap to clone into worker threads
#[derive(Debug, Clone)]
pub struct Predictor {
    bundle: Arc<ModelBundle>,
    threshold: Threshold,
}

impl Predictor {
    pub fn new(bundle: Arc<ModelBundle>) -> Self {
        Self {
            bundle,
            threshold: Threshold::default(),
        }
    }

    pub fn with_threshold(mut self, threshold: Threshold) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    pub fn predict(&self, residues: &[u8]) -> Result<Prediction> {
        predict(residues, &self.bundle, self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        DecisionTree, LabelEncoder, LinearProjection, RandomForest, Reducer, ResidueEmbedding, TreeNode,
    };
    use rstest::rstest;

    /// One-dimensional bundle: 'A' embeds to 1.0, 'C' to 0.0; a stump at 0.5
    /// gives [0.4, 0.6] on the left and [0.7, 0.3] on the right.
    fn bundle() -> ModelBundle {
        let embedding = ResidueEmbedding::new(1, vec![(b'A', vec![1.0]), (b'C', vec![0.0])]).unwrap();
        let forest = RandomForest::new(
            1,
            2,
            vec![DecisionTree::new(vec![
                TreeNode::Split { feature: 0, threshold: 0.5, left: 1, right: 2 },
                TreeNode::Leaf { value: vec![4.0, 6.0] },
                TreeNode::Leaf { value: vec![7.0, 3.0] },
            ])],
        )
        .unwrap();
        let labels = LabelEncoder::new(vec!["A".into(), "B".into()]).unwrap();
        ModelBundle::new(forest, labels, Reducer::Linear(LinearProjection::identity(1)), embedding).unwrap()
    }

    #[test]
    fn test_unknown_residues_are_skipped() {
        let b = bundle();
        // X and Z are out of vocabulary: mean over A, A, C only
        let rep = sequence_representation(b"AXACZ", &b).unwrap();
        assert!((rep[0] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[rstest]
    #[case(b"XXXX")]
    #[case(b"")]
    fn test_empty_embedding(#[case] residues: &[u8]) {
        let err = predict(residues, &bundle(), Threshold::default()).unwrap_err();
        assert!(matches!(err, BgcError::EmptyEmbedding));
    }

    #[test]
    fn test_assigned_above_threshold() {
        let p = predict(b"AAA", &bundle(), Threshold::default()).unwrap();
        assert_eq!(p, Prediction { label: Some("A".into()), confidence: 0.7 });
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let exact = predict(b"AAA", &bundle(), Threshold::new(0.7).unwrap()).unwrap();
        assert_eq!(exact.label.as_deref(), Some("A"));

        let above = predict(b"AAA", &bundle(), Threshold::new(0.7 + f64::EPSILON).unwrap()).unwrap();
        assert_eq!(above.label, None);
        assert_eq!(above.confidence, 0.7);
    }

    #[rstest]
    #[case(-0.01)]
    #[case(1.5)]
    #[case(f64::NAN)]
    fn test_invalid_threshold(#[case] value: f64) {
        assert!(matches!(Threshold::new(value), Err(BgcError::InvalidThreshold(_))));
    }

    #[test]
    fn test_threshold_bounds_accepted() {
        assert!(Threshold::new(0.0).is_ok());
        assert!(Threshold::new(1.0).is_ok());
    }

    #[test]
    fn test_best_class_ties_take_first() {
        assert_eq!(best_class(&[0.25, 0.5, 0.25, 0.5]), Some((1, 0.5)));
        assert_eq!(best_class(&[f64::NAN, 0.1]), Some((1, 0.1)));
        assert_eq!(best_class(&[]), None);
    }

    #[test]
    fn test_predictor_uses_its_threshold() {
        let predictor = Predictor::new(Arc::new(bundle())).with_threshold(Threshold::new(0.9).unwrap());
        let p = predictor.predict(b"C").unwrap();
        assert_eq!(p, Prediction { label: None, confidence: 0.6 });
    }
}
