/// Random forest classifier: an ensemble of decision trees whose leaf class
/// distributions are averaged.
use super::ProbabilityModel;
use crate::{BgcError, Result};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// `sample[feature] <= threshold` goes left, anything else right
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Per-class weights (counts or fractions) at this leaf
    Leaf { value: Vec<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Node 0 is the root
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
}

impl DecisionTree {
    pub fn new(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split { feature, left, right, threshold } => {
                    if *feature >= n_features {
                        return Err(format!("node {} splits on feature {} of {}", i, feature, n_features));
                    }
                    if *left >= self.nodes.len() || *right >= self.nodes.len() {
                        return Err(format!("node {} points outside the tree", i));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {} has a NaN threshold", i));
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(format!("leaf {} has {} classes, expected {}", i, value.len(), n_classes));
                    }
                    if value.iter().any(|v| *v < 0.0 || !v.is_finite()) || value.iter().sum::<f64>() <= 0.0 {
                        return Err(format!("leaf {} has no usable class weights", i));
                    }
                }
            }
        }
        Ok(())
    }

    /// Leaf reached by a sample. Walks at most `nodes.len()` steps so a
    /// cyclic tree cannot hang the caller.
    fn leaf(&self, sample: &[f64]) -> Result<&[f64]> {
        let mut index = 0;
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { value }) => return Ok(value),
                Some(TreeNode::Split { feature, threshold, left, right }) => {
                    let x = sample.get(*feature).copied().unwrap_or(f64::NAN);
                    index = if x <= *threshold { *left } else { *right };
                }
                None => break,
            }
        }
        Err(BgcError::Model("decision tree walk did not reach a leaf".to_string()))
    }
}

impl RandomForest {
    pub fn new(n_features: usize, n_classes: usize, trees: Vec<DecisionTree>) -> Result<Self> {
        let forest = Self {
            n_features,
            n_classes,
            trees,
        };
        forest.validate().map_err(BgcError::Model)?;
        Ok(forest)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.n_classes == 0 {
            return Err("forest has no classes".to_string());
        }
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.n_classes)
                .map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }
}

impl ProbabilityModel for RandomForest {
    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, sample: &[f64]) -> Result<Vec<f64>> {
        if sample.len() != self.n_features {
            return Err(BgcError::Model(format!(
                "classifier expects {} features, got {}",
                self.n_features,
                sample.len()
            )));
        }

        let mut proba = Array1::<f64>::zeros(self.n_classes);
        for tree in &self.trees {
            let leaf = ArrayView1::from(tree.leaf(sample)?);
            let total = leaf.sum();
            proba += &leaf.mapv(|v| v / total);
        }

        proba /= self.trees.len() as f64;
        Ok(proba.to_vec())
    }

    fn validate(&self) -> std::result::Result<(), String> {
        RandomForest::validate(self)
    }

    fn describe(&self) -> String {
        format!(
            "random forest ({} trees, {} features, {} classes)",
            self.trees.len(),
            self.n_features,
            self.n_classes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn stump(threshold: f64, left: Vec<f64>, right: Vec<f64>) -> DecisionTree {
        DecisionTree::new(vec![
            TreeNode::Split { feature: 0, threshold, left: 1, right: 2 },
            TreeNode::Leaf { value: left },
            TreeNode::Leaf { value: right },
        ])
    }

    #[test]
    fn test_threshold_goes_left() {
        let forest = RandomForest::new(1, 2, vec![stump(0.5, vec![4.0, 6.0], vec![7.0, 3.0])]).unwrap();
        assert_eq!(forest.predict_proba(&[0.5]).unwrap(), vec![0.4, 0.6]);
        assert_eq!(forest.predict_proba(&[0.51]).unwrap(), vec![0.7, 0.3]);
    }

    #[test]
    fn test_trees_are_averaged() {
        let forest = RandomForest::new(
            1,
            2,
            vec![stump(0.0, vec![1.0, 0.0], vec![1.0, 0.0]), stump(0.0, vec![0.0, 1.0], vec![0.0, 1.0])],
        )
        .unwrap();
        let proba = forest.predict_proba(&[1.0]).unwrap();
        assert_eq!(proba, vec![0.5, 0.5]);
    }

    #[test]
    fn test_cycle_is_an_error() {
        let forest = RandomForest {
            n_features: 1,
            n_classes: 1,
            trees: vec![DecisionTree::new(vec![TreeNode::Split { feature: 0, threshold: 0.0, left: 0, right: 0 }])],
        };
        assert!(forest.validate().is_ok());
        assert!(forest.predict_proba(&[1.0]).is_err());
    }

    #[test]
    fn test_rejects_dangling_child() {
        let tree = DecisionTree::new(vec![TreeNode::Split { feature: 0, threshold: 0.0, left: 1, right: 9 }]);
        assert!(RandomForest::new(1, 2, vec![tree]).is_err());
    }

    #[test]
    fn test_feature_count_checked() {
        let forest = RandomForest::new(1, 2, vec![stump(0.5, vec![1.0, 1.0], vec![1.0, 1.0])]).unwrap();
        assert!(forest.predict_proba(&[0.1, 0.2]).is_err());
    }
}
