//! Tree-ensemble inference
//!
//! Trees use the flat parallel-array layout of fitted decision trees:
//! node `i` splits on `feature[i]` at `threshold[i]`, going left when
//! `x[feature] <= threshold`. A node is a leaf when `children_left[i] == -1`;
//! `value[i]` holds per-class counts (classifiers) or `[mean]` (regressors).

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const LEAF: i64 = -1;

/// Single fitted decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

impl Tree {
    /// Tree consisting of one leaf
    pub fn leaf(value: Vec<f64>) -> Self {
        Self {
            children_left: vec![LEAF],
            children_right: vec![LEAF],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![value],
        }
    }

    /// Depth-one tree splitting on `feature` at `threshold`
    pub fn stump(feature: usize, threshold: f64, left: Vec<f64>, right: Vec<f64>) -> Self {
        Self {
            children_left: vec![1, LEAF, LEAF],
            children_right: vec![2, LEAF, LEAF],
            feature: vec![feature as i64, -2, -2],
            threshold: vec![threshold, -2.0, -2.0],
            value: vec![Vec::new(), left, right],
        }
    }

    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn validate(&self, n_features: usize, leaf_width: Option<usize>) -> Result<()> {
        let n = self.node_count();
        if n == 0 {
            return Err(Error::Model("tree has no nodes".to_string()));
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err(Error::Model("tree arrays differ in length".to_string()));
        }

        for i in 0..n {
            let (left, right) = (self.children_left[i], self.children_right[i]);
            if left == LEAF {
                if let Some(width) = leaf_width {
                    if self.value[i].len() != width {
                        return Err(Error::Model(format!(
                            "leaf {} has {} values, expected {}",
                            i,
                            self.value[i].len(),
                            width
                        )));
                    }
                } else if self.value[i].is_empty() {
                    return Err(Error::Model(format!("leaf {} has no value", i)));
                }
                continue;
            }
            // Children always come after their parent, so traversal terminates
            let in_range = |c: i64| c > i as i64 && (c as usize) < n;
            if !in_range(left) || !in_range(right) {
                return Err(Error::Model(format!("node {} has invalid children", i)));
            }
            let feature = self.feature[i];
            if feature < 0 || feature as usize >= n_features {
                return Err(Error::Model(format!(
                    "node {} splits on feature {} of {}",
                    i, feature, n_features
                )));
            }
        }
        Ok(())
    }

    /// Leaf value reached by `row`
    fn apply(&self, row: &[f64]) -> Result<&[f64]> {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            let x = row.get(feature).ok_or_else(|| {
                Error::Model(format!("row has {} features, tree needs {}", row.len(), feature + 1))
            })?;
            node = if *x <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        Ok(&self.value[node])
    }
}

/// Fitted ensemble estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    /// Averages normalized leaf class distributions
    Classifier { classes: Vec<f64>, trees: Vec<Tree> },
    /// Averages leaf means
    Regressor { trees: Vec<Tree> },
}

impl Estimator {
    fn trees(&self) -> &[Tree] {
        match self {
            Estimator::Classifier { trees, .. } | Estimator::Regressor { trees } => trees,
        }
    }

    pub fn is_classifier(&self) -> bool {
        matches!(self, Estimator::Classifier { .. })
    }

    /// Check tree structure against the expected row width
    pub fn validate(&self, n_features: usize) -> Result<()> {
        let trees = self.trees();
        if trees.is_empty() {
            return Err(Error::Model("estimator has no trees".to_string()));
        }
        let leaf_width = match self {
            Estimator::Classifier { classes, .. } => {
                if classes.is_empty() {
                    return Err(Error::Model("classifier has no classes".to_string()));
                }
                Some(classes.len())
            }
            Estimator::Regressor { .. } => None,
        };
        trees
            .iter()
            .enumerate()
            .try_for_each(|(i, tree)| {
                tree.validate(n_features, leaf_width)
                    .map_err(|e| Error::Model(format!("tree {}: {}", i, e)))
            })
    }

    fn check_row(&self, row: &[f64]) -> Result<()> {
        if row.iter().any(|v| !v.is_finite()) {
            return Err(Error::Model("input row contains non-finite values".to_string()));
        }
        Ok(())
    }

    /// Class probabilities, in `classes` order
    pub fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>> {
        self.check_row(row)?;
        let (classes, trees) = match self {
            Estimator::Classifier { classes, trees } => (classes, trees),
            Estimator::Regressor { .. } => {
                return Err(Error::Model("predict_proba on a regressor".to_string()))
            }
        };

        let mut proba = vec![0.0; classes.len()];
        for tree in trees {
            let leaf = tree.apply(row)?;
            let total: f64 = leaf.iter().sum();
            if total > 0.0 {
                for (p, v) in proba.iter_mut().zip(leaf) {
                    *p += v / total;
                }
            }
        }
        let n = trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        Ok(proba)
    }

    /// Most probable class label, or the regression estimate
    pub fn predict(&self, row: &[f64]) -> Result<f64> {
        match self {
            Estimator::Classifier { classes, .. } => {
                let proba = self.predict_proba(row)?;
                // First maximum wins on ties
                let best = proba
                    .iter()
                    .enumerate()
                    .fold(0, |best, (i, p)| if *p > proba[best] { i } else { best });
                Ok(classes[best])
            }
            Estimator::Regressor { trees } => {
                self.check_row(row)?;
                let mut sum = 0.0;
                for tree in trees {
                    sum += tree
                        .apply(row)?
                        .first()
                        .ok_or_else(|| Error::Model("empty regression leaf".to_string()))?;
                }
                Ok(sum / trees.len() as f64)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Estimator {
        Estimator::Classifier {
            classes: vec![0.0, 1.0],
            trees: vec![
                Tree::stump(0, 5.0, vec![9.0, 1.0], vec![1.0, 3.0]),
                Tree::stump(1, 0.5, vec![1.0, 1.0], vec![0.0, 4.0]),
            ],
        }
    }

    #[test]
    fn test_classifier_proba_averages_normalized_leaves() {
        let model = classifier();
        let proba = model.predict_proba(&[3.0, 0.0]).unwrap();
        // tree 1: [0.9, 0.1], tree 2: [0.5, 0.5]
        assert!((proba[0] - 0.7).abs() < 1e-9);
        assert!((proba[1] - 0.3).abs() < 1e-9);
        assert_eq!(model.predict(&[3.0, 0.0]).unwrap(), 0.0);

        let proba = model.predict_proba(&[6.0, 1.0]).unwrap();
        assert!((proba[1] - 0.875).abs() < 1e-9);
        assert_eq!(model.predict(&[6.0, 1.0]).unwrap(), 1.0);
    }

    #[test]
    fn test_threshold_is_inclusive_on_left() {
        let model = Estimator::Regressor {
            trees: vec![Tree::stump(0, 5.0, vec![1.0], vec![2.0])],
        };
        assert_eq!(model.predict(&[5.0]).unwrap(), 1.0);
        assert_eq!(model.predict(&[5.0001]).unwrap(), 2.0);
    }

    #[test]
    fn test_regressor_averages_trees() {
        let model = Estimator::Regressor {
            trees: vec![Tree::leaf(vec![6.0]), Tree::leaf(vec![7.0])],
        };
        assert_eq!(model.predict(&[]).unwrap(), 6.5);
        assert!(model.predict_proba(&[]).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_feature_index() {
        assert!(classifier().validate(2).is_ok());
        assert!(classifier().validate(1).is_err());
    }

    #[test]
    fn test_validate_rejects_leaf_width_mismatch() {
        let model = Estimator::Classifier {
            classes: vec![0.0, 1.0, 2.0],
            trees: vec![Tree::leaf(vec![1.0, 2.0])],
        };
        assert!(model.validate(0).is_err());
    }

    #[test]
    fn test_validate_rejects_backward_children() {
        let mut tree = Tree::stump(0, 1.0, vec![1.0], vec![1.0]);
        tree.children_left[0] = 0;
        let model = Estimator::Regressor { trees: vec![tree] };
        assert!(model.validate(1).is_err());
    }

    #[test]
    fn test_non_finite_row_is_rejected() {
        assert!(classifier().predict(&[f64::NAN, 0.0]).is_err());
    }

    #[test]
    fn test_short_row_is_rejected() {
        assert!(classifier().predict(&[1.0]).is_err());
    }

    #[test]
    fn test_deserialize_tagged_estimator() {
        let json = r#"{
            "kind": "regressor",
            "trees": [{
                "children_left": [-1], "children_right": [-1],
                "feature": [-2], "threshold": [-2.0], "value": [[4.4]]
            }]
        }"#;
        let model: Estimator = serde_json::from_str(json).unwrap();
        assert!(!model.is_classifier());
        assert_eq!(model.predict(&[]).unwrap(), 4.4);
    }
}
