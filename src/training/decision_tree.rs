//! Decision tree base learner
//!
//! Binary CART: gini impurity for classification leaves, variance for the
//! regression trees that gradient boosting fits on residuals.

use crate::error::{LoanPredictorError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// Split quality criterion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Criterion {
    /// Gini impurity, binary classification
    Gini,
    /// Variance reduction, regression
    Mse,
}

/// Decision tree model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub criterion: Criterion,
}

/// Gini impurity of a binary partition from counts
fn gini(count: usize, positives: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let p = positives as f64 / count as f64;
    2.0 * p * (1.0 - p)
}

/// Variance from running sums: E[y²] - E[y]²
fn variance(count: usize, sum: f64, sq_sum: f64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let n = count as f64;
    (sq_sum / n - (sum / n).powi(2)).max(0.0)
}

impl DecisionTree {
    /// Create a classifier tree (gini)
    pub fn new_classifier() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            criterion: Criterion::Gini,
        }
    }

    /// Create a regressor tree (variance)
    pub fn new_regressor() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            criterion: Criterion::Mse,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set minimum samples to split a node
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples;
        self
    }

    /// Set minimum samples in a leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Fit the tree to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();

        if n_samples != y.len() {
            return Err(LoanPredictorError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(LoanPredictorError::ValidationError(
                "cannot fit tree on empty data".to_string(),
            ));
        }

        let indices: Vec<usize> = (0..n_samples).collect();
        self.root = Some(self.build_tree(x, y, &indices, 0));
        Ok(self)
    }

    fn build_tree(&self, x: &Array2<f64>, y: &Array1<f64>, indices: &[usize], depth: usize) -> TreeNode {
        let n_samples = indices.len();

        let should_stop = n_samples < self.min_samples_split
            || self.max_depth.map_or(false, |d| depth >= d)
            || self.is_pure(y, indices);

        if should_stop {
            return TreeNode::Leaf {
                value: self.leaf_value(y, indices),
            };
        }

        let Some((feature, threshold)) = self.find_best_split(x, y, indices) else {
            return TreeNode::Leaf {
                value: self.leaf_value(y, indices),
            };
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, feature]] <= threshold);

        if left_indices.len() < self.min_samples_leaf || right_indices.len() < self.min_samples_leaf {
            return TreeNode::Leaf {
                value: self.leaf_value(y, indices),
            };
        }

        let left = Box::new(self.build_tree(x, y, &left_indices, depth + 1));
        let right = Box::new(self.build_tree(x, y, &right_indices, depth + 1));

        TreeNode::Split {
            feature,
            threshold,
            left,
            right,
        }
    }

    /// Scan every feature with a single sorted sweep, tracking running
    /// counts/sums so each candidate threshold is O(1) to evaluate.
    fn find_best_split(&self, x: &Array2<f64>, y: &Array1<f64>, indices: &[usize]) -> Option<(usize, f64)> {
        let n = indices.len();
        let parent = self.node_impurity(y, indices);

        let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
        let total_pos = indices.iter().filter(|&&i| y[i] > 0.5).count();

        let mut best_gain = 1e-12;
        let mut best: Option<(usize, f64)> = None;

        for feature in 0..x.ncols() {
            let mut order = indices.to_vec();
            order.sort_by(|&a, &b| {
                x[[a, feature]]
                    .partial_cmp(&x[[b, feature]])
                    .unwrap_or(Ordering::Equal)
            });

            let mut left_n = 0usize;
            let mut left_sum = 0.0f64;
            let mut left_sq = 0.0f64;
            let mut left_pos = 0usize;

            for k in 1..n {
                let i = order[k - 1];
                left_n += 1;
                left_sum += y[i];
                left_sq += y[i] * y[i];
                if y[i] > 0.5 {
                    left_pos += 1;
                }

                let lo = x[[order[k - 1], feature]];
                let hi = x[[order[k], feature]];
                if hi - lo < 1e-12 {
                    continue;
                }
                if left_n < self.min_samples_leaf || n - left_n < self.min_samples_leaf {
                    continue;
                }

                let right_n = n - left_n;
                let (left_imp, right_imp) = match self.criterion {
                    Criterion::Gini => (
                        gini(left_n, left_pos),
                        gini(right_n, total_pos - left_pos),
                    ),
                    Criterion::Mse => (
                        variance(left_n, left_sum, left_sq),
                        variance(right_n, total_sum - left_sum, total_sq - left_sq),
                    ),
                };

                let weighted =
                    (left_n as f64 * left_imp + right_n as f64 * right_imp) / n as f64;
                let gain = parent - weighted;
                if gain > best_gain {
                    best_gain = gain;
                    best = Some((feature, (lo + hi) / 2.0));
                }
            }
        }

        best
    }

    fn node_impurity(&self, y: &Array1<f64>, indices: &[usize]) -> f64 {
        let n = indices.len();
        match self.criterion {
            Criterion::Gini => {
                let positives = indices.iter().filter(|&&i| y[i] > 0.5).count();
                gini(n, positives)
            }
            Criterion::Mse => {
                let sum: f64 = indices.iter().map(|&i| y[i]).sum();
                let sq_sum: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
                variance(n, sum, sq_sum)
            }
        }
    }

    fn is_pure(&self, y: &Array1<f64>, indices: &[usize]) -> bool {
        match indices.split_first() {
            None => true,
            Some((&first, rest)) => rest.iter().all(|&i| (y[i] - y[first]).abs() < 1e-10),
        }
    }

    fn leaf_value(&self, y: &Array1<f64>, indices: &[usize]) -> f64 {
        if indices.is_empty() {
            return 0.0;
        }
        match self.criterion {
            Criterion::Gini => {
                // Majority class; ties go to the negative class
                let positives = indices.iter().filter(|&&i| y[i] > 0.5).count();
                if positives * 2 > indices.len() {
                    1.0
                } else {
                    0.0
                }
            }
            Criterion::Mse => {
                indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
            }
        }
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(LoanPredictorError::ModelNotFitted)?;

        let predictions: Vec<f64> = (0..x.nrows())
            .map(|i| {
                let mut node = root;
                loop {
                    match node {
                        TreeNode::Leaf { value } => return *value,
                        TreeNode::Split {
                            feature,
                            threshold,
                            left,
                            right,
                        } => {
                            node = if x[[i, *feature]] <= *threshold {
                                left
                            } else {
                                right
                            };
                        }
                    }
                }
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    /// Depth of the fitted tree
    pub fn depth(&self) -> usize {
        fn node_depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
            }
        }
        self.root.as_ref().map_or(0, node_depth)
    }
}
