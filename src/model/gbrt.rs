use serde::Deserialize;

use crate::model::{InferenceError, ModelError, Predictor};

/// Gradient boosted regression trees: `init + learning_rate * Σ tree(x)`.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "GbrtArtifact")]
pub struct GradientBoostingModel {
    n_features_in: Option<usize>,
    init: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct GbrtArtifact {
    #[serde(default)]
    n_features_in: Option<usize>,
    init: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl TryFrom<GbrtArtifact> for GradientBoostingModel {
    type Error = ModelError;

    fn try_from(raw: GbrtArtifact) -> Result<Self, Self::Error> {
        GradientBoostingModel::new(raw.n_features_in, raw.init, raw.learning_rate, raw.trees)
    }
}

impl GradientBoostingModel {
    pub fn new(
        n_features_in: Option<usize>,
        init: f64,
        learning_rate: f64,
        trees: Vec<RegressionTree>,
    ) -> Result<Self, ModelError> {
        if !init.is_finite() {
            return Err(ModelError::Invalid("init is not finite".to_string()));
        }
        if !learning_rate.is_finite() {
            return Err(ModelError::Invalid("learning_rate is not finite".to_string()));
        }
        if n_features_in == Some(0) {
            return Err(ModelError::Invalid("n_features_in must be positive".to_string()));
        }
        for (t, tree) in trees.iter().enumerate() {
            validate_tree(t, tree, n_features_in)?;
        }
        Ok(Self {
            n_features_in,
            init,
            learning_rate,
            trees,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

// Children must point strictly forward, so every walk ends at a leaf.
fn validate_tree(
    t: usize,
    tree: &RegressionTree,
    n_features_in: Option<usize>,
) -> Result<(), ModelError> {
    if tree.nodes.is_empty() {
        return Err(ModelError::Invalid(format!("tree {} has no nodes", t)));
    }
    let n = tree.nodes.len();
    for (i, node) in tree.nodes.iter().enumerate() {
        match *node {
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if left <= i || right <= i || left >= n || right >= n {
                    return Err(ModelError::Invalid(format!(
                        "tree {} node {}: children ({}, {}) must point forward within {} nodes",
                        t, i, left, right, n
                    )));
                }
                if threshold.is_nan() {
                    return Err(ModelError::Invalid(format!(
                        "tree {} node {}: threshold is NaN",
                        t, i
                    )));
                }
                if let Some(width) = n_features_in {
                    if feature >= width {
                        return Err(ModelError::Invalid(format!(
                            "tree {} node {}: feature {} outside declared width {}",
                            t, i, feature, width
                        )));
                    }
                }
            }
            TreeNode::Leaf { value } => {
                if !value.is_finite() {
                    return Err(ModelError::Invalid(format!(
                        "tree {} node {}: leaf value is not finite",
                        t, i
                    )));
                }
            }
        }
    }
    Ok(())
}

fn eval_tree(tree: &RegressionTree, features: &[f64]) -> Result<f64, InferenceError> {
    let mut idx = 0usize;
    loop {
        match tree.nodes[idx] {
            TreeNode::Leaf { value } => return Ok(value),
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                let x = *features
                    .get(feature)
                    .ok_or(InferenceError::FeatureOutOfRange {
                        feature,
                        len: features.len(),
                    })?;
                idx = if x <= threshold { left } else { right };
            }
        }
    }
}

impl Predictor for GradientBoostingModel {
    fn expected_feature_count(&self) -> Option<usize> {
        self.n_features_in
    }

    fn predict(&self, features: &[f64]) -> Result<f64, InferenceError> {
        let mut sum = 0.0f64;
        for tree in &self.trees {
            sum += eval_tree(tree, features)?;
        }
        Ok(self.init + self.learning_rate * sum)
    }
}
