//! A single CART-style regression tree, fit by exhaustive variance-reduction
//! split search. This is the weak learner `gbm::GradientBoostedRegressor`
//! boosts over — nothing here knows about the Huber loss or pseudo-residual
//! reweighting the booster applies before calling `fit`.

use serde::{Deserialize, Serialize};

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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    root: TreeNode,
}

pub struct TreeFitConfig {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Fraction of feature indices considered at each split (stochastic
    /// column subsampling, matching the booster's row subsampling).
    pub feature_subsample: f64,
}

impl RegressionTree {
    /// Fit one tree against `targets` (typically pseudo-residuals, not raw
    /// labels) over the rows selected by `sample_indices`, with leaf values
    /// computed by `leaf_value` (Huber-robust, not a plain mean, per
    /// `gbm.rs`).
    pub fn fit(
        features: &[[f64; crate::features::NUM_FEATURES]],
        targets: &[f64],
        sample_indices: &[usize],
        config: &TreeFitConfig,
        rng: &mut impl rand::Rng,
        leaf_value: &impl Fn(&[usize], &[f64]) -> f64,
    ) -> Self {
        let root = build_node(
            features,
            targets,
            sample_indices,
            0,
            config,
            rng,
            leaf_value,
        );
        Self { root }
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        predict_node(&self.root, features)
    }
}

fn predict_node(node: &TreeNode, features: &[f64]) -> f64 {
    match node {
        TreeNode::Leaf { value } => *value,
        TreeNode::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if features[*feature] <= *threshold {
                predict_node(left, features)
            } else {
                predict_node(right, features)
            }
        }
    }
}

fn build_node(
    features: &[[f64; crate::features::NUM_FEATURES]],
    targets: &[f64],
    indices: &[usize],
    depth: usize,
    config: &TreeFitConfig,
    rng: &mut impl rand::Rng,
    leaf_value: &impl Fn(&[usize], &[f64]) -> f64,
) -> TreeNode {
    if depth >= config.max_depth || indices.len() < 2 * config.min_samples_leaf {
        return TreeNode::Leaf {
            value: leaf_value(indices, targets),
        };
    }

    match best_split(features, targets, indices, config, rng) {
        Some((feature, threshold, left_indices, right_indices)) => {
            let left = build_node(
                features,
                targets,
                &left_indices,
                depth + 1,
                config,
                rng,
                leaf_value,
            );
            let right = build_node(
                features,
                targets,
                &right_indices,
                depth + 1,
                config,
                rng,
                leaf_value,
            );
            TreeNode::Split {
                feature,
                threshold,
                left: Box::new(left),
                right: Box::new(right),
            }
        }
        None => TreeNode::Leaf {
            value: leaf_value(indices, targets),
        },
    }
}

fn variance_sum(indices: &[usize], targets: &[f64]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    let mean = indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64;
    indices
        .iter()
        .map(|&i| (targets[i] - mean).powi(2))
        .sum::<f64>()
}

#[allow(clippy::type_complexity)]
fn best_split(
    features: &[[f64; crate::features::NUM_FEATURES]],
    targets: &[f64],
    indices: &[usize],
    config: &TreeFitConfig,
    rng: &mut impl rand::Rng,
) -> Option<(usize, f64, Vec<usize>, Vec<usize>)> {
    use rand::seq::SliceRandom;

    let num_features = crate::features::NUM_FEATURES;
    let mut candidate_features: Vec<usize> = (0..num_features).collect();
    candidate_features.shuffle(rng);
    let take = ((num_features as f64 * config.feature_subsample).ceil() as usize)
        .clamp(1, num_features);
    candidate_features.truncate(take);

    let parent_variance = variance_sum(indices, targets);
    let mut best: Option<(usize, f64, Vec<usize>, Vec<usize>, f64)> = None;

    for feature in candidate_features {
        let mut values: Vec<f64> = indices.iter().map(|&i| features[i][feature]).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        values.dedup();
        if values.len() < 2 {
            continue;
        }

        for window in values.windows(2) {
            let threshold = (window[0] + window[1]) / 2.0;
            let (left, right): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| features[i][feature] <= threshold);

            if left.len() < config.min_samples_leaf || right.len() < config.min_samples_leaf {
                continue;
            }

            let gain = parent_variance - variance_sum(&left, targets) - variance_sum(&right, targets);
            if best.as_ref().map(|(.., best_gain)| gain > *best_gain).unwrap_or(true) {
                best = Some((feature, threshold, left, right, gain));
            }
        }
    }

    best.filter(|(.., gain)| *gain > 1e-9)
        .map(|(feature, threshold, left, right, _)| (feature, threshold, left, right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::NUM_FEATURES;
    use rand::SeedableRng;

    fn mean_leaf(indices: &[usize], targets: &[f64]) -> f64 {
        indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64
    }

    #[test]
    fn splits_on_the_separating_feature() {
        let mut features = vec![[0.0; NUM_FEATURES]; 4];
        features[0][0] = 1.0;
        features[1][0] = 2.0;
        features[2][0] = 10.0;
        features[3][0] = 11.0;
        let targets = vec![1.0, 1.0, 10.0, 10.0];
        let indices: Vec<usize> = (0..4).collect();

        let config = TreeFitConfig {
            max_depth: 3,
            min_samples_leaf: 1,
            feature_subsample: 1.0,
        };
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let tree = RegressionTree::fit(&features, &targets, &indices, &config, &mut rng, &mean_leaf);

        assert!((tree.predict(&features[0]) - 1.0).abs() < 1e-6);
        assert!((tree.predict(&features[2]) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn shallow_depth_falls_back_to_leaf() {
        let features = vec![[0.0; NUM_FEATURES], [5.0; NUM_FEATURES]];
        let targets = vec![1.0, 9.0];
        let indices = vec![0, 1];
        let config = TreeFitConfig {
            max_depth: 0,
            min_samples_leaf: 1,
            feature_subsample: 1.0,
        };
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let tree = RegressionTree::fit(&features, &targets, &indices, &config, &mut rng, &mean_leaf);
        assert!((tree.predict(&features[0]) - 5.0).abs() < 1e-6);
    }
}
