//! Gradient-boosted regression over Huber loss (Friedman's `TreeBoost-M`),
//! the growth-rate regressor spec.md §4.10 calls for. No gradient-boosting
//! crate turned up anywhere in the retrieval pack, so this is hand-rolled
//! on top of `tree.rs` and the already-present `ndarray`/`rand`
//! dependencies rather than reaching for an unreviewed one.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::features::NUM_FEATURES;
use crate::tree::{RegressionTree, TreeFitConfig};

#[derive(Debug, Clone)]
pub struct GbmConfig {
    pub num_trees: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub subsample: f64,
    pub feature_subsample: f64,
    pub huber_quantile: f64,
    pub early_stopping_patience: usize,
    pub seed: u64,
}

impl Default for GbmConfig {
    fn default() -> Self {
        Self {
            num_trees: 200,
            learning_rate: 0.05,
            max_depth: 4,
            min_samples_leaf: 20,
            subsample: 0.8,
            feature_subsample: 0.8,
            huber_quantile: 0.9,
            early_stopping_patience: 30,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostedRegressor {
    trees: Vec<RegressionTree>,
    learning_rate: f64,
    init_value: f64,
    pub bias_shift: f64,
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = values.len();
    if n == 0 {
        0.0
    } else if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let idx = ((sorted.len() - 1) as f64 * q).round() as usize;
    sorted[idx]
}

fn clip(x: f64, cap: f64) -> f64 {
    x.clamp(-cap, cap)
}

fn huber_loss(residuals: &[f64], delta: f64) -> f64 {
    residuals
        .iter()
        .map(|&r| {
            if r.abs() <= delta {
                0.5 * r * r
            } else {
                delta * (r.abs() - 0.5 * delta)
            }
        })
        .sum::<f64>()
        / residuals.len().max(1) as f64
}

impl GradientBoostedRegressor {
    /// Fit against `train_targets`, holding out `validation` (if given)
    /// purely for early stopping — it never contributes to a split or a
    /// leaf value.
    pub fn fit(
        train_features: &[[f64; NUM_FEATURES]],
        train_targets: &[f64],
        validation: Option<(&[[f64; NUM_FEATURES]], &[f64])>,
        config: &GbmConfig,
    ) -> Self {
        let n = train_targets.len();
        let init_value = median(&mut train_targets.to_vec());
        let mut predictions = vec![init_value; n];
        let mut valid_predictions =
            validation.map(|(_, targets)| vec![init_value; targets.len()]);

        let mut rng = rand::rngs::StdRng::seed_from_u64(config.seed);
        let mut trees = Vec::with_capacity(config.num_trees);
        let mut best_valid_loss = f64::INFINITY;
        let mut best_num_trees = 0;
        let mut rounds_without_improvement = 0;

        for _ in 0..config.num_trees {
            let residuals: Vec<f64> = train_targets
                .iter()
                .zip(&predictions)
                .map(|(y, f)| y - f)
                .collect();

            let abs_residuals: Vec<f64> = residuals.iter().map(|r| r.abs()).collect();
            let delta = quantile(&abs_residuals, config.huber_quantile).max(1e-6);

            let pseudo_residuals: Vec<f64> =
                residuals.iter().map(|&r| clip(r, delta)).collect();

            let mut all_indices: Vec<usize> = (0..n).collect();
            all_indices.shuffle(&mut rng);
            let sample_size = ((n as f64 * config.subsample).ceil() as usize).clamp(1, n);
            let sample_indices: Vec<usize> = all_indices.into_iter().take(sample_size).collect();

            let tree_config = TreeFitConfig {
                max_depth: config.max_depth,
                min_samples_leaf: config.min_samples_leaf,
                feature_subsample: config.feature_subsample,
            };

            let leaf_value = |indices: &[usize], _: &[f64]| -> f64 {
                let mut leaf_residuals: Vec<f64> =
                    indices.iter().map(|&i| residuals[i]).collect();
                let med = median(&mut leaf_residuals.clone());
                let correction = leaf_residuals
                    .iter()
                    .map(|r| clip(r - med, delta))
                    .sum::<f64>()
                    / leaf_residuals.len().max(1) as f64;
                med + correction
            };

            let tree = RegressionTree::fit(
                train_features,
                &pseudo_residuals,
                &sample_indices,
                &tree_config,
                &mut rng,
                &leaf_value,
            );

            for (i, row) in train_features.iter().enumerate() {
                predictions[i] += config.learning_rate * tree.predict(row);
            }

            if let (Some((valid_features, valid_targets)), Some(valid_preds)) =
                (validation, valid_predictions.as_mut())
            {
                for (i, row) in valid_features.iter().enumerate() {
                    valid_preds[i] += config.learning_rate * tree.predict(row);
                }
                let valid_residuals: Vec<f64> = valid_targets
                    .iter()
                    .zip(valid_preds.iter())
                    .map(|(y, f)| y - f)
                    .collect();
                let valid_loss = huber_loss(&valid_residuals, delta);

                trees.push(tree);

                if valid_loss < best_valid_loss - 1e-9 {
                    best_valid_loss = valid_loss;
                    best_num_trees = trees.len();
                    rounds_without_improvement = 0;
                } else {
                    rounds_without_improvement += 1;
                    if rounds_without_improvement >= config.early_stopping_patience {
                        break;
                    }
                }
            } else {
                trees.push(tree);
            }
        }

        if validation.is_some() && best_num_trees > 0 {
            trees.truncate(best_num_trees);
        }

        Self {
            trees,
            learning_rate: config.learning_rate,
            init_value,
            bias_shift: 0.0,
        }
    }

    /// Uncalibrated prediction before `bias_shift` is applied — callers
    /// fitting the shift against a separate projection set need this
    /// directly (spec.md §4.10: the shift corrects for drift between the
    /// training epoch and the projection epoch, so it cannot be measured
    /// from training-set predictions alone).
    pub fn predict_raw(&self, features: &[f64]) -> f64 {
        self.init_value
            + self
                .trees
                .iter()
                .map(|tree| self.learning_rate * tree.predict(features))
                .sum::<f64>()
    }

    /// Bias-calibrated prediction, re-clipped to `cap` since the
    /// calibration shift can push a boundary prediction back out of range.
    pub fn predict(&self, features: &[f64], cap: f64) -> f64 {
        clip(self.predict_raw(features) + self.bias_shift, cap)
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(x: f64) -> [f64; NUM_FEATURES] {
        let mut f = [0.0; NUM_FEATURES];
        f[0] = x;
        f
    }

    #[test]
    fn fits_a_simple_linear_relationship() {
        let train_features: Vec<[f64; NUM_FEATURES]> =
            (0..40).map(|i| features(i as f64)).collect();
        let train_targets: Vec<f64> = (0..40).map(|i| 0.01 * i as f64).collect();

        let config = GbmConfig {
            num_trees: 50,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 2,
            subsample: 1.0,
            feature_subsample: 1.0,
            huber_quantile: 0.9,
            early_stopping_patience: 50,
            seed: 1,
        };

        let regressor = GradientBoostedRegressor::fit(&train_features, &train_targets, None, &config);

        let predicted_low = regressor.predict(&features(2.0), 1.0);
        let predicted_high = regressor.predict(&features(38.0), 1.0);
        assert!(predicted_high > predicted_low);
    }

    #[test]
    fn predictions_stay_within_the_clip_cap() {
        let train_features: Vec<[f64; NUM_FEATURES]> =
            (0..20).map(|i| features(i as f64)).collect();
        let train_targets: Vec<f64> = vec![5.0; 20];

        let config = GbmConfig {
            num_trees: 10,
            ..GbmConfig::default()
        };
        let regressor = GradientBoostedRegressor::fit(&train_features, &train_targets, None, &config);
        let prediction = regressor.predict(&features(100.0), 0.30);
        assert!(prediction <= 0.30 && prediction >= -0.30);
    }

    #[test]
    fn early_stopping_does_not_exceed_configured_trees() {
        let train_features: Vec<[f64; NUM_FEATURES]> =
            (0..30).map(|i| features(i as f64)).collect();
        let train_targets: Vec<f64> = (0..30).map(|i| 0.02 * i as f64).collect();
        let valid_features: Vec<[f64; NUM_FEATURES]> =
            (0..10).map(|i| features(i as f64 + 30.0)).collect();
        let valid_targets: Vec<f64> = vec![0.0; 10];

        let config = GbmConfig {
            num_trees: 300,
            early_stopping_patience: 5,
            ..GbmConfig::default()
        };
        let regressor = GradientBoostedRegressor::fit(
            &train_features,
            &train_targets,
            Some((&valid_features, &valid_targets)),
            &config,
        );
        assert!(regressor.num_trees() <= 300);
    }
}
