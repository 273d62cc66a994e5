//! The serializable bundle persisted to `ml_model_artifacts`: everything
//! projection needs to reproduce training-time behaviour without
//! re-reading the panel or re-fitting encoders.

use serde::{Deserialize, Serialize};

use crate::encoding::LabelEncoder;
use crate::features::FEATURE_NAMES;
use crate::gbm::GradientBoostedRegressor;

pub const MODEL_NAME: &str = "gbm-huber-v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model_version: String,
    pub feature_names: Vec<String>,
    pub district_encoder: LabelEncoder,
    pub management_encoder: LabelEncoder,
    pub regressor: GradientBoostedRegressor,
    pub forecast_growth_cap: f64,
}

impl ModelArtifact {
    pub fn new(
        model_version: String,
        district_encoder: LabelEncoder,
        management_encoder: LabelEncoder,
        regressor: GradientBoostedRegressor,
        forecast_growth_cap: f64,
    ) -> Self {
        Self {
            model_version,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            district_encoder,
            management_encoder,
            regressor,
            forecast_growth_cap,
        }
    }

    pub fn predict_growth_rate(&self, features: &[f64]) -> f64 {
        self.regressor.predict(features, self.forecast_growth_cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gbm::GbmConfig;

    #[test]
    fn round_trips_through_json() {
        let district = LabelEncoder::fit(["A", "B"].into_iter());
        let management = LabelEncoder::fit(["Government", "Private"].into_iter());
        let features = [[0.0; crate::features::NUM_FEATURES]; 4];
        let targets = [0.1, 0.1, 0.1, 0.1];
        let regressor = GradientBoostedRegressor::fit(&features, &targets, None, &GbmConfig::default());

        let artifact = ModelArtifact::new(
            "2024-25.1".to_string(),
            district,
            management,
            regressor,
            0.30,
        );

        let json = serde_json::to_value(&artifact).expect("serializes");
        let restored: ModelArtifact = serde_json::from_value(json).expect("deserializes");
        assert_eq!(restored.feature_names.len(), FEATURE_NAMES.len());
        assert_eq!(restored.model_version, "2024-25.1");
    }
}
