//! Stage 10 (spec.md §4.10): a gradient-boosted growth-rate regressor
//! trained and projected in-process, outside SQL, then bulk-written back
//! through `pipeline-storage` alongside the Stage 9 WMA forecast it shares
//! a table with.

pub mod artifact;
pub mod encoding;
pub mod features;
pub mod gbm;
pub mod stage;
pub mod tree;

pub use artifact::ModelArtifact;
pub use encoding::LabelEncoder;
pub use gbm::{GbmConfig, GradientBoostedRegressor};
pub use stage::MlForecastStage;
