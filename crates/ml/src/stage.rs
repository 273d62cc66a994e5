//! Stage 10 — the ML growth-rate forecast (spec.md §4.10), wired into the
//! same `Stage` trait every SQL engine implements even though its own work
//! happens entirely in this crate; storage only sees the panel read and
//! the final bulk insert.

use async_trait::async_trait;
use chrono::Utc;
use pipeline_config::PolicyConfig;
use pipeline_domain::{EngineError, ForecastModel, ForecastRow, ModelArtifactMeta};
use pipeline_engines::{BatchReport, Stage};
use pipeline_storage::{ForecastRepository, ModelArtifactRepository};
use sqlx::PgPool;

use crate::artifact::{ModelArtifact, MODEL_NAME};
use crate::features::{build_projection_samples, build_transitions, fit_encoders};
use crate::gbm::{GbmConfig, GradientBoostedRegressor};

/// Schools below this base-year enrolment are excluded from training —
/// their year-over-year growth rate is dominated by noise at that scale.
const MIN_TRAINING_ENROLMENT: i32 = 10;

#[derive(Default)]
pub struct MlForecastStage;

#[async_trait]
impl Stage for MlForecastStage {
    fn name(&self) -> &'static str {
        "ml_forecast"
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["compliance_risk"]
    }

    /// Ignores `year` — the model trains on the full cross-year panel and
    /// projects once per school from each school's own latest year, not
    /// from a single caller-supplied base year.
    async fn apply(
        &self,
        pool: &PgPool,
        _year: &str,
        policy: &PolicyConfig,
    ) -> Result<BatchReport, EngineError> {
        let forecast_repo = ForecastRepository::new(pool.clone());
        let artifact_repo = ModelArtifactRepository::new(pool.clone());

        let panel = forecast_repo.panel_rows().await?;
        if panel.is_empty() {
            return Ok(BatchReport {
                stage: self.name(),
                academic_year: None,
                rows_affected: 0,
                elapsed: std::time::Duration::ZERO,
            });
        }

        let (district_encoder, management_encoder) = fit_encoders(&panel);
        let transitions = build_transitions(
            &panel,
            &district_encoder,
            &management_encoder,
            policy.forecast_growth_cap,
            MIN_TRAINING_ENROLMENT,
        );

        if transitions.is_empty() {
            tracing::warn!("ml_forecast: no training transitions available, skipping");
            return Ok(BatchReport {
                stage: self.name(),
                academic_year: None,
                rows_affected: 0,
                elapsed: std::time::Duration::ZERO,
            });
        }

        let train_features: Vec<_> = transitions.iter().map(|t| t.features).collect();
        let train_targets: Vec<f64> = transitions.iter().map(|t| t.target).collect();

        let validation_split = (train_features.len() as f64 * 0.8) as usize;
        let (train_x, valid_x) = train_features.split_at(validation_split.max(1).min(train_features.len()));
        let (train_y, valid_y) = train_targets.split_at(validation_split.max(1).min(train_targets.len()));

        let validation = if valid_x.is_empty() {
            None
        } else {
            Some((valid_x, valid_y))
        };

        let mut regressor = GradientBoostedRegressor::fit(train_x, train_y, validation, &GbmConfig::default());

        let projection_samples = build_projection_samples(
            &panel,
            &district_encoder,
            &management_encoder,
            policy.forecast_growth_cap,
        );

        // Calibrate against the projection set, not the training set: the
        // point of bias_shift is to correct drift between the training-epoch
        // and projection-epoch feature distributions (spec.md §4.10).
        let projection_raw_mean = if projection_samples.is_empty() {
            0.0
        } else {
            projection_samples
                .iter()
                .map(|sample| regressor.predict_raw(&sample.features))
                .sum::<f64>()
                / projection_samples.len() as f64
        };
        let train_target_mean = train_targets.iter().sum::<f64>() / train_targets.len().max(1) as f64;
        regressor.bias_shift = train_target_mean - projection_raw_mean;

        let validation_mae = valid_x
            .iter()
            .zip(valid_y)
            .map(|(features, target)| {
                (regressor.predict(features, policy.forecast_growth_cap) - target).abs()
            })
            .sum::<f64>()
            / valid_x.len().max(1) as f64;

        let model_version = format!("{}-{}", MODEL_NAME, Utc::now().format("%Y%m%dT%H%M%S"));
        let artifact = ModelArtifact::new(
            model_version.clone(),
            district_encoder.clone(),
            management_encoder.clone(),
            regressor,
            policy.forecast_growth_cap,
        );

        let mut forecast_rows = Vec::with_capacity(projection_samples.len() * 3);
        for sample in &projection_samples {
            let growth_rate = artifact.predict_growth_rate(&sample.features);
            let mut enrolment = sample.base_enrolment;

            for years_ahead in 1..=3i16 {
                enrolment = ((enrolment as f64) * (1.0 + growth_rate)).round().max(0.0) as i32;
                let classrooms_req = div_ceil(enrolment, policy.classroom_norm.lookup(Some(sample.school_category as u8)));
                let teachers_req = div_ceil(enrolment, policy.ptr_norm.lookup(Some(sample.school_category as u8)));

                forecast_rows.push(ForecastRow {
                    school_id: sample.school_id.clone(),
                    base_year: sample.base_year.clone(),
                    years_ahead,
                    base_enrolment: sample.base_enrolment,
                    growth_rate_used: growth_rate,
                    projected_enrolment: enrolment,
                    projected_classrooms_req: classrooms_req,
                    projected_teachers_req: teachers_req,
                    projected_classroom_gap: 0,
                    projected_teacher_gap: 0,
                    forecast_model: ForecastModel::Gbm,
                    model_version: Some(model_version.clone()),
                });
            }
        }

        let rows = forecast_repo.replace_ml_forecasts(&forecast_rows).await?;

        let meta = ModelArtifactMeta {
            model_version,
            trained_at: Utc::now(),
            training_row_count: transitions.len() as i64,
            validation_mae,
        };
        let artifact_json = serde_json::to_value(&artifact).map_err(|e| {
            EngineError::DataShape(format!("failed to serialize model artifact: {e}"))
        })?;
        artifact_repo.store(&meta, &artifact_json).await?;

        Ok(BatchReport {
            stage: self.name(),
            academic_year: None,
            rows_affected: rows,
            elapsed: std::time::Duration::ZERO,
        })
    }
}

fn div_ceil(numerator: i32, denominator: i32) -> i32 {
    if denominator <= 0 {
        0
    } else {
        (numerator + denominator - 1) / denominator
    }
}
