//! Stage 9 — Weighted Moving Average forecast (spec.md §4.9). Whole-series
//! pass: `year` is ignored, each school's own latest observed year is its
//! base year (computed inside `ForecastRepository::recompute_wma`, whose
//! `LAG` windows run before any per-school filtering — spec.md §9's
//! non-negotiable "inner scope, outer filter" contract).

use async_trait::async_trait;
use pipeline_config::PolicyConfig;
use pipeline_domain::EngineError;
use pipeline_storage::ForecastRepository;
use sqlx::PgPool;

use crate::report::BatchReport;
use crate::stage::Stage;

#[derive(Default)]
pub struct WmaForecastStage;

#[async_trait]
impl Stage for WmaForecastStage {
    fn name(&self) -> &'static str {
        "wma_forecast"
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["compliance_risk"]
    }

    async fn apply(
        &self,
        pool: &PgPool,
        _year: &str,
        policy: &PolicyConfig,
    ) -> Result<BatchReport, EngineError> {
        let repo = ForecastRepository::new(pool.clone());
        let rows = repo
            .recompute_wma(
                policy.forecast_growth_cap,
                &policy.classroom_norm,
                &policy.ptr_norm,
            )
            .await?;
        Ok(BatchReport {
            stage: self.name(),
            academic_year: None,
            rows_affected: rows,
            elapsed: std::time::Duration::ZERO,
        })
    }
}
