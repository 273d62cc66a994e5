//! Stage 6 — Risk Trend Engine (spec.md §4.7). LAG-based delta,
//! IMPROVING/STABLE/DETERIORATING classification, chronic/volatile flags.

use async_trait::async_trait;
use pipeline_config::PolicyConfig;
use pipeline_domain::EngineError;
use pipeline_storage::TrendRepository;
use sqlx::PgPool;

use crate::report::BatchReport;
use crate::stage::Stage;

#[derive(Default)]
pub struct RiskTrendStage;

#[async_trait]
impl Stage for RiskTrendStage {
    fn name(&self) -> &'static str {
        "risk_trend"
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["compliance_risk"]
    }

    async fn apply(
        &self,
        pool: &PgPool,
        year: &str,
        policy: &PolicyConfig,
    ) -> Result<BatchReport, EngineError> {
        let repo = TrendRepository::new(pool.clone());
        let rows = repo
            .recompute(year, policy.trend_band, policy.volatile_threshold)
            .await?;
        Ok(BatchReport {
            stage: self.name(),
            academic_year: Some(year.to_string()),
            rows_affected: rows,
            elapsed: std::time::Duration::ZERO,
        })
    }
}
