//! Stage 3 — Compliance Risk Engine (spec.md §4.4). Three ordered passes:
//! deficit ratios (per year), enrolment YoY growth (whole series, runs
//! unconditionally every call since it's idempotent and the `LAG` window
//! needs every year in scope regardless of which year triggered this
//! batch), and the composite score/classification (per year).

use async_trait::async_trait;
use pipeline_config::PolicyConfig;
use pipeline_domain::EngineError;
use pipeline_storage::InfrastructureRepository;
use sqlx::PgPool;

use crate::report::BatchReport;
use crate::stage::Stage;

#[derive(Default)]
pub struct ComplianceRiskStage;

#[async_trait]
impl Stage for ComplianceRiskStage {
    fn name(&self) -> &'static str {
        "compliance_risk"
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["infra_gap", "teacher_adequacy"]
    }

    async fn apply(
        &self,
        pool: &PgPool,
        year: &str,
        policy: &PolicyConfig,
    ) -> Result<BatchReport, EngineError> {
        let repo = InfrastructureRepository::new(pool.clone());

        let mut rows = repo.apply_deficit_ratios(year).await?;
        rows += repo.apply_growth_rates().await?;
        rows += repo
            .apply_risk_score_and_level(
                year,
                &policy.risk_weights,
                &policy.risk_bands,
                policy.growth_cap_risk,
            )
            .await?;

        Ok(BatchReport {
            stage: self.name(),
            academic_year: Some(year.to_string()),
            rows_affected: rows,
            elapsed: std::time::Duration::ZERO,
        })
    }
}
