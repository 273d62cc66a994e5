//! Stage 7 — District Compliance Index (spec.md §4 table, §6 compliance
//! grade cut points). District-level aggregates, YoY delta, state ranking,
//! letter grade.

use async_trait::async_trait;
use pipeline_config::PolicyConfig;
use pipeline_domain::EngineError;
use pipeline_storage::DistrictRepository;
use sqlx::PgPool;

use crate::report::BatchReport;
use crate::stage::Stage;

#[derive(Default)]
pub struct DistrictComplianceStage;

#[async_trait]
impl Stage for DistrictComplianceStage {
    fn name(&self) -> &'static str {
        "district_compliance"
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
        let repo = DistrictRepository::new(pool.clone());
        let rows = repo.recompute(year, &policy.compliance_grades).await?;
        Ok(BatchReport {
            stage: self.name(),
            academic_year: Some(year.to_string()),
            rows_affected: rows,
            elapsed: std::time::Duration::ZERO,
        })
    }
}
