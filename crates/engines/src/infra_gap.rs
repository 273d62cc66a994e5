//! Stage 1 — Infrastructure Gap Engine (spec.md §4.2). One set-oriented
//! UPDATE per academic year; all arithmetic delegated to the store.

use async_trait::async_trait;
use pipeline_config::PolicyConfig;
use pipeline_domain::EngineError;
use pipeline_storage::InfrastructureRepository;
use sqlx::PgPool;

use crate::report::BatchReport;
use crate::stage::Stage;

#[derive(Default)]
pub struct InfraGapStage;

#[async_trait]
impl Stage for InfraGapStage {
    fn name(&self) -> &'static str {
        "infra_gap"
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["bootstrap"]
    }

    async fn apply(
        &self,
        pool: &PgPool,
        year: &str,
        policy: &PolicyConfig,
    ) -> Result<BatchReport, EngineError> {
        let repo = InfrastructureRepository::new(pool.clone());
        let rows = repo.apply_classroom_gap(year, &policy.classroom_norm).await?;
        Ok(BatchReport {
            stage: self.name(),
            academic_year: Some(year.to_string()),
            rows_affected: rows,
            elapsed: std::time::Duration::ZERO,
        })
    }
}
