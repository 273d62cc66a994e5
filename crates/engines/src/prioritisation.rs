//! Stage 4 — Prioritisation Engine (spec.md §4.5). DELETE-then-INSERT
//! `school_priority_index` per academic year; rank/percentile/bucket and
//! the 3-year persistence flag are all window functions in
//! `PriorityRepository::recompute`.

use async_trait::async_trait;
use pipeline_config::PolicyConfig;
use pipeline_domain::EngineError;
use pipeline_storage::PriorityRepository;
use sqlx::PgPool;

use crate::report::BatchReport;
use crate::stage::Stage;

#[derive(Default)]
pub struct PrioritisationStage;

#[async_trait]
impl Stage for PrioritisationStage {
    fn name(&self) -> &'static str {
        "prioritisation"
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
        let repo = PriorityRepository::new(pool.clone());
        let rows = repo.recompute(year, &policy.priority_buckets).await?;
        Ok(BatchReport {
            stage: self.name(),
            academic_year: Some(year.to_string()),
            rows_affected: rows,
            elapsed: std::time::Duration::ZERO,
        })
    }
}
