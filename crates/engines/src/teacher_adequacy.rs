//! Stage 2 — Teacher Adequacy Engine (spec.md §4.3). Same shape as Stage 1,
//! over `teacher_metrics` with the PTR norm table.

use async_trait::async_trait;
use pipeline_config::PolicyConfig;
use pipeline_domain::EngineError;
use pipeline_storage::TeacherRepository;
use sqlx::PgPool;

use crate::report::BatchReport;
use crate::stage::Stage;

#[derive(Default)]
pub struct TeacherAdequacyStage;

#[async_trait]
impl Stage for TeacherAdequacyStage {
    fn name(&self) -> &'static str {
        "teacher_adequacy"
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
        let repo = TeacherRepository::new(pool.clone());
        let rows = repo.apply_teacher_gap(year, &policy.ptr_norm).await?;
        Ok(BatchReport {
            stage: self.name(),
            academic_year: Some(year.to_string()),
            rows_affected: rows,
            elapsed: std::time::Duration::ZERO,
        })
    }
}
