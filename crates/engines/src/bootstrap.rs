//! Stage 0 — schema bootstrap (spec.md §4.1). Thin `Stage` wrapper around
//! `pipeline_storage::bootstrap_schema`; ignores `year` like the other
//! whole-series passes.

use async_trait::async_trait;
use pipeline_config::PolicyConfig;
use pipeline_domain::EngineError;
use sqlx::PgPool;

use crate::report::BatchReport;
use crate::stage::Stage;

pub struct BootstrapStage;

#[async_trait]
impl Stage for BootstrapStage {
    fn name(&self) -> &'static str {
        "bootstrap"
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &[]
    }

    async fn apply(
        &self,
        pool: &PgPool,
        _year: &str,
        _policy: &PolicyConfig,
    ) -> Result<BatchReport, EngineError> {
        pipeline_storage::bootstrap_schema(pool).await?;
        Ok(BatchReport {
            stage: self.name(),
            academic_year: None,
            rows_affected: 0,
            elapsed: std::time::Duration::ZERO,
        })
    }
}
