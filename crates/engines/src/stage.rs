//! The `Stage` trait every engine implements (spec.md §9 "Pipeline
//! orchestration"): a narrow interface, parameterised SQL owned by
//! `pipeline-storage`, no dynamic row dispatch.

use async_trait::async_trait;
use pipeline_config::PolicyConfig;
use pipeline_domain::EngineError;
use sqlx::PgPool;

use crate::report::BatchReport;

#[async_trait]
pub trait Stage: Send + Sync {
    /// Stable identifier used in `--from`/`--to` cuts and DAG metadata.
    fn name(&self) -> &'static str;

    /// Names of stages that must have already run (spec.md §2 dependency
    /// order).
    fn depends_on(&self) -> &'static [&'static str];

    /// Apply this stage for one academic year. Bootstrap and the
    /// whole-series passes (growth rate, WMA forecast) ignore `year`.
    async fn apply(
        &self,
        pool: &PgPool,
        year: &str,
        policy: &PolicyConfig,
    ) -> Result<BatchReport, EngineError>;
}
