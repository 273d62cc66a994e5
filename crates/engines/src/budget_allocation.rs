//! Stage 5 — Budget Allocation Simulator (spec.md §4.6). Greedy,
//! priority-ordered, all-or-nothing allocation under fixed classroom/
//! teacher caps; depends on Stage 4's `school_priority_index` for
//! allocation order.

use async_trait::async_trait;
use pipeline_config::PolicyConfig;
use pipeline_domain::EngineError;
use pipeline_storage::BudgetRepository;
use sqlx::PgPool;

use crate::report::BatchReport;
use crate::stage::Stage;

#[derive(Default)]
pub struct BudgetAllocationStage;

#[async_trait]
impl Stage for BudgetAllocationStage {
    fn name(&self) -> &'static str {
        "budget_allocation"
    }

    fn depends_on(&self) -> &'static [&'static str] {
        &["prioritisation"]
    }

    async fn apply(
        &self,
        pool: &PgPool,
        year: &str,
        policy: &PolicyConfig,
    ) -> Result<BatchReport, EngineError> {
        let repo = BudgetRepository::new(pool.clone());
        let rows = repo.allocate(year, &policy.budget).await?;
        Ok(BatchReport {
            stage: self.name(),
            academic_year: Some(year.to_string()),
            rows_affected: rows,
            elapsed: std::time::Duration::ZERO,
        })
    }
}
