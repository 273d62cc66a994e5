//! Stage 8 — Proposal Validation Engine (spec.md §4.8). Generates
//! deterministic synthetic proposals from the computed gaps, then
//! rule-evaluates them. Both passes are pure Rust (see
//! [`crate::proposal_noise`]); this module only wires them to storage.

use async_trait::async_trait;
use pipeline_config::PolicyConfig;
use pipeline_domain::{EngineError, ProposalRow, ValidationRow};
use pipeline_storage::ProposalRepository;
use sqlx::PgPool;

use crate::proposal_noise::{evaluate, noise_factor, requested_quantity};
use crate::report::BatchReport;
use crate::stage::Stage;

#[derive(Default)]
pub struct ProposalValidationStage;

#[async_trait]
impl Stage for ProposalValidationStage {
    fn name(&self) -> &'static str {
        "proposal_validation"
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
        let repo = ProposalRepository::new(pool.clone());
        let gaps = repo.gaps_for_year(year).await?;

        let mut proposals = Vec::with_capacity(gaps.len());
        let mut validations = Vec::with_capacity(gaps.len());

        for gap in &gaps {
            let noise_cr = noise_factor(
                &gap.school_id,
                &gap.academic_year,
                "classroom",
                &policy.proposal_noise_range,
            );
            let noise_tr = noise_factor(
                &gap.school_id,
                &gap.academic_year,
                "teacher",
                &policy.proposal_noise_range,
            );
            let req_cr = requested_quantity(gap.classroom_gap, noise_cr);
            let req_tr = requested_quantity(gap.teacher_gap, noise_tr);

            proposals.push(ProposalRow {
                school_id: gap.school_id.clone(),
                academic_year: gap.academic_year.clone(),
                classrooms_requested: req_cr,
                teachers_requested: req_tr,
            });

            let outcome = evaluate(gap.classroom_gap, gap.teacher_gap, req_cr, req_tr);
            validations.push(ValidationRow {
                school_id: gap.school_id.clone(),
                academic_year: gap.academic_year.clone(),
                classroom_ratio: outcome.classroom_ratio,
                teacher_ratio: outcome.teacher_ratio,
                decision_status: outcome.decision_status,
                reason_code: outcome.reason_code,
                confidence_score: outcome.confidence_score,
            });
        }

        let mut rows = repo.replace_proposals(year, &proposals).await?;
        rows += repo.replace_validations(year, &validations).await?;

        Ok(BatchReport {
            stage: self.name(),
            academic_year: Some(year.to_string()),
            rows_affected: rows,
            elapsed: std::time::Duration::ZERO,
        })
    }
}
