//! The ten SQL-oriented stages of the pipeline (spec.md §2, §4.1–§4.9):
//! one module per stage, each a stateless [`Stage`] implementation that
//! constructs its own repository from the pool handed to `apply`. Stage 10
//! (the ML forecast) lives in `crates/ml` since it needs a much larger
//! dependency footprint than the rest of this crate.

pub mod budget_allocation;
pub mod compliance_risk;
pub mod dag;
pub mod district_compliance;
pub mod infra_gap;
pub mod prioritisation;
pub mod proposal_noise;
pub mod proposal_validation;
pub mod report;
pub mod risk_trend;
pub mod stage;
pub mod teacher_adequacy;
pub mod wma_forecast;

mod bootstrap;

pub use bootstrap::BootstrapStage;
pub use budget_allocation::BudgetAllocationStage;
pub use dag::{run_with_retry, topological_order};
pub use compliance_risk::ComplianceRiskStage;
pub use district_compliance::DistrictComplianceStage;
pub use infra_gap::InfraGapStage;
pub use prioritisation::PrioritisationStage;
pub use proposal_validation::ProposalValidationStage;
pub use report::BatchReport;
pub use risk_trend::RiskTrendStage;
pub use stage::Stage;
pub use teacher_adequacy::TeacherAdequacyStage;
pub use wma_forecast::WmaForecastStage;

/// The nine stages that own no separate crate, in no particular order —
/// `dag::topological_order` sorts them by `depends_on` before a run. The
/// ML forecast stage (Stage 10, `crates/ml`) is appended by the CLI since
/// it lives outside this crate.
pub fn sql_stages() -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(BootstrapStage),
        Box::new(InfraGapStage),
        Box::new(TeacherAdequacyStage),
        Box::new(ComplianceRiskStage),
        Box::new(PrioritisationStage),
        Box::new(BudgetAllocationStage),
        Box::new(RiskTrendStage),
        Box::new(DistrictComplianceStage),
        Box::new(ProposalValidationStage),
        Box::new(WmaForecastStage),
    ]
}
