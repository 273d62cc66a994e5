//! Entity and computed-row types for every table in the schema (spec §3).
//! Raw-fact entities mirror the four ingestion-owned tables; the rest are
//! the row shapes each stage writes, one struct per output table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::enums::{
    AllocationStatus, ComplianceGrade, DecisionStatus, ForecastModel, PriorityBucket, ReasonCode,
    RiskLevel, TrendDirection,
};

/// `schools` — dimension table, owned by ingestion. Never mutated by the
/// pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct School {
    pub school_id: String,
    pub school_name: Option<String>,
    pub district: String,
    pub block: String,
    pub management_type: String,
    /// UDISE+ structure code, 1..=11.
    pub school_category: i16,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// `yearly_metrics` — raw enrolment fact, owned by ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct YearlyEnrolmentFact {
    pub school_id: String,
    pub academic_year: String,
    pub total_enrolment: i32,
    pub attendance_rate: Option<f64>,
}

/// `infrastructure_details` — raw columns owned by ingestion; computed
/// columns (`required_class_rooms` through `risk_level`) owned by Stage 1
/// (Infra Gap) and Stage 3 (Compliance Risk).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct InfrastructureFact {
    pub school_id: String,
    pub academic_year: String,

    pub total_class_rooms: i32,
    pub usable_class_rooms: i32,
    pub classroom_condition_score: i32,
    pub has_drinking_water: bool,
    pub has_electricity: bool,
    pub has_internet: bool,
    pub has_girls_toilet: bool,
    pub has_cwsn_toilet: bool,
    pub has_ramp: bool,
    pub has_resource_room: bool,
    pub building_condition: String,
    pub last_major_repair_year: Option<i32>,

    pub required_class_rooms: Option<i32>,
    pub classroom_gap: Option<i32>,
    pub teacher_deficit_ratio: Option<f64>,
    pub classroom_deficit_ratio: Option<f64>,
    pub enrolment_growth_rate: Option<f64>,
    pub risk_score: Option<f64>,
    pub risk_level: Option<RiskLevel>,
}

/// `teacher_metrics` — raw column owned by ingestion; computed columns
/// owned by Stage 2 (Teacher Adequacy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TeacherFact {
    pub school_id: String,
    pub academic_year: String,
    pub total_teachers: i32,
    pub required_teachers: Option<i32>,
    pub teacher_gap: Option<i32>,
}

/// `school_priority_index` — written by Stage 4 (Prioritisation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PriorityRow {
    pub school_id: String,
    pub academic_year: String,
    pub risk_score: f64,
    /// Dense rank within year, 1 = highest risk (ties share rank).
    pub risk_rank: i32,
    pub percentile: f64,
    pub priority_bucket: PriorityBucket,
    pub persistent_high_risk: bool,
}

/// `budget_allocations` — written by Stage 5 (Budget Allocation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct BudgetRow {
    pub school_id: String,
    pub academic_year: String,
    pub classrooms_allocated: i32,
    pub teachers_allocated: i32,
    pub estimated_cost: f64,
    /// Running total over priority order within the year.
    pub cumulative_cost: f64,
    pub allocation_status: AllocationStatus,
}

/// `risk_trends` — written by Stage 6 (Risk Trend).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TrendRow {
    pub school_id: String,
    pub academic_year: String,
    pub prev_risk_score: Option<f64>,
    pub risk_delta: Option<f64>,
    pub trend_direction: TrendDirection,
    pub is_chronic: bool,
    pub is_volatile: bool,
}

/// `district_compliance` — written by Stage 7 (District Compliance).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DistrictComplianceRow {
    pub district: String,
    pub academic_year: String,
    pub total_schools: i32,
    pub avg_risk_score: f64,
    pub pct_critical: f64,
    pub pct_high: f64,
    pub pct_moderate: f64,
    pub pct_low: f64,
    pub compliance_grade: ComplianceGrade,
    pub yoy_risk_change: Option<f64>,
    pub state_rank: i32,
}

/// `demand_proposals` — written by Stage 8's synthetic-proposal pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProposalRow {
    pub school_id: String,
    pub academic_year: String,
    pub classrooms_requested: i32,
    pub teachers_requested: i32,
}

/// `proposal_validations` — written by Stage 8's rule evaluation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ValidationRow {
    pub school_id: String,
    pub academic_year: String,
    pub classroom_ratio: f64,
    pub teacher_ratio: f64,
    pub decision_status: DecisionStatus,
    pub reason_code: ReasonCode,
    pub confidence_score: f64,
}

/// `enrolment_forecasts` — written by Stage 9 (WMA) and Stage 10 (ML).
/// Identity is `(school_id, base_year, years_ahead, forecast_model)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ForecastRow {
    pub school_id: String,
    pub base_year: String,
    pub years_ahead: i16,
    pub base_enrolment: i32,
    pub growth_rate_used: f64,
    pub projected_enrolment: i32,
    pub projected_classrooms_req: i32,
    pub projected_teachers_req: i32,
    pub projected_classroom_gap: i32,
    pub projected_teacher_gap: i32,
    pub forecast_model: ForecastModel,
    pub model_version: Option<String>,
}

/// `ml_model_artifacts` — the 12th table (spec.md §4.1), persisting the
/// trained regressor as a single versioned row (spec.md §9 "ML model
/// artefacts").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ModelArtifactMeta {
    pub model_version: String,
    pub trained_at: DateTime<Utc>,
    pub training_row_count: i64,
    pub validation_mae: f64,
}
