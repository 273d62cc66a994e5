//! Stage 0 — schema bootstrap (spec.md §4.1).
//!
//! Idempotent DDL: every statement tolerates re-running against an
//! already-bootstrapped database. `sqlx::raw_sql` rather than
//! `sqlx::migrate!` so bootstrap stays a pipeline stage in its own right —
//! re-runnable on demand, not tied to a separate migration history.

use sqlx::PgPool;

use crate::StorageError;

const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS schools (
    school_id       TEXT PRIMARY KEY,
    school_name     TEXT,
    district        TEXT NOT NULL,
    block           TEXT NOT NULL,
    management_type TEXT NOT NULL,
    school_category SMALLINT NOT NULL,
    latitude        DOUBLE PRECISION,
    longitude       DOUBLE PRECISION
);

CREATE TABLE IF NOT EXISTS yearly_metrics (
    id               BIGSERIAL PRIMARY KEY,
    school_id        TEXT NOT NULL REFERENCES schools(school_id),
    academic_year    TEXT NOT NULL,
    total_enrolment  INTEGER NOT NULL,
    attendance_rate  DOUBLE PRECISION,
    UNIQUE (school_id, academic_year)
);

CREATE TABLE IF NOT EXISTS infrastructure_details (
    id                        BIGSERIAL PRIMARY KEY,
    school_id                 TEXT NOT NULL REFERENCES schools(school_id),
    academic_year             TEXT NOT NULL,
    total_class_rooms         INTEGER NOT NULL,
    usable_class_rooms        INTEGER NOT NULL,
    classroom_condition_score INTEGER NOT NULL,
    has_drinking_water        BOOLEAN NOT NULL,
    has_electricity           BOOLEAN NOT NULL,
    has_internet              BOOLEAN NOT NULL,
    has_girls_toilet          BOOLEAN NOT NULL,
    has_cwsn_toilet           BOOLEAN NOT NULL,
    has_ramp                  BOOLEAN NOT NULL,
    has_resource_room         BOOLEAN NOT NULL,
    building_condition        TEXT NOT NULL,
    last_major_repair_year    INTEGER,
    required_class_rooms      INTEGER,
    classroom_gap             INTEGER,
    teacher_deficit_ratio     DOUBLE PRECISION,
    classroom_deficit_ratio   DOUBLE PRECISION,
    enrolment_growth_rate     DOUBLE PRECISION,
    risk_score                DOUBLE PRECISION,
    risk_level                TEXT,
    UNIQUE (school_id, academic_year)
);

CREATE TABLE IF NOT EXISTS teacher_metrics (
    id                 BIGSERIAL PRIMARY KEY,
    school_id          TEXT NOT NULL REFERENCES schools(school_id),
    academic_year      TEXT NOT NULL,
    total_teachers     INTEGER NOT NULL,
    required_teachers  INTEGER,
    teacher_gap        INTEGER,
    UNIQUE (school_id, academic_year)
);

CREATE TABLE IF NOT EXISTS school_priority_index (
    school_id             TEXT NOT NULL,
    academic_year         TEXT NOT NULL,
    risk_score            DOUBLE PRECISION NOT NULL,
    risk_rank             INTEGER NOT NULL,
    percentile            DOUBLE PRECISION NOT NULL,
    priority_bucket       TEXT NOT NULL,
    persistent_high_risk  BOOLEAN NOT NULL,
    PRIMARY KEY (school_id, academic_year)
);

CREATE TABLE IF NOT EXISTS budget_allocations (
    school_id           TEXT NOT NULL,
    academic_year       TEXT NOT NULL,
    classrooms_allocated INTEGER NOT NULL,
    teachers_allocated   INTEGER NOT NULL,
    estimated_cost       DOUBLE PRECISION NOT NULL,
    cumulative_cost      DOUBLE PRECISION NOT NULL,
    allocation_status    TEXT NOT NULL,
    PRIMARY KEY (school_id, academic_year)
);

CREATE TABLE IF NOT EXISTS risk_trends (
    school_id        TEXT NOT NULL,
    academic_year    TEXT NOT NULL,
    prev_risk_score  DOUBLE PRECISION,
    risk_delta       DOUBLE PRECISION,
    trend_direction  TEXT NOT NULL,
    is_chronic       BOOLEAN NOT NULL,
    is_volatile      BOOLEAN NOT NULL,
    PRIMARY KEY (school_id, academic_year)
);

CREATE TABLE IF NOT EXISTS district_compliance (
    district          TEXT NOT NULL,
    academic_year     TEXT NOT NULL,
    total_schools     INTEGER NOT NULL,
    avg_risk_score    DOUBLE PRECISION NOT NULL,
    pct_critical      DOUBLE PRECISION NOT NULL,
    pct_high          DOUBLE PRECISION NOT NULL,
    pct_moderate      DOUBLE PRECISION NOT NULL,
    pct_low           DOUBLE PRECISION NOT NULL,
    compliance_grade  TEXT NOT NULL,
    yoy_risk_change   DOUBLE PRECISION,
    state_rank        INTEGER NOT NULL,
    PRIMARY KEY (district, academic_year)
);

CREATE TABLE IF NOT EXISTS demand_proposals (
    school_id            TEXT NOT NULL,
    academic_year        TEXT NOT NULL,
    classrooms_requested INTEGER NOT NULL,
    teachers_requested   INTEGER NOT NULL,
    PRIMARY KEY (school_id, academic_year)
);

CREATE TABLE IF NOT EXISTS proposal_validations (
    school_id         TEXT NOT NULL,
    academic_year     TEXT NOT NULL,
    classroom_ratio   DOUBLE PRECISION NOT NULL,
    teacher_ratio     DOUBLE PRECISION NOT NULL,
    decision_status   TEXT NOT NULL,
    reason_code       TEXT NOT NULL,
    confidence_score  DOUBLE PRECISION NOT NULL,
    PRIMARY KEY (school_id, academic_year)
);

CREATE TABLE IF NOT EXISTS enrolment_forecasts (
    school_id                 TEXT NOT NULL,
    base_year                 TEXT NOT NULL,
    years_ahead               SMALLINT NOT NULL,
    base_enrolment            INTEGER NOT NULL,
    growth_rate_used          DOUBLE PRECISION NOT NULL,
    projected_enrolment       INTEGER NOT NULL,
    projected_classrooms_req  INTEGER NOT NULL,
    projected_teachers_req    INTEGER NOT NULL,
    projected_classroom_gap   INTEGER NOT NULL,
    projected_teacher_gap     INTEGER NOT NULL,
    forecast_model            TEXT NOT NULL,
    model_version             TEXT,
    PRIMARY KEY (school_id, base_year, years_ahead, forecast_model)
);

CREATE TABLE IF NOT EXISTS ml_model_artifacts (
    model_version       TEXT PRIMARY KEY,
    trained_at          TIMESTAMPTZ NOT NULL,
    training_row_count  BIGINT NOT NULL,
    validation_mae      DOUBLE PRECISION NOT NULL,
    artifact            JSONB NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_yearly_metrics_school_year ON yearly_metrics (school_id, academic_year);
CREATE INDEX IF NOT EXISTS idx_infrastructure_school_year ON infrastructure_details (school_id, academic_year);
CREATE INDEX IF NOT EXISTS idx_infrastructure_year_risk_level ON infrastructure_details (academic_year, risk_level);
CREATE INDEX IF NOT EXISTS idx_teacher_metrics_school_year ON teacher_metrics (school_id, academic_year);
CREATE INDEX IF NOT EXISTS idx_priority_year_bucket ON school_priority_index (academic_year, priority_bucket);
CREATE INDEX IF NOT EXISTS idx_priority_year_rank ON school_priority_index (academic_year, risk_rank);
CREATE INDEX IF NOT EXISTS idx_budget_year_status ON budget_allocations (academic_year, allocation_status);
CREATE INDEX IF NOT EXISTS idx_trend_year_direction ON risk_trends (academic_year, trend_direction);
CREATE INDEX IF NOT EXISTS idx_district_year_grade ON district_compliance (academic_year, compliance_grade);
CREATE INDEX IF NOT EXISTS idx_validations_year_status ON proposal_validations (academic_year, decision_status);
"#;

/// Apply the full DDL. Safe to call on every startup; every statement is
/// `IF NOT EXISTS` or otherwise idempotent.
pub async fn bootstrap(pool: &PgPool) -> Result<(), StorageError> {
    sqlx::raw_sql(DDL)
        .execute(pool)
        .await
        .map_err(StorageError::Bootstrap)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddl_mentions_all_twelve_tables() {
        let tables = [
            "schools",
            "yearly_metrics",
            "infrastructure_details",
            "teacher_metrics",
            "school_priority_index",
            "budget_allocations",
            "risk_trends",
            "district_compliance",
            "demand_proposals",
            "proposal_validations",
            "enrolment_forecasts",
            "ml_model_artifacts",
        ];
        for table in tables {
            assert!(
                DDL.contains(&format!("EXISTS {table}")),
                "DDL missing table {table}"
            );
        }
    }
}
