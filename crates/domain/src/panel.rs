//! The cross-table panel row Stage 10 (ML forecast, spec.md §4.10) reads
//! for feature engineering and training. Not itself a table — a join
//! across `schools`, `yearly_metrics`, `infrastructure_details` and
//! `teacher_metrics` that `ForecastRepository::panel_rows` materialises.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PanelRow {
    pub school_id: String,
    pub academic_year: String,
    pub school_category: i16,
    pub district: String,
    pub management_type: String,
    pub total_enrolment: i32,
    pub total_teachers: i32,
    pub total_class_rooms: i32,
    pub usable_class_rooms: i32,
    pub classroom_gap: Option<i32>,
    pub teacher_gap: Option<i32>,
    pub risk_score: Option<f64>,
    pub teacher_deficit_ratio: Option<f64>,
    pub classroom_deficit_ratio: Option<f64>,
}
