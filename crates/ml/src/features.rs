//! Feature engineering for Stage 10 (spec.md §4.10 "Feature set"): 20
//! features per school-year, built from the cross-year panel with lags
//! and rolling statistics computed in Rust (grouped by school, ordered by
//! academic year) rather than as SQL window functions — the whole stage
//! is a single-process CPU-bound pass per spec.md §5.

use pipeline_domain::PanelRow;

use crate::encoding::LabelEncoder;

pub const NUM_FEATURES: usize = 20;

pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "current_enrolment",
    "lag1_enrolment",
    "lag2_enrolment",
    "growth_rate_current",
    "growth_rate_lag1",
    "school_category",
    "total_teachers",
    "total_class_rooms",
    "usable_class_rooms",
    "classroom_gap",
    "teacher_gap",
    "risk_score",
    "teacher_deficit_ratio",
    "classroom_deficit_ratio",
    "district_label",
    "management_label",
    "rolling_mean_enrolment_3y",
    "rolling_std_enrolment_3y",
    "teachers_per_student",
    "rooms_per_student",
];

pub type FeatureVector = [f64; NUM_FEATURES];

fn clip(x: f64, cap: f64) -> f64 {
    x.clamp(-cap, cap)
}

fn growth_rate(current: i32, previous: i32, cap: f64) -> f64 {
    if previous > 0 {
        clip((current - previous) as f64 / previous as f64, cap)
    } else {
        0.0
    }
}

/// Fit district and management-type label encoders over the whole panel —
/// must be called once and the resulting encoders persisted, since
/// projection needs the training-time mapping, not a freshly re-derived
/// one (spec.md §9 "ML model artefacts").
pub fn fit_encoders(panel: &[PanelRow]) -> (LabelEncoder, LabelEncoder) {
    let district = LabelEncoder::fit(panel.iter().map(|r| r.district.as_str()));
    let management = LabelEncoder::fit(panel.iter().map(|r| r.management_type.as_str()));
    (district, management)
}

/// Build the 20-feature vector for one school-year, given the preceding
/// one and two years if available (`None` when the school's series is
/// too short — treated as "no change from current", not a missing value,
/// so every feature stays finite per spec.md §6 output guarantee 2).
pub fn feature_vector(
    current: &PanelRow,
    lag1: Option<&PanelRow>,
    lag2: Option<&PanelRow>,
    district_encoder: &LabelEncoder,
    management_encoder: &LabelEncoder,
    growth_cap: f64,
) -> FeatureVector {
    let lag1_enrolment = lag1.map(|r| r.total_enrolment).unwrap_or(current.total_enrolment);
    let lag2_enrolment = lag2.map(|r| r.total_enrolment).unwrap_or(lag1_enrolment);

    let growth_rate_current = growth_rate(current.total_enrolment, lag1_enrolment, growth_cap);
    let growth_rate_lag1 = growth_rate(lag1_enrolment, lag2_enrolment, growth_cap);

    let mut window = vec![current.total_enrolment as f64];
    if lag1.is_some() {
        window.push(lag1_enrolment as f64);
    }
    if lag2.is_some() {
        window.push(lag2_enrolment as f64);
    }
    let rolling_mean = window.iter().sum::<f64>() / window.len() as f64;
    let rolling_variance = window
        .iter()
        .map(|v| (v - rolling_mean).powi(2))
        .sum::<f64>()
        / window.len() as f64;
    let rolling_std = rolling_variance.sqrt().min(500.0);

    let enrolment_for_ratio = current.total_enrolment.max(1) as f64;
    let teachers_per_student = current.total_teachers as f64 / enrolment_for_ratio;
    let rooms_per_student = current.usable_class_rooms as f64 / enrolment_for_ratio;

    [
        current.total_enrolment as f64,
        lag1_enrolment as f64,
        lag2_enrolment as f64,
        growth_rate_current,
        growth_rate_lag1,
        current.school_category as f64,
        current.total_teachers as f64,
        current.total_class_rooms as f64,
        current.usable_class_rooms as f64,
        current.classroom_gap.unwrap_or(0) as f64,
        current.teacher_gap.unwrap_or(0) as f64,
        current.risk_score.unwrap_or(0.0),
        current.teacher_deficit_ratio.unwrap_or(0.0),
        current.classroom_deficit_ratio.unwrap_or(0.0),
        district_encoder.encode(&current.district) as f64,
        management_encoder.encode(&current.management_type) as f64,
        rolling_mean,
        rolling_std,
        teachers_per_student,
        rooms_per_student,
    ]
}

/// One training example: a school-year feature vector and the clipped
/// next-year growth-rate target.
#[derive(Debug, Clone)]
pub struct Transition {
    pub school_id: String,
    pub base_year: String,
    pub features: FeatureVector,
    pub target: f64,
}

/// Build every `(year_i -> year_i+1)` transition in the panel, keeping
/// only schools with `enrolment >= min_enrolment` at feature time (spec.md
/// §4.10 training split filter). `panel` must already be ordered by
/// `(school_id, academic_year)` — `ForecastRepository::panel_rows` gives
/// this ordering directly.
pub fn build_transitions(
    panel: &[PanelRow],
    district_encoder: &LabelEncoder,
    management_encoder: &LabelEncoder,
    growth_cap: f64,
    min_enrolment: i32,
) -> Vec<Transition> {
    let mut transitions = Vec::new();

    for rows in group_by_school(panel) {
        for i in 0..rows.len().saturating_sub(1) {
            let current = rows[i];
            let next = rows[i + 1];
            if current.total_enrolment < min_enrolment || current.total_enrolment <= 0 {
                continue;
            }
            let lag1 = if i >= 1 { Some(rows[i - 1]) } else { None };
            let lag2 = if i >= 2 { Some(rows[i - 2]) } else { None };

            let features = feature_vector(
                current,
                lag1,
                lag2,
                district_encoder,
                management_encoder,
                growth_cap,
            );
            let target = growth_rate(next.total_enrolment, current.total_enrolment, growth_cap);

            transitions.push(Transition {
                school_id: current.school_id.clone(),
                base_year: current.academic_year.clone(),
                features,
                target,
            });
        }
    }

    transitions
}

/// One school's base-year feature vector for projection (no target — this
/// is what gets predicted on, not trained from).
#[derive(Debug, Clone)]
pub struct ProjectionSample {
    pub school_id: String,
    pub base_year: String,
    pub school_category: i16,
    pub base_enrolment: i32,
    pub features: FeatureVector,
}

/// Build one projection sample per school, at that school's latest
/// observed year.
pub fn build_projection_samples(
    panel: &[PanelRow],
    district_encoder: &LabelEncoder,
    management_encoder: &LabelEncoder,
    growth_cap: f64,
) -> Vec<ProjectionSample> {
    group_by_school(panel)
        .into_iter()
        .filter_map(|rows| {
            let last = *rows.last()?;
            let lag1 = if rows.len() >= 2 {
                Some(rows[rows.len() - 2])
            } else {
                None
            };
            let lag2 = if rows.len() >= 3 {
                Some(rows[rows.len() - 3])
            } else {
                None
            };
            let features = feature_vector(
                last,
                lag1,
                lag2,
                district_encoder,
                management_encoder,
                growth_cap,
            );
            Some(ProjectionSample {
                school_id: last.school_id.clone(),
                base_year: last.academic_year.clone(),
                school_category: last.school_category,
                base_enrolment: last.total_enrolment,
                features,
            })
        })
        .collect()
}

/// Group consecutive rows of the same `school_id` together. Relies on
/// `panel` already being sorted by `(school_id, academic_year)`.
fn group_by_school(panel: &[PanelRow]) -> Vec<Vec<&PanelRow>> {
    let mut groups: Vec<Vec<&PanelRow>> = Vec::new();
    for row in panel {
        match groups.last_mut() {
            Some(group) if group.last().map(|r| &r.school_id) == Some(&row.school_id) => {
                group.push(row)
            }
            _ => groups.push(vec![row]),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(school: &str, year: &str, enrolment: i32) -> PanelRow {
        PanelRow {
            school_id: school.to_string(),
            academic_year: year.to_string(),
            school_category: 1,
            district: "Bhopal".to_string(),
            management_type: "Government".to_string(),
            total_enrolment: enrolment,
            total_teachers: 5,
            total_class_rooms: 5,
            usable_class_rooms: 4,
            classroom_gap: Some(1),
            teacher_gap: Some(0),
            risk_score: Some(0.3),
            teacher_deficit_ratio: Some(0.1),
            classroom_deficit_ratio: Some(0.2),
        }
    }

    #[test]
    fn groups_consecutive_rows_by_school() {
        let panel = vec![
            row("A", "2021-22", 100),
            row("A", "2022-23", 110),
            row("B", "2021-22", 200),
        ];
        let groups = group_by_school(&panel);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].len(), 1);
    }

    #[test]
    fn transitions_skip_schools_below_min_enrolment() {
        let panel = vec![row("A", "2021-22", 5), row("A", "2022-23", 6)];
        let (district, management) = fit_encoders(&panel);
        let transitions = build_transitions(&panel, &district, &management, 0.30, 10);
        assert!(transitions.is_empty());
    }

    #[test]
    fn transition_target_matches_growth_formula() {
        let panel = vec![row("A", "2021-22", 100), row("A", "2022-23", 110)];
        let (district, management) = fit_encoders(&panel);
        let transitions = build_transitions(&panel, &district, &management, 0.30, 10);
        assert_eq!(transitions.len(), 1);
        assert!((transitions[0].target - 0.10).abs() < 1e-9);
    }

    #[test]
    fn target_is_clipped_to_forecast_growth_cap() {
        let panel = vec![row("A", "2021-22", 100), row("A", "2022-23", 400)];
        let (district, management) = fit_encoders(&panel);
        let transitions = build_transitions(&panel, &district, &management, 0.30, 10);
        assert_eq!(transitions[0].target, 0.30);
    }

    #[test]
    fn projection_uses_latest_year_per_school() {
        let panel = vec![
            row("A", "2021-22", 100),
            row("A", "2022-23", 110),
            row("A", "2023-24", 120),
        ];
        let (district, management) = fit_encoders(&panel);
        let samples = build_projection_samples(&panel, &district, &management, 0.30);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].base_year, "2023-24");
        assert_eq!(samples[0].base_enrolment, 120);
    }

    #[test]
    fn feature_vector_has_no_nan_or_infinite_values() {
        let current = row("A", "2021-22", 100);
        let (district, management) = fit_encoders(std::slice::from_ref(&current));
        let features = feature_vector(&current, None, None, &district, &management, 0.30);
        assert!(features.iter().all(|v| v.is_finite()));
    }
}
