//! Small closed-set enums shared across the pipeline's computed tables.
//!
//! Each stores as `TEXT` in Postgres, round-tripped through `Display`/
//! `FromStr`, and implements `sqlx::Type`/`sqlx::Encode`/`sqlx::Decode` via
//! the `#[sqlx(type_name = "text", rename_all = ...)]` derive so
//! repositories can bind/read them directly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
        #[sqlx(type_name = "text")]
        pub enum $name {
            $($variant),+
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let s = match self {
                    $(Self::$variant => $text),+
                };
                f.write_str(s)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant)),+,
                    other => Err(format!(concat!("unknown ", stringify!($name), ": {}"), other)),
                }
            }
        }
    };
}

text_enum! {
    /// Compliance-risk band (spec §4.4 Pass C). Bands are checked in
    /// descending order: `risk_score >= critical` wins before `>= high`.
    RiskLevel {
        Critical => "CRITICAL",
        High => "HIGH",
        Moderate => "MODERATE",
        Low => "LOW",
    }
}

text_enum! {
    /// Percentile-based priority bucket (spec §4.5).
    PriorityBucket {
        Top5 => "TOP_5",
        Top10 => "TOP_10",
        Top20 => "TOP_20",
        Standard => "STANDARD",
    }
}

text_enum! {
    /// Whether a school's simulated classroom/teacher need was granted, in
    /// whole or in part (spec §4.6).
    AllocationStatus {
        Funded => "FUNDED",
        PartiallyFunded => "PARTIALLY_FUNDED",
        Unfunded => "UNFUNDED",
    }
}

text_enum! {
    /// Year-over-year risk trend direction (spec §4.7). `Baseline` marks a
    /// school's first observed year, when there is no prior score to diff
    /// against.
    TrendDirection {
        Baseline => "BASELINE",
        Improving => "IMPROVING",
        Stable => "STABLE",
        Deteriorating => "DETERIORATING",
    }
}

text_enum! {
    /// Validation outcome for a demand proposal (spec §4.8).
    DecisionStatus {
        Accepted => "ACCEPTED",
        Flagged => "FLAGGED",
        Rejected => "REJECTED",
    }
}

text_enum! {
    /// Why a proposal was accepted, flagged or rejected (spec §4.8 rule
    /// table — the order these rules are declared in is the evaluation
    /// order, first match wins).
    ReasonCode {
        NoDeficit => "NO_DEFICIT",
        ClassroomOverRequest => "CLASSROOM_OVER_REQUEST",
        TeacherOverRequest => "TEACHER_OVER_REQUEST",
        ClassroomModerateOver => "CLASSROOM_MODERATE_OVER",
        TeacherModerateOver => "TEACHER_MODERATE_OVER",
        ClassroomUnderRequest => "CLASSROOM_UNDER_REQUEST",
        TeacherUnderRequest => "TEACHER_UNDER_REQUEST",
        NoRequest => "NO_REQUEST",
        WithinTolerance => "WITHIN_TOLERANCE",
    }
}

text_enum! {
    /// District-level compliance letter grade (spec §3/§6).
    ComplianceGrade {
        A => "A",
        B => "B",
        C => "C",
        D => "D",
        F => "F",
    }
}

text_enum! {
    /// Which model produced an enrolment forecast (spec §4.9/§4.10).
    ForecastModel {
        Wma => "WMA",
        Gbm => "GBM",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_level_round_trips_through_display_and_from_str() {
        for level in [
            RiskLevel::Critical,
            RiskLevel::High,
            RiskLevel::Moderate,
            RiskLevel::Low,
        ] {
            let text = level.to_string();
            assert_eq!(RiskLevel::from_str(&text).unwrap(), level);
        }
    }

    #[test]
    fn reason_code_round_trips_through_display_and_from_str() {
        for code in [
            ReasonCode::NoDeficit,
            ReasonCode::ClassroomOverRequest,
            ReasonCode::WithinTolerance,
        ] {
            let text = code.to_string();
            assert_eq!(ReasonCode::from_str(&text).unwrap(), code);
        }
    }

    #[test]
    fn unknown_text_is_rejected() {
        assert!(RiskLevel::from_str("EXTREME").is_err());
    }
}
