//! Academic year identity (spec §6): a string of the form `"YYYY-YY"`,
//! e.g. `"2024-25"`. Ordering is lexicographic and, per spec, consistent
//! with chronological ordering under that convention — so `AcademicYear`
//! derives `Ord` straight from the wrapped `String`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AcademicYear(String);

#[derive(Debug, thiserror::Error)]
#[error("invalid academic year {0:?}: expected \"YYYY-YY\"")]
pub struct AcademicYearParseError(String);

impl AcademicYear {
    pub fn new(raw: impl Into<String>) -> Result<Self, AcademicYearParseError> {
        let raw = raw.into();
        if Self::parse_start_year(&raw).is_some() {
            Ok(Self(raw))
        } else {
            Err(AcademicYearParseError(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The four-digit starting year, e.g. `2024` for `"2024-25"`.
    pub fn start_year(&self) -> i32 {
        Self::parse_start_year(&self.0).expect("validated at construction")
    }

    fn parse_start_year(raw: &str) -> Option<i32> {
        let (start, end) = raw.split_once('-')?;
        if start.len() != 4 || end.len() != 2 {
            return None;
        }
        let start_year: i32 = start.parse().ok()?;
        let end_suffix: i32 = end.parse().ok()?;
        if (start_year + 1) % 100 != end_suffix {
            return None;
        }
        Some(start_year)
    }

    /// The academic year `k` years after this one, in the same `"YYYY-YY"` form.
    pub fn add_years(&self, k: i32) -> AcademicYear {
        let next_start = self.start_year() + k;
        let suffix = (next_start + 1).rem_euclid(100);
        AcademicYear(format!("{next_start:04}-{suffix:02}"))
    }
}

impl fmt::Display for AcademicYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AcademicYear {
    type Err = AcademicYearParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<AcademicYear> for String {
    fn from(year: AcademicYear) -> Self {
        year.0
    }
}

impl AsRef<str> for AcademicYear {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_year() {
        let year = AcademicYear::new("2024-25").unwrap();
        assert_eq!(year.start_year(), 2024);
    }

    #[test]
    fn rejects_mismatched_suffix() {
        assert!(AcademicYear::new("2024-27").is_err());
    }

    #[test]
    fn rejects_malformed_string() {
        assert!(AcademicYear::new("not-a-year").is_err());
    }

    #[test]
    fn orders_lexicographically_and_chronologically() {
        let a = AcademicYear::new("2021-22").unwrap();
        let b = AcademicYear::new("2022-23").unwrap();
        assert!(a < b);
    }

    #[test]
    fn add_years_rolls_the_century_suffix() {
        let year = AcademicYear::new("1999-00").unwrap();
        assert_eq!(year.add_years(1).as_str(), "2000-01");
    }
}
