//! Integer label encoding for the district/management categorical
//! features (spec.md §4.10 feature set). Codes are assigned in sorted
//! order so the mapping is stable across re-training runs given the same
//! input panel, and persisted in the model artifact so projection reuses
//! the training-time encoding rather than re-deriving it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A value never seen during `fit` encodes to this code at projection time.
pub const UNKNOWN_CODE: i32 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    codes: BTreeMap<String, i32>,
}

impl LabelEncoder {
    pub fn fit<'a>(values: impl Iterator<Item = &'a str>) -> Self {
        let mut unique: Vec<&str> = values.collect();
        unique.sort_unstable();
        unique.dedup();

        let codes = unique
            .into_iter()
            .enumerate()
            .map(|(i, v)| (v.to_string(), i as i32))
            .collect();

        Self { codes }
    }

    pub fn encode(&self, value: &str) -> i32 {
        *self.codes.get(value).unwrap_or(&UNKNOWN_CODE)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_stable_sorted_codes() {
        let encoder = LabelEncoder::fit(["Bhopal", "Indore", "Bhopal", "Ujjain"].into_iter());
        assert_eq!(encoder.encode("Bhopal"), 0);
        assert_eq!(encoder.encode("Indore"), 1);
        assert_eq!(encoder.encode("Ujjain"), 2);
        assert_eq!(encoder.len(), 3);
    }

    #[test]
    fn unseen_value_encodes_to_unknown() {
        let encoder = LabelEncoder::fit(["A", "B"].into_iter());
        assert_eq!(encoder.encode("Z"), UNKNOWN_CODE);
    }
}
