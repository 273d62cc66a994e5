//! Policy constants (spec §6 "Configuration parameters").
//!
//! These are the values a product owner can tune without touching code: norm
//! tables, risk weights/bands, budget caps, and the rest of the named
//! constants spec.md calls out. [`PolicyConfig::default`] bakes in the spec
//! defaults; [`crate::load_policy`] overlays a partial TOML file on top.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Category → norm lookup with a fallback for unlisted/unknown categories.
///
/// UDISE+ category codes run 1..=11; a category outside that range (or a
/// missing category on the source row) falls back to `default`, which spec
/// §4.2 fixes at the most permissive tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormTable {
    pub tiers: BTreeMap<u8, i32>,
    pub default: i32,
}

impl NormTable {
    pub fn lookup(&self, category: Option<u8>) -> i32 {
        match category {
            Some(c) => *self.tiers.get(&c).unwrap_or(&self.default),
            None => self.default,
        }
    }

    fn classroom_default() -> Self {
        let mut tiers = BTreeMap::new();
        for c in [1u8, 2, 3] {
            tiers.insert(c, 30);
        }
        for c in [4u8, 5] {
            tiers.insert(c, 35);
        }
        for c in 6u8..=11 {
            tiers.insert(c, 40);
        }
        Self { tiers, default: 40 }
    }

    fn ptr_default() -> Self {
        let mut tiers = BTreeMap::new();
        for c in [1u8, 2, 3, 5, 6] {
            tiers.insert(c, 30);
        }
        for c in [4u8, 7, 8, 9, 10, 11] {
            tiers.insert(c, 35);
        }
        Self { tiers, default: 35 }
    }
}

/// Composite risk score weights (spec §4.4 Pass C). Must sum to 1.00.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Validate)]
pub struct RiskWeights {
    #[validate(range(min = 0.0, max = 1.0))]
    pub teacher: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub classroom: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub growth: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            teacher: 0.45,
            classroom: 0.35,
            growth: 0.20,
        }
    }
}

/// Risk level band cut points (spec §4.4). `risk_score >= critical` is
/// CRITICAL, `>= high` is HIGH, `>= moderate` is MODERATE, else LOW.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RiskBands {
    pub critical: f64,
    pub high: f64,
    pub moderate: f64,
}

impl Default for RiskBands {
    fn default() -> Self {
        Self {
            critical: 0.60,
            high: 0.40,
            moderate: 0.20,
        }
    }
}

/// Percentile cut points for priority buckets (spec §4.5).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriorityBuckets {
    pub top5: f64,
    pub top10: f64,
    pub top20: f64,
}

impl Default for PriorityBuckets {
    fn default() -> Self {
        Self {
            top5: 0.05,
            top10: 0.10,
            top20: 0.20,
        }
    }
}

/// Budget allocation simulator inputs (spec §4.6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BudgetConfig {
    pub total_classroom_budget: f64,
    pub cost_per_classroom: f64,
    pub max_teachers: i64,
}

impl BudgetConfig {
    /// `max_classrooms = floor(total_classroom_budget / cost_per_classroom)`.
    pub fn max_classrooms(&self) -> i64 {
        (self.total_classroom_budget / self.cost_per_classroom).floor() as i64
    }
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            total_classroom_budget: 5e8,
            cost_per_classroom: 5e5,
            max_teachers: 10_000,
        }
    }
}

/// Synthetic proposal noise multiplier range (spec §4.8), inclusive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProposalNoiseRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ProposalNoiseRange {
    fn default() -> Self {
        Self {
            min: 0.70,
            max: 1.49,
        }
    }
}

/// District compliance letter-grade cut points (spec §6), ascending on
/// average risk score: `avg_risk_score < a` is grade A, `< b` is B, etc.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ComplianceGrades {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Default for ComplianceGrades {
    fn default() -> Self {
        Self {
            a: 0.15,
            b: 0.30,
            c: 0.50,
            d: 0.70,
        }
    }
}

/// The full policy constant set (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PolicyConfig {
    pub classroom_norm: NormTable,
    pub ptr_norm: NormTable,
    pub risk_weights: RiskWeights,
    pub risk_bands: RiskBands,
    pub growth_cap_risk: f64,
    pub trend_band: f64,
    pub volatile_threshold: f64,
    pub priority_buckets: PriorityBuckets,
    pub budget: BudgetConfig,
    pub proposal_noise_range: ProposalNoiseRange,
    pub forecast_growth_cap: f64,
    pub compliance_grades: ComplianceGrades,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            classroom_norm: NormTable::classroom_default(),
            ptr_norm: NormTable::ptr_default(),
            risk_weights: RiskWeights::default(),
            risk_bands: RiskBands::default(),
            growth_cap_risk: 0.50,
            trend_band: 0.05,
            volatile_threshold: 0.15,
            priority_buckets: PriorityBuckets::default(),
            budget: BudgetConfig::default(),
            proposal_noise_range: ProposalNoiseRange::default(),
            forecast_growth_cap: 0.30,
            compliance_grades: ComplianceGrades::default(),
        }
    }
}

impl PolicyConfig {
    /// Cross-field invariants the `validator` field-level attributes can't
    /// express on their own (weight sums, band ordering).
    pub fn validate_cross_fields(&self) -> Result<(), String> {
        self.risk_weights
            .validate()
            .map_err(|e| format!("risk_weights: {e}"))?;

        let weight_sum =
            self.risk_weights.teacher + self.risk_weights.classroom + self.risk_weights.growth;
        if (weight_sum - 1.0).abs() > 1e-6 {
            return Err(format!("risk_weights must sum to 1.00, got {weight_sum}"));
        }

        let b = &self.risk_bands;
        if !(b.critical > b.high && b.high > b.moderate && b.moderate > 0.0) {
            return Err(format!(
                "risk_bands must satisfy critical > high > moderate > 0, got {b:?}"
            ));
        }

        let p = &self.priority_buckets;
        if !(p.top5 < p.top10 && p.top10 < p.top20) {
            return Err(format!(
                "priority_buckets must satisfy top5 < top10 < top20, got {p:?}"
            ));
        }

        let g = &self.compliance_grades;
        if !(g.a < g.b && g.b < g.c && g.c < g.d) {
            return Err(format!(
                "compliance_grades must satisfy a < b < c < d, got {g:?}"
            ));
        }

        let n = &self.proposal_noise_range;
        if !(n.min > 0.0 && n.min < n.max) {
            return Err(format!(
                "proposal_noise_range must satisfy 0 < min < max, got {n:?}"
            ));
        }

        if !(0.0..=1.0).contains(&self.growth_cap_risk) {
            return Err(format!(
                "growth_cap_risk must be in [0, 1], got {}",
                self.growth_cap_risk
            ));
        }

        if !(0.0..=1.0).contains(&self.forecast_growth_cap) {
            return Err(format!(
                "forecast_growth_cap must be in [0, 1], got {}",
                self.forecast_growth_cap
            ));
        }

        if self.trend_band <= 0.0 || self.volatile_threshold <= 0.0 {
            return Err("trend_band and volatile_threshold must be positive".to_string());
        }

        if self.budget.total_classroom_budget <= 0.0
            || self.budget.cost_per_classroom <= 0.0
            || self.budget.max_teachers <= 0
        {
            return Err("budget fields must be positive".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classroom_norm_matches_spec_table() {
        let norms = NormTable::classroom_default();
        assert_eq!(norms.lookup(Some(1)), 30);
        assert_eq!(norms.lookup(Some(3)), 30);
        assert_eq!(norms.lookup(Some(4)), 35);
        assert_eq!(norms.lookup(Some(5)), 35);
        assert_eq!(norms.lookup(Some(6)), 40);
        assert_eq!(norms.lookup(Some(11)), 40);
        assert_eq!(norms.lookup(None), 40);
        assert_eq!(norms.lookup(Some(200)), 40);
    }

    #[test]
    fn ptr_norm_matches_spec_table() {
        let norms = NormTable::ptr_default();
        assert_eq!(norms.lookup(Some(1)), 30);
        assert_eq!(norms.lookup(Some(5)), 30);
        assert_eq!(norms.lookup(Some(6)), 30);
        assert_eq!(norms.lookup(Some(4)), 35);
        assert_eq!(norms.lookup(Some(7)), 35);
        assert_eq!(norms.lookup(None), 35);
    }

    #[test]
    fn max_classrooms_derivation() {
        let budget = BudgetConfig::default();
        assert_eq!(budget.max_classrooms(), 1_000);
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let mut policy = PolicyConfig::default();
        policy.risk_weights.growth = 0.30;
        assert!(policy.validate_cross_fields().is_err());
    }

    #[test]
    fn rejects_non_descending_bands() {
        let mut policy = PolicyConfig::default();
        policy.risk_bands.high = 0.70;
        assert!(policy.validate_cross_fields().is_err());
    }
}
