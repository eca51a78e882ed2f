//! Engine configuration.
//!
//! Every tunable constant of the engine lives here. Defaults reproduce the stock
//! behavior; a JSON document can override any subset of fields.

use folio_core::{FolioError, Result, StatementType};
use serde::{Deserialize, Serialize};

use crate::dimensions::AxisClass;

/// Weights used when scoring candidate statement roles.
///
/// The qualitative ordering is fixed regardless of tuning: an exact statement name
/// outranks a generic keyword match, and any fragment indicator outweighs both size
/// and concept bonuses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Bonus for an exact (optionally "Consolidated"-prefixed) statement name.
    pub exact_match: f64,
    /// Bonus for a generic statement keyword inside the name.
    pub generic_match: f64,
    /// Bonus per statement-defining concept present in the tree.
    pub concept_match: f64,
    /// Cap on the total concept bonus.
    pub concept_cap: f64,
    /// Penalty for detail/disclosure/schedule style names.
    pub fragment_penalty: f64,
    /// Bonus at or above the statement's expected line count.
    pub size_weight: f64,
    /// Candidates scoring below this are never chosen.
    pub min_score: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            exact_match: 100.0,
            generic_match: 50.0,
            concept_match: 5.0,
            concept_cap: 25.0,
            fragment_penalty: 80.0,
            size_weight: 40.0,
            min_score: 30.0,
        }
    }
}

/// Period selection settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodConfig {
    /// Candidates generated per requested column before quality filtering.
    pub candidate_multiplier: usize,
    /// Shortest duration, in days, counted as a fiscal year.
    pub annual_min_days: i64,
    /// Longest duration, in days, counted as a fiscal year.
    pub annual_max_days: i64,
    /// Shortest duration, in days, counted as a fiscal quarter.
    pub quarterly_min_days: i64,
    /// Longest duration, in days, counted as a fiscal quarter.
    pub quarterly_max_days: i64,
    /// Relative tolerance when checking that children sum to a total.
    pub total_tolerance: f64,
}

impl Default for PeriodConfig {
    fn default() -> Self {
        Self {
            candidate_multiplier: 3,
            annual_min_days: 340,
            annual_max_days: 390,
            quarterly_min_days: 80,
            quarterly_max_days: 100,
            total_tolerance: 0.005,
        }
    }
}

impl PeriodConfig {
    /// Returns true if a duration of `days` is a fiscal year.
    #[must_use]
    pub const fn is_annual(&self, days: i64) -> bool {
        days >= self.annual_min_days && days <= self.annual_max_days
    }

    /// Returns true if a duration of `days` is a fiscal quarter.
    #[must_use]
    pub const fn is_quarterly(&self, days: i64) -> bool {
        days >= self.quarterly_min_days && days <= self.quarterly_max_days
    }

    /// Returns true if a duration of `days` spans `quarters` fiscal quarters.
    #[must_use]
    pub const fn spans_quarters(&self, days: i64, quarters: i64) -> bool {
        days >= self.quarterly_min_days * quarters && days <= self.quarterly_max_days * quarters
    }
}

/// A per-statement classification override for one axis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisOverride {
    /// Statement the override applies to.
    pub statement_type: StatementType,
    /// Axis element id or local name (e.g., "ProductOrServiceAxis").
    pub axis: String,
    /// Classification to force.
    pub class: AxisClass,
}

/// Extra axis classification rules layered over the built-in registry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionConfig {
    /// Case-insensitive substrings marking face-level axes.
    pub face_axes: Vec<String>,
    /// Case-insensitive substrings marking breakdown axes.
    pub breakdown_axes: Vec<String>,
    /// Per-statement overrides, checked before any pattern.
    pub overrides: Vec<AxisOverride>,
}

/// Configuration for resolving statements.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Role scoring weights.
    pub scoring: ScoringWeights,
    /// Period selection settings.
    pub periods: PeriodConfig,
    /// Axis classification rules.
    pub dimensions: DimensionConfig,
}

impl EngineConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON; missing fields take their defaults.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or the values are inconsistent.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the values make sense together.
    ///
    /// # Errors
    /// Returns [`FolioError::InvalidParameter`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let p = &self.periods;
        if p.candidate_multiplier < 3 {
            return Err(FolioError::InvalidParameter(format!(
                "candidate_multiplier must be at least 3, got {}",
                p.candidate_multiplier
            )));
        }
        if p.annual_min_days > p.annual_max_days || p.quarterly_min_days > p.quarterly_max_days {
            return Err(FolioError::InvalidParameter(
                "duration window minimum exceeds maximum".to_string(),
            ));
        }
        if p.quarterly_max_days >= p.annual_min_days {
            return Err(FolioError::InvalidParameter(
                "quarterly and annual duration windows overlap".to_string(),
            ));
        }
        if p.total_tolerance.is_nan() || p.total_tolerance < 0.0 {
            return Err(FolioError::InvalidParameter(
                "total_tolerance must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Replaces the scoring weights.
    #[must_use]
    pub fn with_scoring(mut self, scoring: ScoringWeights) -> Self {
        self.scoring = scoring;
        self
    }

    /// Replaces the period settings.
    #[must_use]
    pub fn with_periods(mut self, periods: PeriodConfig) -> Self {
        self.periods = periods;
        self
    }

    /// Adds a face-level axis pattern.
    #[must_use]
    pub fn with_face_axis(mut self, pattern: impl Into<String>) -> Self {
        self.dimensions.face_axes.push(pattern.into());
        self
    }

    /// Adds a breakdown axis pattern.
    #[must_use]
    pub fn with_breakdown_axis(mut self, pattern: impl Into<String>) -> Self {
        self.dimensions.breakdown_axes.push(pattern.into());
        self
    }

    /// Adds a per-statement axis override.
    #[must_use]
    pub fn with_axis_override(
        mut self,
        statement_type: StatementType,
        axis: impl Into<String>,
        class: AxisClass,
    ) -> Self {
        self.dimensions.overrides.push(AxisOverride {
            statement_type,
            axis: axis.into(),
            class,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(
            r#"{"scoring": {"min_score": 10.0}, "periods": {"candidate_multiplier": 4}}"#,
        )
        .unwrap();
        assert_eq!(config.scoring.min_score, 10.0);
        assert_eq!(config.scoring.exact_match, 100.0);
        assert_eq!(config.periods.candidate_multiplier, 4);
        assert_eq!(config.periods.annual_min_days, 340);
    }

    #[test]
    fn test_overrides_from_json() {
        let config = EngineConfig::from_json(
            r#"{"dimensions": {"overrides": [
                {"statement_type": "balance_sheet", "axis": "ConsolidationItemsAxis", "class": "face"}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(config.dimensions.overrides.len(), 1);
        assert_eq!(config.dimensions.overrides[0].class, AxisClass::Face);
    }

    #[test]
    fn test_validation_rejects_small_multiplier() {
        let result = EngineConfig::from_json(r#"{"periods": {"candidate_multiplier": 2}}"#);
        assert!(matches!(result, Err(FolioError::InvalidParameter(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            EngineConfig::from_json("{not json"),
            Err(FolioError::Serialization(_))
        ));
    }

    #[test]
    fn test_duration_windows() {
        let periods = PeriodConfig::default();
        assert!(periods.is_annual(364));
        assert!(periods.is_annual(371));
        assert!(!periods.is_annual(90));
        assert!(periods.is_quarterly(90));
        assert!(periods.spans_quarters(181, 2));
        assert!(!periods.spans_quarters(90, 2));
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::new()
            .with_face_axis("LegalEntityAxis")
            .with_axis_override(StatementType::IncomeStatement, "SegmentsAxis", AxisClass::Face);
        assert_eq!(config.dimensions.face_axes, vec!["LegalEntityAxis".to_string()]);
        assert_eq!(config.dimensions.overrides.len(), 1);
    }
}
