//! Dimension classification.
//!
//! Some axes describe the line item itself (property by type, equity components) and
//! belong on the face of the statement; most others slice a total into drill-down
//! breakdowns (geography, segments, customers). The classifier decides which, driven
//! by a pattern registry plus per-statement overrides.

use folio_core::types::local_name;
use folio_core::{DimensionSignature, StatementType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::DimensionConfig;

/// Whether an axis is shown on the statement face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisClass {
    /// Shown in the standard view.
    Face,
    /// Shown only in the detailed view.
    Breakdown,
}

/// An axis with its classification for one statement type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DimensionAxis {
    /// Axis element id.
    pub axis: String,
    /// Classification.
    pub class: AxisClass,
    /// Set when a per-statement override decided the class.
    pub overridden: bool,
}

const FACE_PATTERNS: &[&str] = &[
    "propertyplantandequipmentbytype",
    "longlivedtangibleassetbytype",
    "classofstock",
    "statementequitycomponents",
    "equitycomponents",
    "componentsofequity",
    "retainedearningsappropriationstatus",
];

const BREAKDOWN_PATTERNS: &[&str] = &[
    "geographical",
    "segment",
    "productorservice",
    "country",
    "region",
    "concentrationrisk",
    "range",
    "majorcustomers",
    "businessacquisition",
    "consolidationitems",
    "restatement",
    "relatedparty",
    "debtinstrument",
    "longtermdebttype",
    "fairvalue",
    "investmenttype",
    "financingreceivable",
    "legalentity",
];

const OVERRIDES: &[(StatementType, &str, AxisClass)] = &[
    (
        StatementType::Equity,
        "StatementEquityComponentsAxis",
        AxisClass::Face,
    ),
    (
        StatementType::IncomeStatement,
        "ProductOrServiceAxis",
        AxisClass::Face,
    ),
];

fn normalize(axis: &str) -> String {
    local_name(axis).to_ascii_lowercase()
}

/// Classifies axes as face or breakdown.
#[derive(Clone, Debug, Default)]
pub struct DimensionClassifier {
    patterns: Vec<(String, AxisClass)>,
    overrides: BTreeMap<(StatementType, String), AxisClass>,
}

impl DimensionClassifier {
    /// Creates a classifier from the built-in registry plus configured rules.
    ///
    /// Configured patterns are consulted before built-in ones, and configured
    /// overrides replace built-in overrides for the same (statement, axis).
    #[must_use]
    pub fn new(config: &DimensionConfig) -> Self {
        let configured = |patterns: &[String], class: AxisClass| {
            patterns
                .iter()
                .map(move |p| (p.to_ascii_lowercase(), class))
                .collect::<Vec<_>>()
        };
        let builtin = |patterns: &[&str], class: AxisClass| {
            patterns
                .iter()
                .map(move |p| ((*p).to_string(), class))
                .collect::<Vec<_>>()
        };

        let mut patterns = configured(&config.face_axes, AxisClass::Face);
        patterns.extend(configured(&config.breakdown_axes, AxisClass::Breakdown));
        patterns.extend(builtin(FACE_PATTERNS, AxisClass::Face));
        patterns.extend(builtin(BREAKDOWN_PATTERNS, AxisClass::Breakdown));

        let mut overrides: BTreeMap<(StatementType, String), AxisClass> = OVERRIDES
            .iter()
            .map(|(st, axis, class)| ((*st, normalize(axis)), *class))
            .collect();
        for o in &config.overrides {
            overrides.insert((o.statement_type, normalize(&o.axis)), o.class);
        }

        Self {
            patterns,
            overrides,
        }
    }

    /// Classifies one axis for a statement.
    ///
    /// Unknown axes are breakdowns.
    #[must_use]
    pub fn classify(&self, axis: &str, statement_type: StatementType) -> AxisClass {
        self.describe(axis, statement_type).class
    }

    /// Classifies one axis and records how the decision was made.
    #[must_use]
    pub fn describe(&self, axis: &str, statement_type: StatementType) -> DimensionAxis {
        let name = normalize(axis);
        if let Some(class) = self.overrides.get(&(statement_type, name.clone())) {
            return DimensionAxis {
                axis: axis.to_string(),
                class: *class,
                overridden: true,
            };
        }
        let class = self
            .patterns
            .iter()
            .find(|(pattern, _)| name.contains(pattern.as_str()))
            .map_or(AxisClass::Breakdown, |(_, class)| *class);
        DimensionAxis {
            axis: axis.to_string(),
            class,
            overridden: false,
        }
    }

    /// A row is a breakdown if any of its axes is.
    #[must_use]
    pub fn is_breakdown(&self, signature: &DimensionSignature, statement_type: StatementType) -> bool {
        signature
            .axes()
            .any(|axis| self.classify(axis, statement_type) == AxisClass::Breakdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use rstest::rstest;

    #[rstest]
    #[case("us-gaap_PropertyPlantAndEquipmentByTypeAxis", StatementType::BalanceSheet, AxisClass::Face)]
    #[case("us-gaap_StatementClassOfStockAxis", StatementType::BalanceSheet, AxisClass::Face)]
    #[case("us-gaap_StatementEquityComponentsAxis", StatementType::Equity, AxisClass::Face)]
    #[case("us-gaap_StatementGeographicalAxis", StatementType::BalanceSheet, AxisClass::Breakdown)]
    #[case("us-gaap_StatementBusinessSegmentsAxis", StatementType::IncomeStatement, AxisClass::Breakdown)]
    #[case("srt_ProductOrServiceAxis", StatementType::IncomeStatement, AxisClass::Face)]
    #[case("srt_ProductOrServiceAxis", StatementType::BalanceSheet, AxisClass::Breakdown)]
    #[case("abc_SomethingCustomAxis", StatementType::CashFlow, AxisClass::Breakdown)]
    fn test_classify(
        #[case] axis: &str,
        #[case] statement_type: StatementType,
        #[case] expected: AxisClass,
    ) {
        let classifier = DimensionClassifier::new(&DimensionConfig::default());
        assert_eq!(classifier.classify(axis, statement_type), expected);
    }

    #[test]
    fn test_configured_rules() {
        let config = EngineConfig::new()
            .with_face_axis("SomethingCustom")
            .with_axis_override(
                StatementType::BalanceSheet,
                "us-gaap_PropertyPlantAndEquipmentByTypeAxis",
                AxisClass::Breakdown,
            );
        let classifier = DimensionClassifier::new(&config.dimensions);
        assert_eq!(
            classifier.classify("abc_SomethingCustomAxis", StatementType::CashFlow),
            AxisClass::Face
        );
        let described = classifier.describe(
            "us-gaap_PropertyPlantAndEquipmentByTypeAxis",
            StatementType::BalanceSheet,
        );
        assert_eq!(described.class, AxisClass::Breakdown);
        assert!(described.overridden);
    }

    #[test]
    fn test_multi_axis_row_is_breakdown_if_any_axis_is() {
        let classifier = DimensionClassifier::new(&DimensionConfig::default());
        let face_only = DimensionSignature::new().with(
            "us-gaap_PropertyPlantAndEquipmentByTypeAxis",
            "us-gaap_LandMember",
        );
        let mixed = face_only
            .clone()
            .with("us-gaap_StatementGeographicalAxis", "country_US");
        assert!(!classifier.is_breakdown(&face_only, StatementType::BalanceSheet));
        assert!(classifier.is_breakdown(&mixed, StatementType::BalanceSheet));
    }
}
