//! Statement types, views and period cadences.
//!
//! This module defines [`StatementType`], the closed set of statements the engine
//! resolves, [`StatementView`] for dimensional row filtering, [`PeriodCadence`] for
//! column selection and [`TaxonomyStandard`] for synonym lookup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FolioError;
use crate::types::{ConceptPeriodType, FilingId};

/// A financial statement the engine can resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementType {
    /// Statement of financial position.
    BalanceSheet,
    /// Statement of operations / profit or loss.
    IncomeStatement,
    /// Statement of cash flows.
    CashFlow,
    /// Statement of changes in equity.
    Equity,
    /// Anything else (disclosures, parentheticals, schedules).
    Other,
}

impl StatementType {
    /// Every statement type, in resolution priority order.
    pub const ALL: [Self; 5] = [
        Self::BalanceSheet,
        Self::IncomeStatement,
        Self::CashFlow,
        Self::Equity,
        Self::Other,
    ];

    /// Period type of the statement's columns.
    #[must_use]
    pub const fn period_type(&self) -> ConceptPeriodType {
        match self {
            Self::BalanceSheet => ConceptPeriodType::Instant,
            _ => ConceptPeriodType::Duration,
        }
    }

    /// Returns true for point-in-time statements.
    #[must_use]
    pub const fn is_point_in_time(&self) -> bool {
        matches!(self.period_type(), ConceptPeriodType::Instant)
    }

    /// Stable snake_case name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BalanceSheet => "balance_sheet",
            Self::IncomeStatement => "income_statement",
            Self::CashFlow => "cash_flow",
            Self::Equity => "equity",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementType {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "balancesheet" | "bs" | "financialposition" => Ok(Self::BalanceSheet),
            "incomestatement" | "income" | "is" | "operations" | "profitorloss" => {
                Ok(Self::IncomeStatement)
            }
            "cashflow" | "cashflowstatement" | "cashflows" | "cf" => Ok(Self::CashFlow),
            "equity" | "stockholdersequity" | "changesinequity" => Ok(Self::Equity),
            "other" => Ok(Self::Other),
            _ => Err(FolioError::InvalidParameter(format!(
                "Unknown statement type: {s}"
            ))),
        }
    }
}

/// Which dimensional rows a statement table shows.
///
/// Views are pure filters over the same assembled rows: every summary row is a
/// standard row and every standard row is a detailed row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementView {
    /// Face-level dimensional rows shown, drill-down breakdowns hidden.
    #[default]
    Standard,
    /// Every row, including breakdowns.
    Detailed,
    /// No dimensional rows at all.
    Summary,
}

impl StatementView {
    /// Returns true if a row with the given properties is visible in this view.
    #[must_use]
    pub const fn includes(&self, is_dimensional: bool, is_breakdown: bool) -> bool {
        match self {
            Self::Detailed => true,
            Self::Standard => !is_breakdown,
            Self::Summary => !is_dimensional,
        }
    }
}

/// Column cadence for duration statements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodCadence {
    /// Full fiscal years.
    #[default]
    Annual,
    /// Discrete fiscal quarters.
    Quarterly,
}

/// Reporting standard a concept belongs to, derived from its taxonomy prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaxonomyStandard {
    /// US GAAP (`us-gaap` prefix).
    UsGaap,
    /// IFRS (`ifrs-full` prefix).
    Ifrs,
}

impl TaxonomyStandard {
    /// Every supported standard.
    pub const ALL: [Self; 2] = [Self::UsGaap, Self::Ifrs];

    /// Maps a taxonomy prefix to its standard.
    #[must_use]
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "us-gaap" => Some(Self::UsGaap),
            "ifrs-full" | "ifrs" => Some(Self::Ifrs),
            _ => None,
        }
    }
}

/// Arguments of a statement query, usable as a memoization key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatementQuery {
    /// Filing being queried.
    pub filing: FilingId,
    /// Requested statement.
    pub statement_type: StatementType,
    /// Row filter.
    pub view: StatementView,
    /// Maximum number of period columns.
    pub max_periods: usize,
    /// Column cadence.
    pub cadence: PeriodCadence,
}

impl StatementQuery {
    /// Creates a query with the default view and cadence.
    #[must_use]
    pub fn new(filing: FilingId, statement_type: StatementType, max_periods: usize) -> Self {
        Self {
            filing,
            statement_type,
            view: StatementView::default(),
            max_periods,
            cadence: PeriodCadence::default(),
        }
    }

    /// Sets the view.
    #[must_use]
    pub const fn with_view(mut self, view: StatementView) -> Self {
        self.view = view;
        self
    }

    /// Sets the cadence.
    #[must_use]
    pub const fn with_cadence(mut self, cadence: PeriodCadence) -> Self {
        self.cadence = cadence;
        self
    }
}
