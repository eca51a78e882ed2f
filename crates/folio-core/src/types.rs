//! Core data types for filing facts.
//!
//! This module defines the fundamental data structures:
//!
//! - [`FilingId`] - Identity of one filing
//! - [`Period`] - Instant or duration reporting window
//! - [`PeriodKey`] - Canonical string identity of a period, used as a column key
//! - [`DimensionSignature`] - Ordered axis → member pairs qualifying a fact
//! - [`Fact`] - One reported (concept, context, value) triple
//! - [`ElementCatalog`] - Flattened schema metadata per element

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a single filing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FilingId {
    /// Accession number (e.g., "0000320193-23-000106").
    pub accession: String,
    /// Filer identifier (CIK).
    pub filer_id: String,
    /// Form type (e.g., "10-K", "10-Q").
    pub form_type: String,
    /// Fiscal year focus, when known.
    pub fiscal_year: Option<i32>,
    /// Fiscal period focus (e.g., "FY", "Q2"), when known.
    pub fiscal_period: Option<String>,
}

impl FilingId {
    /// Creates a filing identity with the required fields.
    #[must_use]
    pub fn new(
        accession: impl Into<String>,
        filer_id: impl Into<String>,
        form_type: impl Into<String>,
    ) -> Self {
        Self {
            accession: accession.into(),
            filer_id: filer_id.into(),
            form_type: form_type.into(),
            fiscal_year: None,
            fiscal_period: None,
        }
    }

    /// Sets the fiscal year and period focus.
    #[must_use]
    pub fn with_fiscal_period(mut self, fiscal_year: i32, fiscal_period: impl Into<String>) -> Self {
        self.fiscal_year = Some(fiscal_year);
        self.fiscal_period = Some(fiscal_period.into());
        self
    }
}

impl fmt::Display for FilingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.form_type, self.accession, self.filer_id)
    }
}

/// The reporting window of a fact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Period {
    /// A point in time (balance sheet items).
    Instant(NaiveDate),
    /// An elapsed range, both ends inclusive (income and cash-flow items).
    Duration {
        /// First day of the range.
        start: NaiveDate,
        /// Last day of the range.
        end: NaiveDate,
    },
}

impl Period {
    /// Returns the instant date, or the last day of a duration.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        match self {
            Self::Instant(date) => *date,
            Self::Duration { end, .. } => *end,
        }
    }

    /// Returns the first day of a duration.
    #[must_use]
    pub const fn start(&self) -> Option<NaiveDate> {
        match self {
            Self::Instant(_) => None,
            Self::Duration { start, .. } => Some(*start),
        }
    }

    /// Returns true for point-in-time periods.
    #[must_use]
    pub const fn is_instant(&self) -> bool {
        matches!(self, Self::Instant(_))
    }

    /// Length of a duration in days (`end - start`); `None` for instants.
    #[must_use]
    pub fn days(&self) -> Option<i64> {
        self.start()
            .map(|start| self.end().signed_duration_since(start).num_days())
    }

    /// The instant just before a duration begins, used for opening balances.
    #[must_use]
    pub fn opening_instant(&self) -> Option<NaiveDate> {
        self.start().and_then(|start| start.checked_sub_signed(Duration::days(1)))
    }

    /// Returns the canonical column key for this period.
    #[must_use]
    pub fn key(&self) -> PeriodKey {
        PeriodKey::from(self)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instant(date) => write!(f, "{date}"),
            Self::Duration { start, end } => write!(f, "{start} to {end}"),
        }
    }
}

/// Canonical identity of a period: `instant:<date>` or `duration:<start>:<end>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeriodKey(String);

impl PeriodKey {
    /// Key for an instant period.
    #[must_use]
    pub fn instant(date: NaiveDate) -> Self {
        Self(format!("instant:{date}"))
    }

    /// Key for a duration period.
    #[must_use]
    pub fn duration(start: NaiveDate, end: NaiveDate) -> Self {
        Self(format!("duration:{start}:{end}"))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the key back into a [`Period`].
    #[must_use]
    pub fn period(&self) -> Option<Period> {
        let parse = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
        let mut parts = self.0.split(':');
        match (parts.next()?, parts.next(), parts.next(), parts.next()) {
            ("instant", Some(date), None, None) => parse(date).map(Period::Instant),
            ("duration", Some(start), Some(end), None) => Some(Period::Duration {
                start: parse(start)?,
                end: parse(end)?,
            }),
            _ => None,
        }
    }
}

impl From<&Period> for PeriodKey {
    fn from(period: &Period) -> Self {
        match period {
            Period::Instant(date) => Self::instant(*date),
            Period::Duration { start, end } => Self::duration(*start, *end),
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decimal precision of a numeric fact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Decimals {
    /// Accurate to this many decimal places (negative for rounding to thousands etc.).
    Finite(i32),
    /// Exact value (`decimals="INF"`).
    Infinite,
}

impl Decimals {
    /// Parses an XBRL `decimals` attribute.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("INF") {
            Some(Self::Infinite)
        } else {
            raw.parse().ok().map(Self::Finite)
        }
    }
}

/// Ordered set of axis → member pairs narrowing a fact.
///
/// An empty signature identifies the undimensioned (total) value of a concept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DimensionSignature(BTreeMap<String, String>);

impl DimensionSignature {
    /// Creates an empty signature.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds or replaces the member for an axis.
    pub fn insert(&mut self, axis: impl Into<String>, member: impl Into<String>) {
        self.0.insert(axis.into(), member.into());
    }

    /// Returns a copy with an additional axis → member pair.
    #[must_use]
    pub fn with(mut self, axis: impl Into<String>, member: impl Into<String>) -> Self {
        self.insert(axis, member);
        self
    }

    /// Returns true when no axis qualifies the fact.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of axes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Member for the given axis.
    #[must_use]
    pub fn member(&self, axis: &str) -> Option<&str> {
        self.0.get(axis).map(String::as_str)
    }

    /// Iterates axes in sorted order.
    pub fn axes(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterates (axis, member) pairs in sorted axis order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(a, m)| (a.as_str(), m.as_str()))
    }
}

impl FromIterator<(String, String)> for DimensionSignature {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for DimensionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (axis, member)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{axis}={member}")?;
        }
        Ok(())
    }
}

/// One reported (concept, context, value) triple.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Element id of the concept (e.g., "us-gaap_Assets").
    pub concept: String,
    /// Id of the context the fact was reported in.
    pub context_ref: String,
    /// Value text as it appeared in the document.
    pub raw_value: String,
    /// Numeric value; `None` for nil or non-numeric facts.
    pub value: Option<f64>,
    /// Unit (e.g., "iso4217_USD", "iso4217_USD/xbrli_shares").
    pub unit: Option<String>,
    /// Decimal precision.
    pub decimals: Option<Decimals>,
    /// Reporting window.
    pub period: Period,
    /// Dimension qualifiers.
    pub dimensions: DimensionSignature,
}

impl Fact {
    /// Creates a nil fact for the given concept, context and period.
    #[must_use]
    pub fn new(concept: impl Into<String>, context_ref: impl Into<String>, period: Period) -> Self {
        Self {
            concept: concept.into(),
            context_ref: context_ref.into(),
            raw_value: String::new(),
            value: None,
            unit: None,
            decimals: None,
            period,
            dimensions: DimensionSignature::new(),
        }
    }

    /// Sets a numeric value.
    #[must_use]
    pub fn with_value(mut self, value: f64) -> Self {
        self.raw_value = value.to_string();
        self.value = Some(value);
        self
    }

    /// Sets the unit.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Sets the decimal precision.
    #[must_use]
    pub const fn with_decimals(mut self, decimals: Decimals) -> Self {
        self.decimals = Some(decimals);
        self
    }

    /// Adds a dimension qualifier.
    #[must_use]
    pub fn with_dimension(mut self, axis: impl Into<String>, member: impl Into<String>) -> Self {
        self.dimensions.insert(axis, member);
        self
    }

    /// Returns the canonical period key of this fact.
    #[must_use]
    pub fn period_key(&self) -> PeriodKey {
        self.period.key()
    }

    /// Returns true if any axis qualifies this fact.
    #[must_use]
    pub fn is_dimensional(&self) -> bool {
        !self.dimensions.is_empty()
    }
}

/// Normal balance of a monetary element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceType {
    /// Debit balance (assets, expenses).
    Debit,
    /// Credit balance (liabilities, equity, revenue).
    Credit,
    /// No balance attribute.
    #[default]
    None,
}

/// Period type declared for an element in the schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConceptPeriodType {
    /// Reported at a point in time.
    Instant,
    /// Reported over a range.
    Duration,
}

/// Schema metadata for one element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementInfo {
    /// Normal balance.
    #[serde(default)]
    pub balance_type: BalanceType,
    /// Declared period type.
    #[serde(default)]
    pub period_type: Option<ConceptPeriodType>,
    /// Abstract elements group line items and never carry values.
    #[serde(default)]
    pub is_abstract: bool,
}

/// Flattened element id → metadata map derived from the taxonomy schema.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementCatalog(BTreeMap<String, ElementInfo>);

impl ElementCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds metadata for an element.
    pub fn insert(&mut self, element_id: impl Into<String>, info: ElementInfo) {
        self.0.insert(element_id.into(), info);
    }

    /// Returns metadata for an element.
    #[must_use]
    pub fn get(&self, element_id: &str) -> Option<&ElementInfo> {
        self.0.get(element_id)
    }

    /// Balance type, defaulting to none for unknown elements.
    #[must_use]
    pub fn balance_type(&self, element_id: &str) -> BalanceType {
        self.get(element_id).map(|e| e.balance_type).unwrap_or_default()
    }

    /// Declared period type, if known.
    #[must_use]
    pub fn period_type(&self, element_id: &str) -> Option<ConceptPeriodType> {
        self.get(element_id).and_then(|e| e.period_type)
    }

    /// Whether the element is declared abstract.
    ///
    /// Elements missing from the catalog fall back to the naming convention of
    /// standard taxonomies, where grouping elements end in `Abstract`.
    #[must_use]
    pub fn is_abstract(&self, element_id: &str) -> bool {
        self.get(element_id).map_or_else(
            || local_name(element_id).ends_with("Abstract"),
            |e| e.is_abstract,
        )
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, ElementInfo)> for ElementCatalog {
    fn from_iter<I: IntoIterator<Item = (String, ElementInfo)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Converts a QName (`us-gaap:Assets`) to element-id form (`us-gaap_Assets`).
#[must_use]
pub fn qname_to_element_id(qname: &str) -> String {
    qname.trim().replacen(':', "_", 1)
}

/// Taxonomy prefix of an element id (`us-gaap` for `us-gaap_Assets`).
#[must_use]
pub fn element_prefix(element_id: &str) -> Option<&str> {
    element_id.split_once('_').map(|(prefix, _)| prefix)
}

/// Local name of an element id (`Assets` for `us-gaap_Assets`).
#[must_use]
pub fn local_name(element_id: &str) -> &str {
    element_id
        .split_once('_')
        .map_or(element_id, |(_, local)| local)
}
