//! The assembled statement table.
//!
//! [`StatementTable`] is the single shape every producer and consumer of resolved
//! statements shares: ordered rows × ordered period columns, each cell nullable.

use polars::prelude::{Column, DataFrame};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::statement::{StatementType, StatementView};
use crate::types::{DimensionSignature, FilingId, PeriodKey};

/// One line of a statement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatementRow {
    /// Element id of the concept.
    pub concept: String,
    /// Display label.
    pub label: String,
    /// Nesting depth below the statement root.
    pub depth: usize,
    /// Heading rows carry no values.
    pub is_abstract: bool,
    /// Row is a roll-up of the rows above it.
    pub is_total: bool,
    /// Label role the presentation tree asked for, if any.
    pub preferred_label: Option<String>,
    /// Dimension qualifiers; empty for the concept's own line.
    pub dimensions: DimensionSignature,
    /// Row is a drill-down breakdown rather than a face-level line.
    pub is_breakdown: bool,
    /// Value per period column; `None` where nothing was reported.
    pub values: BTreeMap<PeriodKey, Option<f64>>,
}

impl StatementRow {
    /// Creates a row without values.
    #[must_use]
    pub fn new(concept: impl Into<String>, label: impl Into<String>, depth: usize) -> Self {
        Self {
            concept: concept.into(),
            label: label.into(),
            depth,
            is_abstract: false,
            is_total: false,
            preferred_label: None,
            dimensions: DimensionSignature::new(),
            is_breakdown: false,
            values: BTreeMap::new(),
        }
    }

    /// Value for a period column.
    #[must_use]
    pub fn value(&self, period: &PeriodKey) -> Option<f64> {
        self.values.get(period).copied().flatten()
    }

    /// Returns true if a dimension qualifies this row.
    #[must_use]
    pub fn is_dimensional(&self) -> bool {
        !self.dimensions.is_empty()
    }

    /// Returns true if any period carries a value.
    #[must_use]
    pub fn has_values(&self) -> bool {
        self.values.values().any(Option::is_some)
    }
}

/// A resolved statement: ordered rows × ordered period columns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatementTable {
    /// Filing the statement was resolved from.
    pub filing: FilingId,
    /// Statement type.
    pub statement_type: StatementType,
    /// Role the rows were taken from.
    pub role: String,
    /// Row filter applied to `rows`.
    pub view: StatementView,
    /// Period columns, most recent first.
    pub periods: Vec<PeriodKey>,
    /// Rows in presentation order.
    pub rows: Vec<StatementRow>,
}

impl StatementTable {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First undimensioned row for a concept.
    #[must_use]
    pub fn row(&self, concept: &str) -> Option<&StatementRow> {
        self.rows
            .iter()
            .find(|r| r.concept == concept && !r.is_dimensional())
    }

    /// Every row for a concept, dimensional ones included.
    pub fn rows_for<'a>(&'a self, concept: &'a str) -> impl Iterator<Item = &'a StatementRow> {
        self.rows.iter().filter(move |r| r.concept == concept)
    }

    /// First row whose label matches exactly.
    #[must_use]
    pub fn row_by_label(&self, label: &str) -> Option<&StatementRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    /// Undimensioned value of a concept in a period.
    #[must_use]
    pub fn value(&self, concept: &str, period: &PeriodKey) -> Option<f64> {
        self.row(concept).and_then(|r| r.value(period))
    }

    /// Narrows the table to a view.
    ///
    /// Views nest (summary ⊂ standard ⊂ detailed), so a detailed table can be
    /// re-filtered to any view without re-resolving. Columns left without any value
    /// are dropped.
    #[must_use]
    pub fn filter_view(&self, view: StatementView) -> Self {
        let rows: Vec<StatementRow> = self
            .rows
            .iter()
            .filter(|r| view.includes(r.is_dimensional(), r.is_breakdown))
            .cloned()
            .collect();
        let mut table = Self {
            filing: self.filing.clone(),
            statement_type: self.statement_type,
            role: self.role.clone(),
            view,
            periods: self.periods.clone(),
            rows,
        };
        table.drop_empty_periods();
        table
    }

    /// Removes period columns where every row is null.
    pub fn drop_empty_periods(&mut self) {
        let rows = &self.rows;
        self.periods
            .retain(|period| rows.iter().any(|r| r.value(period).is_some()));
        let periods = &self.periods;
        for row in &mut self.rows {
            row.values.retain(|key, _| periods.contains(key));
        }
    }

    /// Converts the table into a DataFrame.
    ///
    /// Columns: concept, label, depth, is_abstract, is_total, is_breakdown,
    /// dimensions, then one `f64` column per period key.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = vec![
            Column::new(
                "concept".into(),
                self.rows.iter().map(|r| r.concept.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "label".into(),
                self.rows.iter().map(|r| r.label.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "depth".into(),
                self.rows
                    .iter()
                    .map(|r| u32::try_from(r.depth).unwrap_or(u32::MAX))
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                "is_abstract".into(),
                self.rows.iter().map(|r| r.is_abstract).collect::<Vec<_>>(),
            ),
            Column::new(
                "is_total".into(),
                self.rows.iter().map(|r| r.is_total).collect::<Vec<_>>(),
            ),
            Column::new(
                "is_breakdown".into(),
                self.rows.iter().map(|r| r.is_breakdown).collect::<Vec<_>>(),
            ),
            Column::new(
                "dimensions".into(),
                self.rows
                    .iter()
                    .map(|r| r.dimensions.to_string())
                    .collect::<Vec<_>>(),
            ),
        ];

        for period in &self.periods {
            columns.push(Column::new(
                period.as_str().into(),
                self.rows.iter().map(|r| r.value(period)).collect::<Vec<_>>(),
            ));
        }

        Ok(DataFrame::new(columns)?)
    }
}
