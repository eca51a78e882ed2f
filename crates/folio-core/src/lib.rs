#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/folio/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types for resolving financial statements.
//!
//! - [`Fact`](types::Fact) - A reported (concept, context, value) triple
//! - [`Period`](types::Period) and [`PeriodKey`](types::PeriodKey) - Reporting windows
//! - [`StatementType`](statement::StatementType) - The closed set of statements
//! - [`StatementTable`](table::StatementTable) - Rows × period columns
//! - [`FilingSource`](source::FilingSource) - Supplier of raw filing documents

/// Error types for statement resolution.
pub mod error;
/// Filing document bundles and the source trait.
pub mod source;
/// Statement types, views and cadences.
pub mod statement;
/// The assembled statement table.
pub mod table;
/// Facts, periods, dimensions and element metadata.
pub mod types;

pub use error::{FolioError, Result};
pub use source::{FilingDocuments, FilingSource};
pub use statement::{PeriodCadence, StatementQuery, StatementType, StatementView, TaxonomyStandard};
pub use table::{StatementRow, StatementTable};
pub use types::{
    BalanceType, ConceptPeriodType, Decimals, DimensionSignature, ElementCatalog, ElementInfo,
    Fact, FilingId, Period, PeriodKey,
};
