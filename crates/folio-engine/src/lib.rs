#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/folio/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Statement resolution over one loaded filing.
//!
//! - [`Filing`] - Loads documents and answers statement queries
//! - [`FactStore`] - Facts keyed by concept, period and dimensions
//! - [`RoleResolver`] - Scores presentation roles against statement synonyms
//! - [`PeriodSelector`] - Chooses period columns
//! - [`StatementAssembler`] - Walks a presentation tree into rows
//! - [`FilingCache`] - Storage for loaded filings and statement tables

/// Statement assembly from presentation trees.
pub mod assembler;
/// Cache trait for filings and statements.
pub mod cache;
/// Engine configuration.
pub mod config;
/// Rolling and derived metrics.
pub mod derived;
/// Axis classification.
pub mod dimensions;
/// Fact storage and lookup.
pub mod fact_store;
/// A loaded filing.
pub mod filing;
/// Calculation and presentation trees.
pub mod linkbase;
/// Period column selection.
pub mod periods;
/// Statement role resolution.
pub mod roles;

pub use assembler::{StatementAssembler, humanize};
pub use cache::FilingCache;
pub use config::{AxisOverride, DimensionConfig, EngineConfig, PeriodConfig, ScoringWeights};
pub use derived::{DerivedMetrics, QuarterValue};
pub use dimensions::{AxisClass, DimensionAxis, DimensionClassifier};
pub use fact_store::FactStore;
pub use filing::Filing;
pub use linkbase::{ChildEdge, LinkbaseNode, LinkbaseTree, NodeKind, TreeKind, build_trees};
pub use periods::{PeriodCandidate, PeriodSelector};
pub use roles::{RoleResolution, RoleResolver, StatementRole, StatementSynonyms, synonyms};
