#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/folio/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Financial statement resolution from XBRL filings.
//!
//! This crate re-exports the core types, parsers and engine, and provides a
//! [`FilingService`] that loads filings from registered sources with automatic
//! fallback, caches them, and memoizes resolved statements.
//!
//! # Features
//!
//! - `cache` - In-memory filing caches from `folio-cache`

// Core types and traits
pub use folio_core::*;

// Engine
pub use folio_engine::{
    AxisClass, DimensionConfig, EngineConfig, Filing, FilingCache, PeriodConfig,
    RoleResolution, ScoringWeights, StatementRole,
};

// Parsers
pub use folio_xbrl as xbrl;

// Cache implementations
#[cfg(feature = "cache")]
pub use folio_cache::{LruFilingCache, NoopCache};

mod service;
mod source;

pub use service::FilingService;
pub use source::InMemorySource;
