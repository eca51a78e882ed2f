#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/folio/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Caching implementations for loaded filings.
//!
//! This crate provides implementations of the [`FilingCache`] trait from `folio-engine`:
//!
//! - [`LruFilingCache`] - Capacity-bounded in-memory cache with LRU eviction
//! - [`NoopCache`] - No-op cache that doesn't store anything

/// In-memory LRU cache implementation.
pub mod memory;
/// No-op cache implementation.
pub mod noop;

// Re-export the trait for convenience
pub use folio_engine::FilingCache;

pub use memory::LruFilingCache;
pub use noop::NoopCache;
