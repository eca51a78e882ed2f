//! Cache trait for loaded filings and resolved statements.
//!
//! This module defines the [`FilingCache`] trait. Loading a filing (parsing every
//! document and building its trees) is by far the most expensive step, so loaded
//! filings are cached whole; resolved statement tables are memoized per query on top.

use folio_core::{FilingId, Result, StatementQuery, StatementTable};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::filing::Filing;

/// Storage for loaded filings and statement tables.
///
/// Implementations decide capacity and eviction. Dropping a filing must also drop
/// every statement memoized for it.
pub trait FilingCache: Send + Sync + Debug {
    /// Retrieves a loaded filing.
    ///
    /// Returns `Ok(Some(filing))` if cached, `Ok(None)` if not cached.
    fn get_filing(&self, id: &FilingId) -> Result<Option<Arc<Filing>>>;

    /// Stores a loaded filing.
    fn put_filing(&self, filing: Arc<Filing>) -> Result<()>;

    /// Retrieves a memoized statement table.
    fn get_statement(&self, query: &StatementQuery) -> Result<Option<StatementTable>>;

    /// Memoizes a statement table.
    fn put_statement(&self, query: &StatementQuery, table: &StatementTable) -> Result<()>;

    /// Removes entries older than the TTL.
    ///
    /// Returns the number of entries invalidated.
    fn invalidate_stale(&self, ttl: Duration) -> Result<usize>;

    /// Clears all cached data.
    fn clear(&self) -> Result<()>;
}
