//! No-op cache implementation.

use folio_core::{FilingId, Result, StatementQuery, StatementTable};
use folio_engine::{Filing, FilingCache};
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// All `get_*` methods return `Ok(None)` and all `put_*` methods return `Ok(())`.
/// Useful for disabling caching or testing code paths without cache hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl FilingCache for NoopCache {
    fn get_filing(&self, _id: &FilingId) -> Result<Option<Arc<Filing>>> {
        trace!("NoopCache: get_filing called, returning None");
        Ok(None)
    }

    fn put_filing(&self, _filing: Arc<Filing>) -> Result<()> {
        trace!("NoopCache: put_filing called, doing nothing");
        Ok(())
    }

    fn get_statement(&self, _query: &StatementQuery) -> Result<Option<StatementTable>> {
        trace!("NoopCache: get_statement called, returning None");
        Ok(None)
    }

    fn put_statement(&self, _query: &StatementQuery, _table: &StatementTable) -> Result<()> {
        trace!("NoopCache: put_statement called, doing nothing");
        Ok(())
    }

    fn invalidate_stale(&self, _ttl: Duration) -> Result<usize> {
        trace!("NoopCache: invalidate_stale called, returning 0");
        Ok(0)
    }

    fn clear(&self) -> Result<()> {
        trace!("NoopCache: clear called, doing nothing");
        Ok(())
    }
}
