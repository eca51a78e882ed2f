//! In-memory LRU cache implementation.

use chrono::Utc;
use folio_core::{FilingId, FolioError, Result, StatementQuery, StatementTable};
use folio_engine::{Filing, FilingCache};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, instrument};

/// Number of filings kept by [`LruFilingCache::default`].
pub const DEFAULT_CAPACITY: usize = 16;

/// Cache entry with timestamp for TTL-based invalidation.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    cached_at: chrono::DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.cached_at);
        age > chrono::TimeDelta::from_std(ttl).unwrap_or(chrono::TimeDelta::MAX)
    }
}

#[derive(Debug, Default)]
struct State {
    filings: HashMap<FilingId, CacheEntry<Arc<Filing>>>,
    statements: HashMap<StatementQuery, CacheEntry<StatementTable>>,
    // Least recently used first.
    recency: VecDeque<FilingId>,
}

impl State {
    fn touch(&mut self, id: &FilingId) {
        if let Some(pos) = self.recency.iter().position(|r| r == id)
            && let Some(entry) = self.recency.remove(pos)
        {
            self.recency.push_back(entry);
        }
    }

    /// Removes a filing and its statements, returning how many entries went.
    fn remove_filing(&mut self, id: &FilingId) -> usize {
        let mut removed = usize::from(self.filings.remove(id).is_some());
        self.recency.retain(|r| r != id);
        let before = self.statements.len();
        self.statements.retain(|query, _| query.filing != *id);
        removed += before - self.statements.len();
        removed
    }
}

/// Capacity-bounded in-memory cache of loaded filings.
///
/// Filings are evicted least recently used first once the capacity is exceeded.
/// Statement tables are only memoized for filings that are cached, and go away
/// together with their filing. State lives behind a `Mutex` because reads update
/// recency.
#[derive(Debug)]
pub struct LruFilingCache {
    capacity: usize,
    state: Mutex<State>,
}

impl Default for LruFilingCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl LruFilingCache {
    /// Create a cache holding at most `capacity` filings (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(State::default()),
        }
    }

    /// Maximum number of filings held.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of filings currently held.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.filings.len())
    }

    /// Returns true if no filing is held.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.filings.is_empty())
    }

    /// Number of memoized statement tables.
    pub fn statement_count(&self) -> Result<usize> {
        Ok(self.lock()?.statements.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| FolioError::Cache("cache lock poisoned".to_string()))
    }
}

impl FilingCache for LruFilingCache {
    #[instrument(skip(self), fields(filing = %id))]
    fn get_filing(&self, id: &FilingId) -> Result<Option<Arc<Filing>>> {
        let mut state = self.lock()?;
        let Some(filing) = state.filings.get(id).map(|e| Arc::clone(&e.data)) else {
            debug!("Cache miss for filing");
            return Ok(None);
        };
        state.touch(id);
        debug!("Cache hit for filing");
        Ok(Some(filing))
    }

    #[instrument(skip(self, filing), fields(filing = %filing.id()))]
    fn put_filing(&self, filing: Arc<Filing>) -> Result<()> {
        let mut state = self.lock()?;
        let id = filing.id().clone();
        // Replacing a filing invalidates statements resolved from the old one.
        state.remove_filing(&id);
        state.filings.insert(id.clone(), CacheEntry::new(filing));
        state.recency.push_back(id);

        while state.filings.len() > self.capacity {
            let Some(oldest) = state.recency.front().cloned() else {
                break;
            };
            let removed = state.remove_filing(&oldest);
            debug!(evicted = %oldest, removed, "Evicted least recently used filing");
        }
        Ok(())
    }

    #[instrument(skip(self, query), fields(filing = %query.filing, statement = %query.statement_type))]
    fn get_statement(&self, query: &StatementQuery) -> Result<Option<StatementTable>> {
        let mut state = self.lock()?;
        let Some(table) = state.statements.get(query).map(|e| e.data.clone()) else {
            debug!("Cache miss for statement");
            return Ok(None);
        };
        state.touch(&query.filing);
        debug!("Cache hit for statement");
        Ok(Some(table))
    }

    #[instrument(skip(self, query, table), fields(filing = %query.filing, statement = %query.statement_type))]
    fn put_statement(&self, query: &StatementQuery, table: &StatementTable) -> Result<()> {
        let mut state = self.lock()?;
        if !state.filings.contains_key(&query.filing) {
            debug!("Filing not cached, statement not memoized");
            return Ok(());
        }
        state
            .statements
            .insert(query.clone(), CacheEntry::new(table.clone()));
        debug!(rows = table.len(), "Memoized statement");
        Ok(())
    }

    #[instrument(skip(self))]
    fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let mut state = self.lock()?;
        let stale: Vec<FilingId> = state
            .filings
            .iter()
            .filter(|(_, entry)| entry.is_stale(ttl))
            .map(|(id, _)| id.clone())
            .collect();

        let mut removed = 0;
        for id in &stale {
            removed += state.remove_filing(id);
        }
        let before = state.statements.len();
        state.statements.retain(|_, entry| !entry.is_stale(ttl));
        removed += before - state.statements.len();

        debug!("Invalidated {} stale cache entries", removed);
        Ok(removed)
    }

    fn clear(&self) -> Result<()> {
        let mut state = self.lock()?;
        state.filings.clear();
        state.statements.clear();
        state.recency.clear();
        debug!("Cleared all cache data");
        Ok(())
    }
}
