//! Filing service: loads filings from sources with fallback and answers statement
//! queries through an optional cache.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use folio_core::{
    FilingId, FilingSource, FolioError, PeriodCadence, PeriodKey, Result, StatementQuery,
    StatementTable, StatementType,
};
use folio_engine::{EngineConfig, Filing, FilingCache};

/// Entry point for resolving statements from filings.
///
/// The `FilingService` holds one or more [`FilingSource`]s and tries them in order
/// until one supplies the requested filing. Loaded filings are kept in the cache, if
/// one is configured, and resolved statement tables are memoized there per query.
///
/// # Example
///
/// ```rust,ignore
/// use folio::{FilingService, InMemorySource, StatementQuery, StatementType};
/// use std::sync::Arc;
///
/// let service = FilingService::new()
///     .with_source(Arc::new(InMemorySource::new("local").with_filing(documents)))
///     .with_lru_cache(8);
///
/// let table = service.statement(&StatementQuery::new(id, StatementType::IncomeStatement, 3))?;
/// ```
#[derive(Default)]
pub struct FilingService {
    sources: Vec<Arc<dyn FilingSource>>,
    cache: Option<Arc<dyn FilingCache>>,
    config: EngineConfig,
}

impl std::fmt::Debug for FilingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilingService")
            .field(
                "sources",
                &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("cache", &self.cache.as_ref().map(|_| "configured"))
            .field("config", &self.config)
            .finish()
    }
}

impl FilingService {
    /// Create a new service with no sources, no cache and the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new service with a cache.
    #[must_use]
    pub fn with_cache(cache: Arc<dyn FilingCache>) -> Self {
        Self {
            cache: Some(cache),
            ..Default::default()
        }
    }

    /// Set the cache for this service.
    #[must_use]
    pub fn set_cache(mut self, cache: Arc<dyn FilingCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Use an in-memory LRU cache holding up to `capacity` filings.
    #[cfg(feature = "cache")]
    #[must_use]
    pub fn with_lru_cache(self, capacity: usize) -> Self {
        self.set_cache(Arc::new(folio_cache::LruFilingCache::new(capacity)))
    }

    /// Set the engine configuration used for filings loaded from now on.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a source, tried after every source already registered.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn FilingSource>) -> Self {
        self.register_source(source);
        self
    }

    /// Register a filing source.
    pub fn register_source(&mut self, source: Arc<dyn FilingSource>) {
        debug!(source = source.name(), "Registering filing source");
        self.sources.push(source);
    }

    /// Engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Load a filing, trying the cache first and then each source in order.
    ///
    /// # Errors
    /// Returns [`FolioError::FilingNotFound`] if no source is registered, otherwise
    /// the error of the last source tried when none could supply a usable filing.
    #[instrument(skip(self), fields(filing = %id))]
    pub fn load_filing(&self, id: &FilingId) -> Result<Arc<Filing>> {
        if let Some(cache) = &self.cache {
            match cache.get_filing(id) {
                Ok(Some(filing)) => return Ok(filing),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Cache lookup failed"),
            }
        }

        if self.sources.is_empty() {
            return Err(FolioError::FilingNotFound(format!(
                "{id}: no filing sources registered"
            )));
        }

        let mut last_error = None;
        for source in &self.sources {
            debug!(source = source.name(), "Fetching filing");
            let loaded = source
                .fetch(id)
                .and_then(|documents| Filing::from_documents(&documents, self.config.clone()));
            match loaded {
                Ok(filing) => {
                    let filing = Arc::new(filing);
                    if let Some(cache) = &self.cache
                        && let Err(e) = cache.put_filing(Arc::clone(&filing))
                    {
                        warn!(source = source.name(), error = %e, "Failed to cache filing");
                    }
                    return Ok(filing);
                }
                Err(e) => {
                    warn!(source = source.name(), error = %e, "Source failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| FolioError::Other("All sources failed with no error".to_string())))
    }

    /// Resolve the statement described by a query.
    ///
    /// Returns `Ok(None)` when the filing has no role for the statement.
    ///
    /// # Errors
    /// Fails only when the filing cannot be loaded.
    #[instrument(skip(self, query), fields(filing = %query.filing, statement = %query.statement_type))]
    pub fn statement(&self, query: &StatementQuery) -> Result<Option<StatementTable>> {
        if let Some(cache) = &self.cache {
            match cache.get_statement(query) {
                Ok(Some(table)) => return Ok(Some(table)),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Cache lookup failed"),
            }
        }

        let filing = self.load_filing(&query.filing)?;
        let table = filing.resolve(query);
        if let (Some(cache), Some(table)) = (&self.cache, &table)
            && let Err(e) = cache.put_statement(query, table)
        {
            warn!(error = %e, "Failed to memoize statement");
        }
        Ok(table)
    }

    /// Period columns a statement would show at the given cadence.
    ///
    /// # Errors
    /// Fails only when the filing cannot be loaded.
    pub fn period_keys(
        &self,
        id: &FilingId,
        statement_type: StatementType,
        count: usize,
        cadence: PeriodCadence,
    ) -> Result<Vec<PeriodKey>> {
        let filing = self.load_filing(id)?;
        Ok(filing.get_period_keys_with_cadence(statement_type, count, cadence))
    }

    /// Trailing-twelve-month sums of a concept for quarterly columns.
    ///
    /// # Errors
    /// Fails only when the filing cannot be loaded.
    pub fn rolling_ttm(
        &self,
        id: &FilingId,
        concept: &str,
        periods: &[PeriodKey],
    ) -> Result<Vec<Option<f64>>> {
        Ok(self.load_filing(id)?.rolling_ttm(concept, periods))
    }

    /// Fourth-quarter value of a concept derived from the annual figure.
    ///
    /// # Errors
    /// Fails only when the filing cannot be loaded.
    pub fn derive_quarter_from_annual(
        &self,
        id: &FilingId,
        concept: &str,
        fiscal_year: i32,
    ) -> Result<Option<f64>> {
        Ok(self
            .load_filing(id)?
            .derive_quarter_from_annual(concept, fiscal_year))
    }

    /// Drop cached entries older than the TTL; zero without a cache.
    ///
    /// # Errors
    /// Propagates cache failures.
    pub fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        self.cache
            .as_ref()
            .map_or(Ok(0), |cache| cache.invalidate_stale(ttl))
    }

    /// Clear the cache, if one is configured.
    ///
    /// # Errors
    /// Propagates cache failures.
    pub fn clear_cache(&self) -> Result<()> {
        self.cache.as_ref().map_or(Ok(()), |cache| cache.clear())
    }
}
