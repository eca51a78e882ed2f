//! In-memory filing source.

use folio_core::{FilingDocuments, FilingId, FilingSource, FolioError, Result};
use std::collections::BTreeMap;
use tracing::trace;

/// A [`FilingSource`] serving documents held in memory.
///
/// Useful for tests, for documents already downloaded by the caller, and as the last
/// fallback behind a network source.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    name: String,
    filings: BTreeMap<FilingId, FilingDocuments>,
}

impl InMemorySource {
    /// Create an empty source.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filings: BTreeMap::new(),
        }
    }

    /// Add a filing's documents.
    #[must_use]
    pub fn with_filing(mut self, documents: FilingDocuments) -> Self {
        self.insert(documents);
        self
    }

    /// Add or replace a filing's documents.
    pub fn insert(&mut self, documents: FilingDocuments) {
        self.filings.insert(documents.id.clone(), documents);
    }

    /// Identities of every filing held, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &FilingId> {
        self.filings.keys()
    }

    /// Number of filings held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filings.len()
    }

    /// Returns true if no filing is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filings.is_empty()
    }
}

impl FilingSource for InMemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, id: &FilingId) -> Result<FilingDocuments> {
        trace!(source = %self.name, filing = %id, "Fetching filing from memory");
        self.filings
            .get(id)
            .cloned()
            .ok_or_else(|| FolioError::FilingNotFound(id.to_string()))
    }
}
