//! Filing documents and the source trait.
//!
//! The engine never fetches anything itself. A [`FilingSource`] hands it a
//! [`FilingDocuments`] bundle with the raw text of every document it needs; where the
//! text came from (network, disk, an archive) is the source's business.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::error::Result;
use crate::types::{ElementCatalog, ElementInfo, FilingId};

/// Raw inputs for one filing.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FilingDocuments {
    /// Filing identity.
    pub id: FilingId,
    /// Instance document (contexts, units, facts).
    pub instance: String,
    /// Calculation linkbase.
    pub calculation: Option<String>,
    /// Presentation linkbase.
    pub presentation: Option<String>,
    /// Label linkbase.
    pub labels: Option<String>,
    /// Element metadata flattened from the taxonomy schema.
    pub elements: ElementCatalog,
    /// Role URI → human definition (e.g., "0002 - Statement - Balance Sheets").
    pub role_definitions: BTreeMap<String, String>,
}

impl FilingDocuments {
    /// Creates a bundle holding only the instance document.
    #[must_use]
    pub fn new(id: FilingId, instance: impl Into<String>) -> Self {
        Self {
            id,
            instance: instance.into(),
            ..Default::default()
        }
    }

    /// Sets the calculation linkbase.
    #[must_use]
    pub fn with_calculation(mut self, xml: impl Into<String>) -> Self {
        self.calculation = Some(xml.into());
        self
    }

    /// Sets the presentation linkbase.
    #[must_use]
    pub fn with_presentation(mut self, xml: impl Into<String>) -> Self {
        self.presentation = Some(xml.into());
        self
    }

    /// Sets the label linkbase.
    #[must_use]
    pub fn with_labels(mut self, xml: impl Into<String>) -> Self {
        self.labels = Some(xml.into());
        self
    }

    /// Replaces the element catalog.
    #[must_use]
    pub fn with_elements(mut self, elements: ElementCatalog) -> Self {
        self.elements = elements;
        self
    }

    /// Adds metadata for one element.
    #[must_use]
    pub fn with_element(mut self, element_id: impl Into<String>, info: ElementInfo) -> Self {
        self.elements.insert(element_id, info);
        self
    }

    /// Adds a role definition.
    #[must_use]
    pub fn with_role_definition(
        mut self,
        role: impl Into<String>,
        definition: impl Into<String>,
    ) -> Self {
        self.role_definitions.insert(role.into(), definition.into());
        self
    }
}

/// Supplier of raw filing documents.
///
/// Implementations wrap whatever retrieves documents; the engine only sees the
/// resulting [`FilingDocuments`].
pub trait FilingSource: Send + Sync + Debug {
    /// Returns the name of this source.
    fn name(&self) -> &str;

    /// Returns the documents of a filing.
    ///
    /// Sources that do not hold the filing return
    /// [`FolioError::FilingNotFound`](crate::error::FolioError::FilingNotFound) so callers
    /// can fall back to the next source.
    fn fetch(&self, id: &FilingId) -> Result<FilingDocuments>;
}
