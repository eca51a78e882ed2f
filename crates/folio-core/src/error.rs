//! Error types for statement resolution.
//!
//! This module defines [`FolioError`]. Structural problems inside a filing (dangling
//! arcs, malformed order attributes, missing statements) are not errors; they are
//! logged and degraded around. Errors are reserved for inputs that cannot be used at
//! all and for failures of the collaborators around the engine.

use thiserror::Error;

/// Errors that can occur while loading or resolving a filing.
#[derive(Error, Debug)]
pub enum FolioError {
    /// A document is not well-formed XML.
    #[error("XML error in {document}: {message}")]
    Xml {
        /// Which document failed (instance, presentation, ...).
        document: String,
        /// Parser message.
        message: String,
    },

    /// A value could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// No source could supply the requested filing.
    #[error("Filing not found: {0}")]
    FilingNotFound(String),

    /// A filing source failed.
    #[error("Source {source_name} failed: {message}")]
    Source {
        /// Name of the failing source.
        source_name: String,
        /// Failure description.
        message: String,
    },

    /// Error interacting with the cache.
    #[error("Cache error: {0}")]
    Cache(String),

    /// DataFrame construction failed.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Configuration or payload (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The requested feature is not supported.
    #[error("Feature not supported: {0}")]
    NotSupported(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl FolioError {
    /// Builds an [`FolioError::Xml`] for the named document.
    pub fn xml(document: impl Into<String>, message: impl ToString) -> Self {
        Self::Xml {
            document: document.into(),
            message: message.to_string(),
        }
    }
}

/// Result type alias using [`FolioError`].
pub type Result<T> = std::result::Result<T, FolioError>;
