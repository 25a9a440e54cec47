//! Error types for entity-views

use std::fmt;
use thiserror::Error;

/// Index error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A document faulted while its view was being mapped
    MalformedDocument,
    /// Serialization/deserialization errors
    Serialization,
    /// Configuration errors
    Config,
    /// View index store errors
    Store,
    /// I/O errors
    IO,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MalformedDocument => "malformed_document",
            ErrorKind::Serialization => "serialization",
            ErrorKind::Config => "config",
            ErrorKind::Store => "store",
            ErrorKind::IO => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Index error type
#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct IndexError {
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    pub kind: ErrorKind,
    pub message: String,
    /// Id of the document the error belongs to, when there is one
    pub doc_id: Option<String>,
}

impl IndexError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
            doc_id: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // Convenience constructors
    pub fn malformed_document(doc_id: impl Into<String>, detail: impl Into<String>) -> Self {
        let doc_id = doc_id.into();
        let mut err = Self::new(
            ErrorKind::MalformedDocument,
            format!("Malformed document {}: {}", doc_id, detail.into()),
        );
        err.doc_id = Some(doc_id);
        err
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Store, message)
    }
}

// JSON error conversions
impl From<serde_json::Error> for IndexError {
    fn from(err: serde_json::Error) -> Self {
        IndexError::serialization(format!("JSON error: {}", err)).with_source(err)
    }
}

// YAML error conversions (indexer configuration)
impl From<serde_yaml::Error> for IndexError {
    fn from(err: serde_yaml::Error) -> Self {
        IndexError::config(format!("YAML error: {}", err)).with_source(err)
    }
}

impl From<std::io::Error> for IndexError {
    fn from(err: std::io::Error) -> Self {
        IndexError::new(ErrorKind::IO, format!("I/O error: {}", err)).with_source(err)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, IndexError>;
