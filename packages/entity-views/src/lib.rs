//! entity-views - Secondary views over RDF entity documents
//!
//! Entity documents store triples as three index-aligned arrays (`s`, `p`,
//! `o`). The `by_object` view maps each document to `(object URI, {p})` rows
//! so the store can answer "which documents reference X, and via which
//! predicate?" without scanning every document.
//!
//! ## Layers
//!
//! - `views`: pure map functions (`by_object`) and their design document
//! - `indexer`: per-document invocation, fault isolation, batch builds
//! - `domain`: documents, rows and the `ViewIndexStore` port
//! - `infrastructure`: in-memory store adapter
//!
//! ## Usage
//!
//! ```rust,ignore
//! use entity_views::{ByObjectView, IndexerConfig, InMemoryViewIndexStore, ViewIndexer};
//!
//! let indexer = ViewIndexer::new(
//!     ByObjectView,
//!     InMemoryViewIndexStore::new(),
//!     IndexerConfig::from_yaml("indexer.yaml")?,
//! )?;
//!
//! // 1. Full (re)build
//! let report = indexer.build(&documents).await?;
//!
//! // 2. Re-index on write
//! indexer.update(&changed).await?;
//!
//! // 3. Query by object URI
//! let rows = indexer.store().query_key("http://example.org/alice").await?;
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod indexer;
pub mod infrastructure;
pub mod views;

pub use config::{FaultPolicy, IndexerConfig};
pub use domain::{Document, IndexStats, ObjectRef, ViewIndexStore, ViewRow, RDF_ENTITY};
pub use error::{ErrorKind, IndexError, Result};
pub use indexer::{BuildReport, ViewIndexer};
pub use infrastructure::InMemoryViewIndexStore;
pub use views::{by_object, is_object_uri, ByObjectView, DesignDocument, MapView};
