//! Port trait for view index storage

use async_trait::async_trait;

use super::{IndexStats, ViewRow};
use crate::Result;

/// View index storage abstraction
///
/// Persists `key -> rows` as a multi-valued secondary index. Rows are owned
/// per document: writing a document replaces whatever it emitted before.
///
/// # Ordering
///
/// Query results are ordered by key, then document id, then emission order
/// within the document.
///
/// # Implementations
///
/// - `InMemoryViewIndexStore`: BTreeMap-backed reference store
#[async_trait]
pub trait ViewIndexStore<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    /// Replace all rows emitted by `doc_id` with `rows`
    ///
    /// An empty `rows` leaves the document without rows.
    async fn replace_document(&self, doc_id: &str, rows: Vec<ViewRow<V>>) -> Result<()>;

    /// Remove all rows emitted by `doc_id`
    async fn remove_document(&self, doc_id: &str) -> Result<()>;

    /// Rows whose key equals `key` exactly
    async fn query_key(&self, key: &str) -> Result<Vec<ViewRow<V>>>;

    /// Rows with `start <= key < end`; a missing bound is open
    async fn query_range(&self, start: Option<&str>, end: Option<&str>)
        -> Result<Vec<ViewRow<V>>>;

    /// Key/row/document counts
    async fn stats(&self) -> Result<IndexStats>;
}
