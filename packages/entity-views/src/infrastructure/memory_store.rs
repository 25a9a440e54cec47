//! In-Memory View Index Store
//!
//! BTreeMap-backed reference implementation of `ViewIndexStore`.
//! Rows are kept sorted by (key, document id, emission order).

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::{IndexStats, ObjectRef, ViewIndexStore, ViewRow};
use crate::{IndexError, Result};

/// (key, document id, emission order)
type RowKey = (String, String, usize);

struct Inner<V> {
    rows: BTreeMap<RowKey, V>,
    by_doc: HashMap<String, Vec<RowKey>>,
}

impl<V> Inner<V> {
    fn remove_document(&mut self, doc_id: &str) {
        if let Some(keys) = self.by_doc.remove(doc_id) {
            for key in keys {
                self.rows.remove(&key);
            }
        }
    }
}

#[derive(Clone)]
pub struct InMemoryViewIndexStore<V = ObjectRef> {
    inner: Arc<RwLock<Inner<V>>>,
}

impl<V> InMemoryViewIndexStore<V> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                rows: BTreeMap::new(),
                by_doc: HashMap::new(),
            })),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner<V>>> {
        self.inner
            .read()
            .map_err(|_| IndexError::store("view index lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner<V>>> {
        self.inner
            .write()
            .map_err(|_| IndexError::store("view index lock poisoned"))
    }
}

impl<V> Default for InMemoryViewIndexStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

fn to_row<V: Clone>((key, id, _): &RowKey, value: &V) -> ViewRow<V> {
    ViewRow::new(id.as_str(), key.as_str(), value.clone())
}

#[async_trait]
impl<V> ViewIndexStore<V> for InMemoryViewIndexStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn replace_document(&self, doc_id: &str, rows: Vec<ViewRow<V>>) -> Result<()> {
        let mut inner = self.write()?;
        inner.remove_document(doc_id);

        if rows.is_empty() {
            return Ok(());
        }

        let mut keys = Vec::with_capacity(rows.len());
        for (seq, row) in rows.into_iter().enumerate() {
            let key = (row.key, doc_id.to_string(), seq);
            inner.rows.insert(key.clone(), row.value);
            keys.push(key);
        }
        inner.by_doc.insert(doc_id.to_string(), keys);

        Ok(())
    }

    async fn remove_document(&self, doc_id: &str) -> Result<()> {
        self.write()?.remove_document(doc_id);
        Ok(())
    }

    async fn query_key(&self, key: &str) -> Result<Vec<ViewRow<V>>> {
        let inner = self.read()?;
        let start: RowKey = (key.to_string(), String::new(), 0);

        Ok(inner
            .rows
            .range((Bound::Included(start), Bound::Unbounded))
            .take_while(|((k, _, _), _)| k == key)
            .map(|(row_key, value)| to_row(row_key, value))
            .collect())
    }

    async fn query_range(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<ViewRow<V>>> {
        let inner = self.read()?;
        let lower = match start {
            Some(start) => Bound::Included((start.to_string(), String::new(), 0)),
            None => Bound::Unbounded,
        };

        Ok(inner
            .rows
            .range((lower, Bound::Unbounded))
            .take_while(|((k, _, _), _)| end.map_or(true, |end| k.as_str() < end))
            .map(|(row_key, value)| to_row(row_key, value))
            .collect())
    }

    async fn stats(&self) -> Result<IndexStats> {
        let inner = self.read()?;

        let mut keys = 0;
        let mut last: Option<&str> = None;
        for (key, _, _) in inner.rows.keys() {
            if last != Some(key.as_str()) {
                keys += 1;
                last = Some(key.as_str());
            }
        }

        Ok(IndexStats {
            keys,
            rows: inner.rows.len(),
            documents: inner.by_doc.len(),
        })
    }
}
