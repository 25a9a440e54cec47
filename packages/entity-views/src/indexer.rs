//! View indexer: drives a map view over documents into a view index store
//!
//! Mapping is pure and runs on the rayon pool once a batch reaches
//! `parallel_threshold`; writes go to the store one document at a time.
//!
//! A view that panics on a document (e.g. `by_object` on a document whose
//! predicates are shorter than its objects) faults that document only. Under
//! `FaultPolicy::Isolate` the document is reported and its rows are removed;
//! under `FaultPolicy::Abort` the build fails before anything is written.
//! Such panics are reported through the returned error and the `warn!` log,
//! not the process panic hook, so a batch of bad documents does not flood
//! stderr.

use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{FaultPolicy, IndexerConfig};
use crate::domain::{Document, ViewIndexStore, ViewRow};
use crate::views::{DesignDocument, MapView};
use crate::{ErrorKind, IndexError, Result};

/// Outcome of one build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    /// Documents seen
    pub documents: usize,
    /// Documents that emitted at least one row
    pub emitting_documents: usize,
    /// Rows written
    pub rows: usize,
    /// IDs of documents whose mapping faulted
    pub faulted: Vec<String>,
    pub finished_at: DateTime<Utc>,
}

pub struct ViewIndexer<M, S> {
    view: M,
    store: S,
    config: IndexerConfig,
}

impl<M, S> ViewIndexer<M, S>
where
    M: MapView,
    S: ViewIndexStore<M::Value>,
{
    pub fn new(view: M, store: S, config: IndexerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            view,
            store,
            config,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Design document registering this indexer's view
    pub fn design_document(&self) -> DesignDocument {
        DesignDocument::new(&self.config.design).with_view(&self.view)
    }

    /// Map one document into rows tagged with `doc_id`
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::MalformedDocument` if the view faults on the document.
    pub fn map_document(&self, doc_id: &str, doc: &Document) -> Result<Vec<ViewRow<M::Value>>> {
        install_quiet_hook();
        let _mapping = MappingGuard::enter();
        let emitted = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut emitted: Vec<(String, M::Value)> = Vec::new();
            self.view.map(doc, &mut emitted);
            emitted
        }))
        .map_err(|payload| IndexError::malformed_document(doc_id, panic_message(payload.as_ref())))?;

        Ok(emitted
            .into_iter()
            .map(|(key, value)| ViewRow::new(doc_id, key, value))
            .collect())
    }

    /// Index a batch of documents
    ///
    /// Documents without an `_id` are keyed by their batch position (`#0`,
    /// `#1`, ...).
    pub async fn build(&self, docs: &[Document]) -> Result<BuildReport> {
        let mut mapped = self.map_batch(docs);

        if self.config.fault_policy == FaultPolicy::Abort {
            if let Some(pos) = mapped.iter().position(|(_, result)| result.is_err()) {
                if let (_, Err(err)) = mapped.swap_remove(pos) {
                    warn!("{}: aborting build: {}", self.view.name(), err);
                    return Err(err);
                }
            }
        }

        let mut report = BuildReport {
            documents: docs.len(),
            emitting_documents: 0,
            rows: 0,
            faulted: Vec::new(),
            finished_at: Utc::now(),
        };

        for (doc_id, result) in mapped {
            match result {
                Ok(rows) => {
                    debug!("{}: {} rows emitted for {}", self.view.name(), rows.len(), doc_id);
                    if !rows.is_empty() {
                        report.emitting_documents += 1;
                        report.rows += rows.len();
                    }
                    self.store.replace_document(&doc_id, rows).await?;
                }
                Err(err) => {
                    warn!("{}: skipping document: {}", self.view.name(), err);
                    self.store.remove_document(&doc_id).await?;
                    report.faulted.push(doc_id);
                }
            }
        }

        report.finished_at = Utc::now();
        info!(
            view = self.view.name(),
            documents = report.documents,
            rows = report.rows,
            faulted = report.faulted.len(),
            "view build finished"
        );

        Ok(report)
    }

    /// Re-index one written document, returning the number of rows it now has
    pub async fn update(&self, doc: &Document) -> Result<usize> {
        let doc_id = doc
            .id
            .as_deref()
            .ok_or_else(|| {
                IndexError::new(
                    ErrorKind::MalformedDocument,
                    "cannot index a document without an _id",
                )
            })?;

        match self.map_document(doc_id, doc) {
            Ok(rows) => {
                let count = rows.len();
                self.store.replace_document(doc_id, rows).await?;
                Ok(count)
            }
            Err(err) => {
                self.store.remove_document(doc_id).await?;
                Err(err)
            }
        }
    }

    fn map_batch(&self, docs: &[Document]) -> Vec<(String, Result<Vec<ViewRow<M::Value>>>)> {
        let map_one = |(position, doc): (usize, &Document)| {
            let doc_id = doc
                .id
                .clone()
                .unwrap_or_else(|| format!("#{}", position));
            let result = self.map_document(&doc_id, doc);
            (doc_id, result)
        };

        if docs.len() >= self.config.parallel_threshold {
            docs.par_iter().enumerate().map(map_one).collect()
        } else {
            docs.iter().enumerate().map(map_one).collect()
        }
    }
}

thread_local! {
    static MAPPING: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Wrap the process panic hook so it stays silent for panics raised while a
/// view maps a document on the current thread. Other panics still reach the
/// previous hook.
fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !is_mapping() {
                previous(info);
            }
        }));
    });
}

/// Marks the current thread as mapping a document until dropped
struct MappingGuard {
    outer: bool,
}

impl MappingGuard {
    fn enter() -> Self {
        Self {
            outer: MAPPING.with(|mapping| mapping.replace(true)),
        }
    }
}

impl Drop for MappingGuard {
    fn drop(&mut self) {
        MAPPING.with(|mapping| mapping.set(self.outer));
    }
}

fn is_mapping() -> bool {
    MAPPING.try_with(Cell::get).unwrap_or(false)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "view panicked".to_string()
    }
}
