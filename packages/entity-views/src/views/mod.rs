//! Map views registered with the index engine
//!
//! A view is a pure mapping from one document to zero or more `(key, value)`
//! emissions. The engine owns invocation (once per document on build, again
//! on every write); the view owns nothing beyond a single call.

pub mod by_object;
pub mod design;

pub use by_object::{by_object, is_object_uri, ByObject};
pub use design::{DesignDocument, ViewDefinition};

use crate::domain::{Document, ObjectRef};

/// Receives the emissions of one view invocation
pub trait EmitSink<V> {
    fn emit(&mut self, key: String, value: V);
}

impl<V> EmitSink<V> for Vec<(String, V)> {
    fn emit(&mut self, key: String, value: V) {
        self.push((key, value));
    }
}

/// Map function registered under a design document
pub trait MapView: Send + Sync {
    /// Emitted value type
    type Value: Clone + Send + Sync + 'static;

    /// View name inside its design document
    fn name(&self) -> &str;

    /// Server-side source of the same map function
    fn map_source(&self) -> &str;

    /// Emit the rows of one document into `sink`, in emission order
    fn map(&self, doc: &Document, sink: &mut dyn EmitSink<Self::Value>);
}

/// Source deployed as the `by_object` map function
///
/// On a document whose `p` is shorter than `o`, this server-side function
/// emits `{ p: undefined }` (serialized as `{}`) for the unmatched objects,
/// while [`by_object`] panics and the indexer faults the whole document. The
/// two indexes therefore differ on such documents; the in-process emitter
/// never produces a row without a predicate.
const BY_OBJECT_MAP_SOURCE: &str = r#"function (doc) {
  if (doc.doc_type === "RDFEntity" && doc.o && doc.o.length > 0) {
    for (var i = 0; i < doc.o.length; i++) {
      var obj = doc.o[i];
      if (obj.substr(0, 7) === "http://" || obj.substr(0, 8) === "https://") {
        emit(obj, { p: doc.p[i] });
      }
    }
  }
}"#;

/// The `by_object` view as a registrable [`MapView`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ByObjectView;

impl ByObjectView {
    pub const NAME: &'static str = "by_object";
}

impl MapView for ByObjectView {
    type Value = ObjectRef;

    fn name(&self) -> &str {
        Self::NAME
    }

    fn map_source(&self) -> &str {
        BY_OBJECT_MAP_SOURCE
    }

    fn map(&self, doc: &Document, sink: &mut dyn EmitSink<ObjectRef>) {
        for (key, value) in by_object(doc) {
            sink.emit(key, value);
        }
    }
}
