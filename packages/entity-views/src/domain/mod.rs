//! Domain layer for entity views
//!
//! # Domain Models
//!
//! - `Document`: A stored entity document carrying index-aligned triple arrays
//! - `ObjectRef`: Value emitted by the `by_object` view (the predicate only)
//! - `ViewRow`: One persisted view row (`id` of the emitting document, `key`, `value`)
//! - `IndexStats`: Row/key/document counts of a view index
//!
//! # Port Trait
//!
//! - `ViewIndexStore`: Sink the indexer writes view rows into
//!
//! # Examples
//!
//! ```rust
//! use entity_views::domain::Document;
//!
//! let doc = Document::rdf_entity(
//!     "urn:ers:entity:1",
//!     vec!["urn:ers:entity:1".into()],
//!     vec!["http://xmlns.com/foaf/0.1/knows".into()],
//!     vec!["http://example.org/alice".into()],
//! );
//! assert!(doc.is_rdf_entity());
//! ```

pub mod ports;

pub use ports::ViewIndexStore;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Document type tag of triple-bearing entity documents
pub const RDF_ENTITY: &str = "RDFEntity";

// ═══════════════════════════════════════════════════════════════════════════
// Domain Models
// ═══════════════════════════════════════════════════════════════════════════

/// Entity document as stored in the document store
///
/// Triples are held as three index-aligned arrays: the `i`-th triple is
/// `(s[i], p[i], o[i])`. Alignment is assumed, never checked here.
///
/// Unknown document fields (`_rev`, attachments, ...) are ignored on
/// deserialization. Stored documents are loaded leniently: a `null` or
/// non-string `doc_type` reads as `""`, and `s`/`p`/`o` that are `null` or not
/// arrays read as absent. Non-string array elements keep their position as
/// their JSON text, so alignment is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document ID (`_id` in the store)
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Document type tag
    #[serde(default, deserialize_with = "lenient_string")]
    pub doc_type: String,
    /// Subjects
    #[serde(default, deserialize_with = "lenient_strings")]
    pub s: Vec<String>,
    /// Predicates
    #[serde(default, deserialize_with = "lenient_strings")]
    pub p: Vec<String>,
    /// Objects (absent and empty are equivalent)
    #[serde(
        default,
        deserialize_with = "lenient_optional_strings",
        skip_serializing_if = "Option::is_none"
    )]
    pub o: Option<Vec<String>>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(value) => value,
        _ => String::new(),
    })
}

fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_optional_strings(deserializer)?.unwrap_or_default())
}

fn lenient_optional_strings<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(values) => Some(
            values
                .into_iter()
                .map(|value| match value {
                    Value::String(value) => value,
                    other => other.to_string(),
                })
                .collect(),
        ),
        _ => None,
    })
}

impl Document {
    /// Create an empty document of the given type
    pub fn new(doc_type: impl Into<String>) -> Self {
        Self {
            doc_type: doc_type.into(),
            ..Self::default()
        }
    }

    /// Create an `RDFEntity` document from aligned triple arrays
    pub fn rdf_entity(
        id: impl Into<String>,
        s: Vec<String>,
        p: Vec<String>,
        o: Vec<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            doc_type: RDF_ENTITY.to_string(),
            s,
            p,
            o: Some(o),
        }
    }

    /// Set the document ID
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Append one triple to the aligned arrays
    pub fn push_triple(
        &mut self,
        s: impl Into<String>,
        p: impl Into<String>,
        o: impl Into<String>,
    ) {
        self.s.push(s.into());
        self.p.push(p.into());
        self.o.get_or_insert_with(Vec::new).push(o.into());
    }

    /// Whether the document is declared as a triple-bearing entity
    pub fn is_rdf_entity(&self) -> bool {
        self.doc_type == RDF_ENTITY
    }

    /// Objects, treating an absent array as empty
    pub fn objects(&self) -> &[String] {
        self.o.as_deref().unwrap_or(&[])
    }
}

/// Value emitted for one qualifying object
///
/// Carries the predicate only. The subject is recovered from the row's
/// document id, never from the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Predicate linking the document to the object
    pub p: String,
}

impl ObjectRef {
    pub fn new(p: impl Into<String>) -> Self {
        Self { p: p.into() }
    }
}

/// One row of a view index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRow<V = ObjectRef> {
    /// ID of the document that emitted the row
    pub id: String,
    /// Index key
    pub key: String,
    /// Emitted value
    pub value: V,
}

impl<V> ViewRow<V> {
    pub fn new(id: impl Into<String>, key: impl Into<String>, value: V) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            value,
        }
    }
}

/// View index statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Distinct keys
    pub keys: usize,
    /// Total rows
    pub rows: usize,
    /// Documents with at least one row
    pub documents: usize,
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
