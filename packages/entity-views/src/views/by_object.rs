//! `by_object` view: object URI -> referencing predicate
//!
//! For every `RDFEntity` document, each object that starts with `http://` or
//! `https://` is emitted as a key, with the predicate at the same position as
//! the value. Literals, blank nodes and any other object strings are skipped.
//!
//! The prefix test is a literal string-prefix check. `"http://"` alone
//! qualifies, `"httpsxyz"` does not. Keys are the raw object strings.

use std::iter::{Enumerate, FusedIterator};
use std::slice::Iter;

use crate::domain::{Document, ObjectRef};

const HTTP_PREFIX: &str = "http://";
const HTTPS_PREFIX: &str = "https://";

/// Whether an object value is indexed as an object URI
pub fn is_object_uri(object: &str) -> bool {
    object.starts_with(HTTP_PREFIX) || object.starts_with(HTTPS_PREFIX)
}

/// Emit the `by_object` pairs of one document
///
/// Returns a lazy iterator over `(object, ObjectRef { p })` in object order.
/// Documents that are not `RDFEntity`, or that have no objects, yield nothing.
///
/// # Panics
///
/// When a qualifying object at index `i` has no predicate `p[i]`, the
/// iterator panics on reaching it. Misaligned documents are a data fault the
/// caller isolates; no default predicate is substituted.
///
/// # Examples
///
/// ```rust
/// use entity_views::domain::{Document, ObjectRef};
/// use entity_views::views::by_object;
///
/// let doc = Document::rdf_entity(
///     "e1",
///     vec!["s1".into(), "s2".into()],
///     vec!["p1".into(), "p2".into()],
///     vec!["https://a.org".into(), "ftp://b.org".into()],
/// );
///
/// let pairs: Vec<_> = by_object(&doc).collect();
/// assert_eq!(pairs, vec![("https://a.org".to_string(), ObjectRef::new("p1"))]);
/// ```
pub fn by_object(doc: &Document) -> ByObject<'_> {
    let objects: &[String] = if doc.is_rdf_entity() {
        doc.objects()
    } else {
        &[]
    };

    ByObject {
        predicates: &doc.p,
        objects: objects.iter().enumerate(),
    }
}

/// Iterator returned by [`by_object`]
#[derive(Debug, Clone)]
pub struct ByObject<'d> {
    predicates: &'d [String],
    objects: Enumerate<Iter<'d, String>>,
}

impl Iterator for ByObject<'_> {
    type Item = (String, ObjectRef);

    fn next(&mut self) -> Option<Self::Item> {
        for (i, object) in self.objects.by_ref() {
            if !is_object_uri(object) {
                continue;
            }

            let Some(predicate) = self.predicates.get(i) else {
                panic!(
                    "object {} at index {} has no predicate (p has {} entries)",
                    object,
                    i,
                    self.predicates.len()
                );
            };

            return Some((object.clone(), ObjectRef::new(predicate.as_str())));
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.objects.size_hint().1)
    }
}

impl FusedIterator for ByObject<'_> {}
