//! Design documents: the store-side registration of map views

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::MapView;
use crate::Result;

const DESIGN_PREFIX: &str = "_design/";

/// One view entry of a design document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDefinition {
    pub map: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduce: Option<String>,
}

/// Design document holding named map views
///
/// # Examples
///
/// ```rust
/// use entity_views::views::{ByObjectView, DesignDocument};
///
/// let design = DesignDocument::new("entity").with_view(&ByObjectView);
/// assert_eq!(design.id, "_design/entity");
/// assert!(design.views.contains_key("by_object"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub language: String,
    pub views: BTreeMap<String, ViewDefinition>,
}

impl DesignDocument {
    /// Create an empty design document named `_design/{name}`
    pub fn new(name: &str) -> Self {
        Self {
            id: format!("{}{}", DESIGN_PREFIX, name),
            language: "javascript".to_string(),
            views: BTreeMap::new(),
        }
    }

    /// Register a view (replaces a view of the same name)
    pub fn with_view<M: MapView>(mut self, view: &M) -> Self {
        self.views.insert(
            view.name().to_string(),
            ViewDefinition {
                map: view.map_source().to_string(),
                reduce: None,
            },
        );
        self
    }

    /// Design name without the `_design/` prefix
    pub fn name(&self) -> &str {
        self.id.strip_prefix(DESIGN_PREFIX).unwrap_or(&self.id)
    }

    /// Signature of the view definitions
    ///
    /// Hex SHA-256 over the JSON of `language` and `views`. Changes whenever a
    /// view is added, removed or edited, so stale indexes can be detected.
    pub fn signature(&self) -> Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(self.language.as_bytes());
        hasher.update(serde_json::to_vec(&self.views)?);

        Ok(format!("{:x}", hasher.finalize()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
