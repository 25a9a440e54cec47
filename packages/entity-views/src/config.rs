//! Indexer configuration (YAML)
//!
//! ```yaml
//! version: 1
//! design: entity
//! parallel_threshold: 64
//! fault_policy: isolate
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{IndexError, Result};

const SUPPORTED_VERSION: u32 = 1;

/// What the indexer does with a document whose view mapping faults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultPolicy {
    /// Skip and report the document, keep building
    #[default]
    Isolate,
    /// Fail the whole build before anything is written
    Abort,
}

/// View indexer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexerConfig {
    /// Schema version (always 1)
    pub version: u32,

    /// Design document name (`_design/{design}`)
    #[serde(default = "default_design")]
    pub design: String,

    /// Batches of at least this many documents are mapped in parallel
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,

    #[serde(default)]
    pub fault_policy: FaultPolicy,
}

fn default_design() -> String {
    "entity".to_string()
}

fn default_parallel_threshold() -> usize {
    64
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_VERSION,
            design: default_design(),
            parallel_threshold: default_parallel_threshold(),
            fault_policy: FaultPolicy::default(),
        }
    }
}

impl IndexerConfig {
    pub fn fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.fault_policy = policy;
        self
    }

    pub fn parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Load and validate a YAML configuration file
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate YAML configuration text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != SUPPORTED_VERSION {
            return Err(IndexError::config(format!(
                "Unsupported configuration version {}. Supported versions: {}",
                self.version, SUPPORTED_VERSION
            )));
        }

        if self.design.is_empty() || self.design.contains('/') {
            return Err(IndexError::config(format!(
                "Invalid design name '{}': must be non-empty and contain no '/'",
                self.design
            )));
        }

        if self.parallel_threshold == 0 {
            return Err(IndexError::config(
                "parallel_threshold must be at least 1",
            ));
        }

        Ok(())
    }
}
