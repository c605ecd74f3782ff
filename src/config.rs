//! Explorer configuration.

use serde::{Deserialize, Serialize};

use crate::execution::guard::{WriteGuard, DEFAULT_DENYLIST};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Block label meaning "no label / no type constraint".
    pub wildcard_label: String,
    /// Primary label for nodes without labels.
    pub unknown_label: String,
    /// Joiner for caption parts.
    pub caption_separator: String,
    /// Caption property name that stands for the node's primary label.
    pub caption_label_token: String,
    /// Cap applied when a request carries no positive limit. `None` leaves such requests uncapped.
    pub default_limit: Option<i64>,
    /// Keywords rejected by raw execution.
    pub write_denylist: Vec<String>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            wildcard_label: "ANY".into(),
            unknown_label: "Unknown".into(),
            caption_separator: " ".into(),
            caption_label_token: "nodeLabel".into(),
            default_limit: None,
            write_denylist: DEFAULT_DENYLIST.iter().map(|k| (*k).to_owned()).collect(),
        }
    }
}

impl ExplorerConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn write_guard(&self) -> WriteGuard {
        WriteGuard::new(&self.write_denylist)
    }

    /// The request's limit when positive, else the configured default.
    pub fn effective_limit(&self, requested: Option<i64>) -> Option<i64> {
        crate::query::positive_limit(requested).or_else(|| crate::query::positive_limit(self.default_limit))
    }
}
