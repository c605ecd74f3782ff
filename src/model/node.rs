//! Node in the property graph.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use super::{PropertyMap, Value};

/// Store-assigned element identity (Neo4j 5.x `elementId`, e.g. `"4:abc:123"`).
///
/// Opaque: stable within one store instance, not across compaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(s: &str) -> Self { ElementId(s.to_owned()) }
}

impl From<String> for ElementId {
    fn from(s: String) -> Self { ElementId(s) }
}

/// A node in the property graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub element_id: ElementId,
    /// Ordered label set. The first label is the primary label.
    pub labels: SmallVec<[String; 2]>,
    pub properties: PropertyMap,
}

impl Node {
    pub fn new(element_id: impl Into<ElementId>) -> Self {
        Self {
            element_id: element_id.into(),
            labels: SmallVec::new(),
            properties: PropertyMap::new(),
        }
    }

    pub fn with_labels(mut self, labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// First label, if the node has any.
    pub fn primary_label(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}
