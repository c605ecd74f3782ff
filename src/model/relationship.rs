//! Relationship (edge) in the property graph.

use serde::{Deserialize, Serialize};
use super::{ElementId, PropertyMap, Value};

/// Traversal direction, seen from the anchor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

impl Direction {
    /// Parse a request direction. `OUT` and `IN` are directed (case-insensitive);
    /// anything else, including `BOTH`, `ALL` and absent, is undirected.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(d) if d.eq_ignore_ascii_case("OUT") => Direction::Outgoing,
            Some(d) if d.eq_ignore_ascii_case("IN") => Direction::Incoming,
            _ => Direction::Both,
        }
    }

    /// Wire keyword used in request/response shapes.
    pub fn keyword(self) -> &'static str {
        match self {
            Direction::Outgoing => "OUT",
            Direction::Incoming => "IN",
            Direction::Both => "ALL",
        }
    }
}

/// A relationship (directed edge) in the property graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub element_id: ElementId,
    pub start_node: ElementId,
    pub end_node: ElementId,
    pub rel_type: String,
    pub properties: PropertyMap,
}

impl Relationship {
    pub fn new(
        element_id: impl Into<ElementId>,
        start_node: impl Into<ElementId>,
        end_node: impl Into<ElementId>,
        rel_type: impl Into<String>,
    ) -> Self {
        Self {
            element_id: element_id.into(),
            start_node: start_node.into(),
            end_node: end_node.into(),
            rel_type: rel_type.into(),
            properties: PropertyMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}
