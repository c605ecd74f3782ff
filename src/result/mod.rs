//! # Display-Ready Results
//!
//! Shapes handed to the presentation layer, and the pipeline that produces
//! them from raw rows:
//!
//! ```text
//! QueryResult ─→ Denormalizer (dedup + style + caption) ─→ GraphView
//!                                                            │
//!                       connectivity::enrich (one aggregate) ┘
//! ```

pub mod connectivity;
pub mod denormalize;
pub mod style;

use serde::{Deserialize, Serialize};

use crate::model::ElementId;

pub use connectivity::{ConnectDetail, EdgePosition};
pub use denormalize::{Denormalizer, RequestContext};
pub use style::{CaptionRule, StyleCache, StyleConfig};

/// A node as the client draws it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: ElementId,
    /// Primary label.
    pub label: String,
    pub labels: Vec<String>,
    pub properties: serde_json::Map<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ConnectDetail>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_connect_count: Option<u64>,
}

/// A relationship as the client draws it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphRelationship {
    pub id: ElementId,
    /// Relationship type.
    pub label: String,
    pub source: ElementId,
    pub target: ElementId,
    pub properties: serde_json::Map<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_style: Option<StyleConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_style: Option<StyleConfig>,
}

/// Deduplicated node and relationship collections for one response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphView {
    /// The anchor node of a neighbor expansion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_node: Option<GraphNode>,
    pub nodes: Vec<GraphNode>,
    pub relationships: Vec<GraphRelationship>,
}

impl GraphView {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id.as_str() == id)
    }

    pub fn relationship(&self, id: &str) -> Option<&GraphRelationship> {
        self.relationships.iter().find(|r| r.id.as_str() == id)
    }
}
