//! A bound path variable (`MATCH p = ...`) as the store returns it.

use serde::{Deserialize, Serialize};
use super::{Node, Relationship};

/// Nodes and the relationships joining them, in traversal order.
///
/// `nodes[i]` and `nodes[i + 1]` are the endpoints of `relationships[i]`,
/// though the relationship may point either way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub nodes: Vec<Node>,
    pub relationships: Vec<Relationship>,
}

impl Path {
    /// Zero-hop path: what a single-block search binds.
    pub fn single(node: Node) -> Self {
        Self { nodes: vec![node], relationships: Vec::new() }
    }

    /// Walk one more relationship to `node`.
    pub fn hop(mut self, rel: Relationship, node: Node) -> Self {
        self.relationships.push(rel);
        self.nodes.push(node);
        self
    }

    pub fn hops(&self) -> usize {
        self.relationships.len()
    }
}
