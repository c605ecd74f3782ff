//! Pattern assembler: NODE/RELATIONSHIP block chain → one connected path.
//!
//! Anchors are named after their block position: `n0`, `r1`, `n2`, `r3`, ...

use crate::cypher::ast::{NodePattern, Pattern, PatternDirection, PatternElement, RelPattern};
use crate::model::Direction;
use crate::{Error, Result};

use super::block::{BlockKind, QueryBlock};

/// Name of the whole-path variable bound over the assembled chain.
pub const PATH_VARIABLE: &str = "p";

/// The growing end of a path under construction.
#[derive(Debug, Clone)]
pub enum PathTail {
    /// A lone node, before the first hop.
    SingleAnchor(NodePattern),
    /// One or more hops hanging off `start`.
    Chain { start: NodePattern, hops: Vec<(RelPattern, NodePattern)> },
}

impl PathTail {
    /// Extend the tail by one typed, named hop to `to`.
    pub fn extend(self, direction: Direction, rel_type: Option<&str>, name: String, to: NodePattern) -> Self {
        let hop = RelPattern {
            alias: Some(name),
            rel_types: rel_type.map(|t| vec![t.to_owned()]).unwrap_or_default(),
            direction: match direction {
                Direction::Outgoing => PatternDirection::Right,
                Direction::Incoming => PatternDirection::Left,
                Direction::Both => PatternDirection::Both,
            },
        };
        match self {
            PathTail::SingleAnchor(start) => PathTail::Chain { start, hops: vec![(hop, to)] },
            PathTail::Chain { start, mut hops } => {
                hops.push((hop, to));
                PathTail::Chain { start, hops }
            }
        }
    }

    pub fn hop_count(&self) -> usize {
        match self {
            PathTail::SingleAnchor(_) => 0,
            PathTail::Chain { hops, .. } => hops.len(),
        }
    }

    /// Flatten into a pattern bound to `path_variable`.
    pub fn into_pattern(self, path_variable: Option<&str>) -> Pattern {
        let mut elements = Vec::new();
        match self {
            PathTail::SingleAnchor(start) => elements.push(PatternElement::Node(start)),
            PathTail::Chain { start, hops } => {
                elements.reserve(1 + hops.len() * 2);
                elements.push(PatternElement::Node(start));
                for (rel, node) in hops {
                    elements.push(PatternElement::Relationship(rel));
                    elements.push(PatternElement::Node(node));
                }
            }
        }
        Pattern { path_variable: path_variable.map(str::to_owned), elements }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    Node,
    Relationship,
}

/// A named position in the pattern, tied back to the block it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub name: String,
    pub kind: AnchorKind,
    pub block_index: usize,
}

/// Output of [`assemble`].
#[derive(Debug, Clone)]
pub struct AssembledPattern {
    pub pattern: Pattern,
    /// Anchors in block order.
    pub anchors: Vec<Anchor>,
}

/// Drop a trailing relationship block that has no node after it.
pub fn usable_chain(blocks: &[QueryBlock]) -> &[QueryBlock] {
    if blocks.len() % 2 == 0 && !blocks.is_empty() {
        tracing::debug!(blocks = blocks.len(), "dropping dangling trailing relationship block");
        &blocks[..blocks.len() - 1]
    } else {
        blocks
    }
}

/// Assemble a NODE, RELATIONSHIP, NODE, ... chain into one path pattern.
///
/// The chain must start with a NODE block and alternate strictly. A trailing
/// relationship block with no following node is dropped.
pub fn assemble(blocks: &[QueryBlock], wildcard: &str) -> Result<AssembledPattern> {
    let blocks = usable_chain(blocks);
    let Some(first) = blocks.first() else {
        return Err(Error::InvalidInput("block list is empty".into()));
    };

    for (i, block) in blocks.iter().enumerate() {
        let expected = if i % 2 == 0 { BlockKind::Node } else { BlockKind::Relationship };
        if block.kind != expected {
            return Err(Error::InvalidInput(format!(
                "block {i} is {:?}, expected {expected:?}",
                block.kind
            )));
        }
    }

    let mut anchors = vec![Anchor { name: "n0".into(), kind: AnchorKind::Node, block_index: 0 }];
    let mut tail = PathTail::SingleAnchor(node_anchor(first, 0, wildcard));

    for (i, pair) in blocks[1..].chunks_exact(2).enumerate() {
        let rel_index = 2 * i + 1;
        let (rel, next) = (&pair[0], &pair[1]);
        let rel_name = format!("r{rel_index}");
        let node = node_anchor(next, rel_index + 1, wildcard);

        tail = tail.extend(
            Direction::parse(rel.direction.as_deref()),
            rel.typed_label(wildcard),
            rel_name.clone(),
            node,
        );
        anchors.push(Anchor { name: rel_name, kind: AnchorKind::Relationship, block_index: rel_index });
        anchors.push(Anchor {
            name: format!("n{}", rel_index + 1),
            kind: AnchorKind::Node,
            block_index: rel_index + 1,
        });
    }

    Ok(AssembledPattern { pattern: tail.into_pattern(Some(PATH_VARIABLE)), anchors })
}

fn node_anchor(block: &QueryBlock, index: usize, wildcard: &str) -> NodePattern {
    let node = NodePattern::named(format!("n{index}"));
    match block.typed_label(wildcard) {
        Some(label) => node.with_label(label),
        None => node,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_single_node() {
        let out = assemble(&[QueryBlock::node("Person")], "ANY").unwrap();
        assert_eq!(out.pattern.to_string(), "p = (n0:Person)");
        assert_eq!(out.anchors.len(), 1);
    }

    #[test]
    fn test_wildcard_and_directed_hop() {
        let blocks = [
            QueryBlock::node("ANY"),
            QueryBlock::relationship("KNOWS", "OUT"),
            QueryBlock::node("Person"),
        ];
        let out = assemble(&blocks, "ANY").unwrap();
        assert_eq!(out.pattern.to_string(), "p = (n0)-[r1:KNOWS]->(n2:Person)");
        let names: Vec<&str> = out.anchors.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["n0", "r1", "n2"]);
    }

    #[test]
    fn test_multi_hop_mixed_directions() {
        let blocks = [
            QueryBlock::node("Person"),
            QueryBlock::relationship("WORKS_AT", "OUT"),
            QueryBlock::node("Company"),
            QueryBlock::relationship("ANY", "IN"),
            QueryBlock::node("ANY"),
            QueryBlock::relationship("LOCATED", "BOTH"),
            QueryBlock::node("City"),
        ];
        let out = assemble(&blocks, "ANY").unwrap();
        assert_eq!(
            out.pattern.to_string(),
            "p = (n0:Person)-[r1:WORKS_AT]->(n2:Company)<-[r3]-(n4)-[r5:LOCATED]-(n6:City)",
        );
    }

    #[test]
    fn test_trailing_relationship_is_dropped() {
        let with_tail = [QueryBlock::node("Person"), QueryBlock::relationship("KNOWS", "OUT")];
        let out = assemble(&with_tail, "ANY").unwrap();
        let plain = assemble(&[QueryBlock::node("Person")], "ANY").unwrap();
        assert_eq!(out.pattern.to_string(), plain.pattern.to_string());
        assert_eq!(out.anchors, plain.anchors);
    }

    #[test]
    fn test_malformed_chains_fail() {
        assert!(matches!(assemble(&[], "ANY"), Err(Error::InvalidInput(_))));

        let starts_with_rel = [
            QueryBlock::relationship("KNOWS", "OUT"),
            QueryBlock::node("Person"),
            QueryBlock::node("Person"),
        ];
        assert!(assemble(&starts_with_rel, "ANY").is_err());

        let two_nodes = [QueryBlock::node("A"), QueryBlock::node("B"), QueryBlock::node("C")];
        assert!(assemble(&two_nodes, "ANY").is_err());
    }

    #[test]
    fn test_tail_extension_changes_shape() {
        let tail = PathTail::SingleAnchor(NodePattern::named("n0"));
        assert_eq!(tail.hop_count(), 0);
        let tail = tail.extend(Direction::Outgoing, Some("A"), "r1".into(), NodePattern::named("n2"));
        assert!(matches!(tail, PathTail::Chain { .. }));
        let tail = tail.extend(Direction::Both, None, "r3".into(), NodePattern::named("n4"));
        assert_eq!(tail.hop_count(), 2);
    }

    fn chain(k: usize) -> Vec<QueryBlock> {
        let mut blocks = vec![QueryBlock::node("N")];
        for _ in 0..k {
            blocks.push(QueryBlock::relationship("R", "OUT"));
            blocks.push(QueryBlock::node("N"));
        }
        blocks
    }

    proptest! {
        #[test]
        fn prop_chain_anchor_counts(k in 0usize..12) {
            let out = assemble(&chain(k), "ANY").unwrap();
            let rels = out.anchors.iter().filter(|a| a.kind == AnchorKind::Relationship).count();
            let nodes = out.anchors.iter().filter(|a| a.kind == AnchorKind::Node).count();
            prop_assert_eq!(rels, k);
            prop_assert_eq!(nodes, k + 1);

            // Connected: strictly alternating node/rel elements, no second pattern.
            prop_assert_eq!(out.pattern.elements.len(), 2 * k + 1);
            for (i, el) in out.pattern.elements.iter().enumerate() {
                let is_node = matches!(el, PatternElement::Node(_));
                prop_assert_eq!(is_node, i % 2 == 0);
            }
        }

        #[test]
        fn prop_dangling_relationship_ignored(k in 0usize..8) {
            let mut blocks = chain(k);
            let expected = assemble(&blocks, "ANY").unwrap().pattern.to_string();
            blocks.push(QueryBlock::relationship("DANGLING", "IN"));
            prop_assert_eq!(assemble(&blocks, "ANY").unwrap().pattern.to_string(), expected);
        }
    }
}
