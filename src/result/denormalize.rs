//! Result denormalizer: heterogeneous rows → deduplicated, styled elements.
//!
//! Each projected value is walked with an explicit stack:
//! paths yield their nodes then their relationships in path order, bare
//! nodes and relationships are visited directly, lists are descended into,
//! and every other value is ignored. The first occurrence of an element
//! identity wins; later occurrences are not merged.

use hashbrown::{HashMap, HashSet};

use crate::config::ExplorerConfig;
use crate::execution::QueryResult;
use crate::model::property_map::to_json_object;
use crate::model::{ElementId, Node, Relationship, Value};
use crate::storage::{ElementKind, StyleStore};
use crate::Result;

use super::style::{self, StyleCache, StyleConfig};
use super::{GraphNode, GraphRelationship, GraphView};

/// Label and style remembered for every node visited, for annotating
/// relationship endpoints.
#[derive(Debug, Clone)]
struct Endpoint {
    label: String,
    style: Option<StyleConfig>,
}

/// Request-scoped mutable state: the style cache and the node side-table.
pub struct RequestContext<'s, S: StyleStore + ?Sized> {
    pub styles: StyleCache<'s, S>,
    endpoints: HashMap<ElementId, Endpoint>,
}

impl<'s, S: StyleStore + ?Sized> RequestContext<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { styles: StyleCache::new(store), endpoints: HashMap::new() }
    }
}

pub struct Denormalizer<'c, 's, S: StyleStore + ?Sized> {
    ctx: RequestContext<'s, S>,
    config: &'c ExplorerConfig,
    nodes: Vec<GraphNode>,
    relationships: Vec<GraphRelationship>,
    seen_nodes: HashSet<ElementId>,
    seen_relationships: HashSet<ElementId>,
}

impl<'c, 's, S: StyleStore + ?Sized> Denormalizer<'c, 's, S> {
    pub fn new(store: &'s S, config: &'c ExplorerConfig) -> Self {
        Self::with_context(RequestContext::new(store), config)
    }

    pub fn with_context(ctx: RequestContext<'s, S>, config: &'c ExplorerConfig) -> Self {
        Self {
            ctx,
            config,
            nodes: Vec::new(),
            relationships: Vec::new(),
            seen_nodes: HashSet::new(),
            seen_relationships: HashSet::new(),
        }
    }

    /// Walk every projected value of every row, in column order.
    pub async fn absorb_result(&mut self, result: &QueryResult) -> Result<()> {
        for row in &result.rows {
            for value in result.ordered_values(row) {
                self.absorb(value).await?;
            }
        }
        Ok(())
    }

    /// Walk one projected value.
    pub async fn absorb(&mut self, value: &Value) -> Result<()> {
        let mut stack = vec![value];
        while let Some(item) = stack.pop() {
            match item {
                Value::Path(path) => {
                    for node in &path.nodes {
                        self.visit_node(node).await?;
                    }
                    for rel in &path.relationships {
                        self.visit_relationship(rel).await?;
                    }
                }
                Value::Node(node) => self.visit_node(node).await?,
                Value::Relationship(rel) => self.visit_relationship(rel).await?,
                Value::List(items) => stack.extend(items.iter().rev()),
                _ => {}
            }
        }
        Ok(())
    }

    async fn visit_node(&mut self, node: &Node) -> Result<()> {
        let label = node.primary_label().unwrap_or(self.config.unknown_label.as_str()).to_owned();
        let style = self.ctx.styles.get(&label, ElementKind::Node).await?;

        self.ctx.endpoints.insert(
            node.element_id.clone(),
            Endpoint { label: label.clone(), style: style.clone() },
        );

        if self.seen_nodes.insert(node.element_id.clone()) {
            let display_label = style::caption(
                style.as_ref(),
                node,
                &label,
                &self.config.caption_label_token,
                &self.config.caption_separator,
            );
            self.nodes.push(GraphNode {
                id: node.element_id.clone(),
                label,
                labels: node.labels.to_vec(),
                properties: to_json_object(&node.properties),
                style,
                display_label,
                details: None,
                total_connect_count: None,
            });
        }
        Ok(())
    }

    async fn visit_relationship(&mut self, rel: &Relationship) -> Result<()> {
        if !self.seen_relationships.insert(rel.element_id.clone()) {
            return Ok(());
        }
        let style = self.ctx.styles.get(&rel.rel_type, ElementKind::Relationship).await?;
        self.relationships.push(GraphRelationship {
            id: rel.element_id.clone(),
            label: rel.rel_type.clone(),
            source: rel.start_node.clone(),
            target: rel.end_node.clone(),
            properties: to_json_object(&rel.properties),
            style,
            source_label: None,
            target_label: None,
            source_style: None,
            target_style: None,
        });
        Ok(())
    }

    /// Nodes materialized so far.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Annotate relationship endpoints from the side-table and hand back the view.
    ///
    /// Endpoints never visited in this response stay unannotated.
    pub fn finish(self) -> GraphView {
        let Self { ctx, nodes, mut relationships, .. } = self;
        for rel in &mut relationships {
            if let Some(source) = ctx.endpoints.get(&rel.source) {
                rel.source_label = Some(source.label.clone());
                rel.source_style = source.style.clone();
            }
            if let Some(target) = ctx.endpoints.get(&rel.target) {
                rel.target_label = Some(target.label.clone());
                rel.target_style = target.style.clone();
            }
        }
        GraphView { center_node: None, nodes, relationships }
    }
}

/// One-shot: denormalize a whole result with a fresh request context.
pub async fn denormalize<S: StyleStore + ?Sized>(
    result: &QueryResult,
    styles: &S,
    config: &ExplorerConfig,
) -> Result<GraphView> {
    let mut denormalizer = Denormalizer::new(styles, config);
    denormalizer.absorb_result(result).await?;
    Ok(denormalizer.finish())
}
