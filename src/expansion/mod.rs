//! # Neighbor Expansion
//!
//! One-hop neighborhoods of a single anchor node:
//!
//! | Mode | Filter | Connectivity |
//! |------|--------|--------------|
//! | [`neighbors`] | none | no |
//! | [`specific_neighbors`] | one type, one direction, one target label (AND) | no |
//! | [`batch_neighbors`] | any of a criteria list (OR), optional cap | yes |
//! | [`expansion_stats`] | excludes already-shown relationships | n/a |

pub mod stats;

use serde::{Deserialize, Serialize};

use crate::config::ExplorerConfig;
use crate::cypher::ast::{
    BinaryOp, Expr, MatchClause, NodePattern, Pattern, PatternDirection, PatternElement, Query,
    RelPattern, ReturnClause,
};
use crate::cypher::{Parameters, Statement};
use crate::execution::{self, QueryResult};
use crate::model::{Direction, ElementId, PropertyMap, Value};
use crate::result::{connectivity, denormalize::Denormalizer, GraphView};
use crate::storage::{GraphStore, StyleStore};
use crate::Result;

pub use stats::{ExpansionStat, ExpansionStats, StatRow};

const ANCHOR: &str = "n";
const REL: &str = "r";
const NEIGHBOR: &str = "connectedNode";

pub const BATCH_QUERY: &str = "MATCH (n) WHERE elementId(n) = $elementId\n\
     MATCH (n)-[r]-(connectedNode)\n\
     WHERE any(c IN $criteriaList WHERE\n\
       (c.relation IS NULL OR type(r) = c.relation) AND\n\
       (c.targetLabel IS NULL OR c.targetLabel IN labels(connectedNode)) AND\n\
       (c.direction = 'ALL' OR c.direction IS NULL OR\n\
        (c.direction = 'OUT' AND startNode(r) = n) OR\n\
        (c.direction = 'IN' AND endNode(r) = n)))\n\
     RETURN n, r, connectedNode";

/// One alternative of a batch expansion. Absent fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionCriterion {
    #[serde(default)]
    pub relation: Option<String>,
    #[serde(default)]
    pub target_label: Option<String>,
    /// `OUT`, `IN` or `ALL`; absent or empty means `ALL`.
    #[serde(default)]
    pub direction: Option<String>,
}

impl ExpansionCriterion {
    fn to_value(&self) -> Value {
        let direction = match self.direction.as_deref().map(str::trim) {
            None | Some("") => Direction::Both,
            Some(d) => Direction::parse(Some(d)),
        };
        Value::Map(
            [
                ("relation", Value::from(non_empty(self.relation.as_deref()))),
                ("targetLabel", Value::from(non_empty(self.target_label.as_deref()))),
                ("direction", Value::from(direction.keyword())),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect(),
        )
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

// ============================================================================
// Statements
// ============================================================================

/// `MATCH (n) WHERE elementId(n) = $elementId OPTIONAL MATCH <hop> RETURN n, r, connectedNode`
fn anchored(element_id: &ElementId, hop: RelPattern, target: NodePattern) -> Statement {
    let mut params = Parameters::new();
    let id = params.bind_named("elementId", Value::from(element_id.as_str()));

    let anchor = MatchClause {
        optional: false,
        pattern: Pattern {
            path_variable: None,
            elements: vec![PatternElement::Node(NodePattern::named(ANCHOR))],
        },
        where_clause: Some(Expr::binary(
            Expr::call("elementId", vec![Expr::Variable(ANCHOR.into())]),
            BinaryOp::Eq,
            id,
        )),
    };
    let expansion = MatchClause {
        optional: true,
        pattern: Pattern {
            path_variable: None,
            elements: vec![
                PatternElement::Node(NodePattern::named(ANCHOR)),
                PatternElement::Relationship(hop),
                PatternElement::Node(target),
            ],
        },
        where_clause: None,
    };

    let query = Query {
        matches: vec![anchor, expansion],
        return_clause: ReturnClause::variables([ANCHOR, REL, NEIGHBOR]),
        limit: None,
    };
    Statement::new(query, params)
}

pub fn neighbors_statement(element_id: &ElementId) -> Statement {
    let hop = RelPattern { alias: Some(REL.into()), rel_types: Vec::new(), direction: PatternDirection::Both };
    anchored(element_id, hop, NodePattern::named(NEIGHBOR))
}

/// Relation type and target label are escaped into the pattern; empty means unfiltered.
pub fn specific_neighbors_statement(
    element_id: &ElementId,
    relation: Option<&str>,
    direction: Option<&str>,
    target_label: Option<&str>,
) -> Statement {
    let direction = match Direction::parse(direction) {
        Direction::Outgoing => PatternDirection::Right,
        Direction::Incoming => PatternDirection::Left,
        Direction::Both => PatternDirection::Both,
    };
    let hop = RelPattern {
        alias: Some(REL.into()),
        rel_types: non_empty(relation).map(str::to_owned).into_iter().collect(),
        direction,
    };
    let mut target = NodePattern::named(NEIGHBOR);
    if let Some(label) = non_empty(target_label) {
        target = target.with_label(label);
    }
    anchored(element_id, hop, target)
}

/// Batch query text and parameters. `LIMIT $limit` only for a positive cap.
pub fn batch_query(element_id: &ElementId, criteria: &[ExpansionCriterion], limit: Option<i64>) -> (String, PropertyMap) {
    let mut params = PropertyMap::new();
    params.insert("elementId".into(), Value::from(element_id.as_str()));
    params.insert("criteriaList".into(), Value::List(criteria.iter().map(ExpansionCriterion::to_value).collect()));

    let mut query = BATCH_QUERY.to_owned();
    if let Some(limit) = crate::query::positive_limit(limit) {
        query.push_str(" LIMIT $limit");
        params.insert("limit".into(), Value::Int(limit));
    }
    (query, params)
}

// ============================================================================
// Service
// ============================================================================

/// Denormalize rows and point `center_node` at the first row's anchor.
async fn materialize<S: StyleStore + ?Sized>(
    result: &QueryResult,
    styles: &S,
    config: &ExplorerConfig,
) -> Result<(GraphView, Option<ElementId>)> {
    let center = result.rows.first().and_then(|row| match row.values.get(ANCHOR) {
        Some(Value::Node(node)) => Some(node.element_id.clone()),
        _ => None,
    });
    let mut denormalizer = Denormalizer::new(styles, config);
    denormalizer.absorb_result(result).await?;
    Ok((denormalizer.finish(), center))
}

fn attach_center(view: &mut GraphView, center: Option<ElementId>) {
    view.center_node = center.and_then(|id| view.node(id.as_str()).cloned());
}

/// All directly connected nodes and relationships.
pub async fn neighbors<G, S>(graph: &G, styles: &S, config: &ExplorerConfig, element_id: &ElementId) -> Result<GraphView>
where
    G: GraphStore + ?Sized,
    S: StyleStore + ?Sized,
{
    let statement = neighbors_statement(element_id);
    let result = execution::run_statement(graph, &statement).await?;
    let (mut view, center) = materialize(&result, styles, config).await?;
    attach_center(&mut view, center);
    Ok(view)
}

pub async fn specific_neighbors<G, S>(
    graph: &G,
    styles: &S,
    config: &ExplorerConfig,
    element_id: &ElementId,
    relation: Option<&str>,
    direction: Option<&str>,
    target_label: Option<&str>,
) -> Result<GraphView>
where
    G: GraphStore + ?Sized,
    S: StyleStore + ?Sized,
{
    let statement = specific_neighbors_statement(element_id, relation, direction, target_label);
    let result = execution::run_statement(graph, &statement).await?;
    let (mut view, center) = materialize(&result, styles, config).await?;
    attach_center(&mut view, center);
    Ok(view)
}

/// Edges matching any criterion, then connectivity for every node returned.
pub async fn batch_neighbors<G, S>(
    graph: &G,
    styles: &S,
    config: &ExplorerConfig,
    element_id: &ElementId,
    criteria: &[ExpansionCriterion],
    limit: Option<i64>,
) -> Result<GraphView>
where
    G: GraphStore + ?Sized,
    S: StyleStore + ?Sized,
{
    let (query, params) = batch_query(element_id, criteria, limit);
    tracing::debug!(query = %query, criteria = criteria.len(), "running batch expansion");
    let result = graph.run_read(&query, params).await?;

    let (mut view, center) = materialize(&result, styles, config).await?;
    connectivity::enrich(graph, &mut view.nodes).await?;
    attach_center(&mut view, center);
    Ok(view)
}

/// Three-way breakdown of the anchor's edges not in `exclude`.
pub async fn expansion_stats<G: GraphStore + ?Sized>(
    graph: &G,
    config: &ExplorerConfig,
    element_id: &ElementId,
    exclude: &[ElementId],
) -> Result<ExpansionStats> {
    let mut params = PropertyMap::new();
    params.insert("elementId".into(), Value::from(element_id.as_str()));
    params.insert(
        "excludeIds".into(),
        Value::List(exclude.iter().map(|id| Value::from(id.as_str())).collect()),
    );
    tracing::debug!(element_id = %element_id, excluded = exclude.len(), "fetching expansion stats");
    let result = graph.run_read(stats::STATS_QUERY, params).await?;
    stats::from_result(&result, &config.unknown_label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_neighbors_statement() {
        let statement = neighbors_statement(&ElementId::from("4:x:1"));
        assert_eq!(
            statement.cypher(),
            "MATCH (n)\nWHERE elementId(n) = $elementId\nOPTIONAL MATCH (n)-[r]-(connectedNode)\nRETURN n, r, connectedNode"
        );
        assert_eq!(statement.parameters["elementId"], Value::from("4:x:1"));
    }

    #[test]
    fn test_specific_neighbors_statement() {
        let id = ElementId::from("4:x:1");
        let out = specific_neighbors_statement(&id, Some("WORKS_AT"), Some("out"), Some("Company"));
        assert!(out.cypher().contains("OPTIONAL MATCH (n)-[r:WORKS_AT]->(connectedNode:Company)"));

        let incoming = specific_neighbors_statement(&id, Some("KNOWS"), Some("IN"), None);
        assert!(incoming.cypher().contains("OPTIONAL MATCH (n)<-[r:KNOWS]-(connectedNode)"));

        let any = specific_neighbors_statement(&id, Some(""), Some("sideways"), Some("My Label"));
        assert!(any.cypher().contains("OPTIONAL MATCH (n)-[r]-(connectedNode:`My Label`)"));
    }

    #[test]
    fn test_batch_query_params() {
        let criteria = [
            ExpansionCriterion { relation: Some("WORKS_AT".into()), target_label: None, direction: Some("OUT".into()) },
            ExpansionCriterion { relation: None, target_label: Some("City".into()), direction: Some(String::new()) },
        ];
        let (query, params) = batch_query(&ElementId::from("4:x:1"), &criteria, Some(25));
        assert!(query.ends_with("RETURN n, r, connectedNode LIMIT $limit"));
        assert_eq!(params["limit"], Value::Int(25));

        let list = params["criteriaList"].as_list().unwrap();
        let Value::Map(first) = &list[0] else { panic!("criterion is not a map") };
        assert_eq!(first["relation"], Value::from("WORKS_AT"));
        assert_eq!(first["targetLabel"], Value::Null);
        assert_eq!(first["direction"], Value::from("OUT"));
        let Value::Map(second) = &list[1] else { panic!("criterion is not a map") };
        assert_eq!(second["relation"], Value::Null);
        assert_eq!(second["direction"], Value::from("ALL"));

        let (uncapped, params) = batch_query(&ElementId::from("4:x:1"), &criteria, Some(0));
        assert!(!uncapped.contains("LIMIT"));
        assert!(!params.contains_key("limit"));
    }

    #[test]
    fn test_criterion_deserializes_camel_case() {
        let c: ExpansionCriterion =
            serde_json::from_str(r#"{"relation": null, "targetLabel": "City", "direction": "ALL"}"#).unwrap();
        assert_eq!(c.target_label.as_deref(), Some("City"));
        assert_eq!(c.relation, None);
    }
}
