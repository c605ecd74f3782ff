//! Connectivity enrichment: per node, how many relationships of each type it
//! has as tail (start) or head (end). One aggregate query covers every node
//! of a response.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::model::{PropertyMap, Value};
use crate::storage::GraphStore;
use crate::Result;

use super::GraphNode;

pub const CONNECTIVITY_QUERY: &str = "MATCH (n)-[r]-() WHERE elementId(n) IN $nodeIds \
     RETURN elementId(n) as id, type(r) as relation, \
     CASE WHEN elementId(startNode(r)) = elementId(n) THEN 'TAIL' ELSE 'HEAD' END as position, \
     count(r) as count";

/// Which end of a relationship the node sits at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgePosition {
    /// The node is the relationship's start.
    Tail,
    /// The node is the relationship's end.
    Head,
}

impl EdgePosition {
    fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("TAIL") { EdgePosition::Tail } else { EdgePosition::Head }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectDetail {
    pub relation: String,
    pub position: EdgePosition,
    pub count: u64,
}

/// Attach `details` and `totalConnectCount` to every node.
///
/// Nodes the aggregate does not mention get an empty list and zero. An empty
/// slice makes no store call.
pub async fn enrich<G: GraphStore + ?Sized>(store: &G, nodes: &mut [GraphNode]) -> Result<()> {
    if nodes.is_empty() {
        return Ok(());
    }

    let ids: Vec<Value> = nodes.iter().map(|n| Value::from(n.id.as_str())).collect();
    let mut params = PropertyMap::new();
    params.insert("nodeIds".into(), Value::List(ids));

    tracing::debug!(nodes = nodes.len(), "fetching connectivity details");
    let result = store.run_read(CONNECTIVITY_QUERY, params).await?;

    let mut by_node: HashMap<String, Vec<ConnectDetail>> = HashMap::new();
    for row in &result.rows {
        let id: String = row.get("id")?;
        let relation: Option<String> = row.get_or_null("relation")?;
        let position: Option<String> = row.get_or_null("position")?;
        let count: u64 = row.get_or_null::<Option<u64>>("count")?.unwrap_or(0);
        by_node.entry(id).or_default().push(ConnectDetail {
            relation: relation.unwrap_or_default(),
            position: EdgePosition::parse(position.as_deref().unwrap_or_default()),
            count,
        });
    }

    for node in nodes.iter_mut() {
        let details = by_node.remove(node.id.as_str()).unwrap_or_default();
        node.total_connect_count = Some(details.iter().map(|d| d.count).sum());
        node.details = Some(details);
    }
    Ok(())
}
