//! Schema introspection: fixed queries over the store's catalog procedures,
//! mapped into display shapes.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::execution::FromValue;
use crate::model::{PropertyMap, Value};
use crate::result::{StyleCache, StyleConfig};
use crate::storage::{ElementKind, GraphStore, StyleStore};
use crate::{Error, Result};

pub const SCHEMA_INFO_QUERY: &str = "CALL db.schema.nodeTypeProperties()\n\
     YIELD nodeType, propertyName, propertyTypes\n\
     WITH replace(nodeType, ':', '') AS label, propertyName, head(propertyTypes) AS type\n\
     RETURN label, collect({name: propertyName, type: type}) AS propsList";

pub const LABEL_COUNTS_QUERY: &str = "MATCH (n)\n\
     UNWIND labels(n) AS label\n\
     RETURN label, count(n) AS count\n\
     ORDER BY count DESC";

pub const SEARCH_BAR_QUERY: &str = "CALL apoc.meta.data()\n\
     YIELD label, property, type, elementType\n\
     WHERE elementType = 'node'\n\
     WITH label, collect({key: property, type: type}) AS props\n\
     WITH collect({label: label, properties: props}) AS nodeSchema\n\
     CALL db.schema.visualization() YIELD relationships\n\
     UNWIND relationships AS rel\n\
     WITH nodeSchema, type(rel) AS relType, labels(startNode(rel))[0] AS header, labels(endNode(rel))[0] AS tail\n\
     WITH nodeSchema, relType, collect({header: header, tail: tail}) AS connections\n\
     WITH nodeSchema, collect({relationship: relType, list: connections}) AS relSchema\n\
     RETURN {nodes: nodeSchema, relationships: relSchema} AS schema";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: u64,
}

/// A label and its property types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSchema {
    pub label: String,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySchema {
    pub key: String,
    #[serde(rename = "type")]
    pub value_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSchema {
    pub label: String,
    pub properties: Vec<PropertySchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleConfig>,
}

/// One observed (start label, end label) pair of a relationship type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSchema {
    pub header: String,
    pub tail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipSchema {
    pub relationship: String,
    pub list: Vec<ConnectionSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleConfig>,
}

/// Everything a search bar needs to offer labels, properties and types.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchBarSchema {
    pub nodes: Vec<NodeSchema>,
    pub relationships: Vec<RelationshipSchema>,
}

fn field<'a>(map: &'a HashMap<String, Value>, key: &str) -> &'a Value {
    map.get(key).unwrap_or(&Value::Null)
}

fn as_map(value: &Value) -> Result<&HashMap<String, Value>> {
    match value {
        Value::Map(map) => Ok(map),
        other => Err(Error::TypeError { expected: "Map".into(), got: other.type_name().into() }),
    }
}

fn maps(value: &Value) -> Result<Vec<&HashMap<String, Value>>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::List(items) => items.iter().map(as_map).collect(),
        other => Err(Error::TypeError { expected: "List".into(), got: other.type_name().into() }),
    }
}

/// Text of a nullable string field; null reads as empty.
fn text(value: &Value) -> Result<String> {
    Ok(Option::<String>::from_value(value)?.unwrap_or_default())
}

/// Node count per label, in the order the store returns them (count descending).
pub async fn label_counts<G: GraphStore + ?Sized>(graph: &G) -> Result<Vec<LabelCount>> {
    let result = graph.run_read(LABEL_COUNTS_QUERY, PropertyMap::new()).await?;
    result
        .rows
        .iter()
        .map(|row| Ok(LabelCount { label: row.get("label")?, count: row.get("count")? }))
        .collect()
}

/// Property types per label.
pub async fn schema_info<G: GraphStore + ?Sized>(graph: &G) -> Result<Vec<LabelSchema>> {
    let result = graph.run_read(SCHEMA_INFO_QUERY, PropertyMap::new()).await?;
    let mut schemas = Vec::with_capacity(result.rows.len());
    for row in &result.rows {
        let label: String = row.get("label")?;
        let mut properties = BTreeMap::new();
        for prop in maps(row.values.get("propsList").unwrap_or(&Value::Null))? {
            properties.insert(text(field(prop, "name"))?, text(field(prop, "type"))?);
        }
        schemas.push(LabelSchema { label, properties });
    }
    Ok(schemas)
}

/// Node and relationship schema, each entry styled through one request-scoped cache.
///
/// An empty result yields an empty schema.
pub async fn search_bar<G, S>(graph: &G, styles: &S) -> Result<SearchBarSchema>
where
    G: GraphStore + ?Sized,
    S: StyleStore + ?Sized,
{
    let result = graph.run_read(SEARCH_BAR_QUERY, PropertyMap::new()).await?;
    let Some(row) = result.rows.first() else {
        return Ok(SearchBarSchema::default());
    };
    let schema = as_map(row.values.get("schema").unwrap_or(&Value::Null))?;
    let mut cache = StyleCache::new(styles);

    let mut nodes = Vec::new();
    for node in maps(field(schema, "nodes"))? {
        let label = text(field(node, "label"))?;
        let properties = maps(field(node, "properties"))?
            .into_iter()
            .map(|p| Ok(PropertySchema { key: text(field(p, "key"))?, value_type: text(field(p, "type"))? }))
            .collect::<Result<Vec<_>>>()?;
        let style = cache.get(&label, ElementKind::Node).await?;
        nodes.push(NodeSchema { label, properties, style });
    }

    let mut relationships = Vec::new();
    for rel in maps(field(schema, "relationships"))? {
        let relationship = text(field(rel, "relationship"))?;
        let list = maps(field(rel, "list"))?
            .into_iter()
            .map(|c| Ok(ConnectionSchema { header: text(field(c, "header"))?, tail: text(field(c, "tail"))? }))
            .collect::<Result<Vec<_>>>()?;
        let style = cache.get(&relationship, ElementKind::Relationship).await?;
        relationships.push(RelationshipSchema { relationship, list, style });
    }

    Ok(SearchBarSchema { nodes, relationships })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::QueryResult;
    use crate::storage::{MemoryStyleStore, ReplayGraphStore};
    use serde_json::json;

    fn map(json: serde_json::Value) -> Value {
        Value::from(&json)
    }

    #[tokio::test]
    async fn test_label_counts() {
        let store = ReplayGraphStore::new().respond(
            "UNWIND labels(n)",
            QueryResult::from_rows(
                ["label", "count"],
                [vec![Value::from("Person"), Value::Int(12)], vec![Value::from("Car"), Value::Int(3)]],
            ),
        );
        let counts = label_counts(&store).await.unwrap();
        assert_eq!(counts, [
            LabelCount { label: "Person".into(), count: 12 },
            LabelCount { label: "Car".into(), count: 3 },
        ]);
    }

    #[tokio::test]
    async fn test_schema_info() {
        let store = ReplayGraphStore::new().respond(
            "nodeTypeProperties",
            QueryResult::from_rows(
                ["label", "propsList"],
                [vec![
                    Value::from("Person"),
                    map(json!([{"name": "name", "type": "String"}, {"name": "age", "type": "Long"}])),
                ]],
            ),
        );
        let schema = schema_info(&store).await.unwrap();
        assert_eq!(schema[0].label, "Person");
        assert_eq!(schema[0].properties["age"], "Long");
        assert_eq!(schema[0].properties.len(), 2);
    }

    #[tokio::test]
    async fn test_search_bar_styles_each_entry_once() {
        let store = ReplayGraphStore::new().respond(
            "apoc.meta.data",
            QueryResult::from_rows(
                ["schema"],
                [vec![map(json!({
                    "nodes": [
                        {"label": "Person", "properties": [{"key": "name", "type": "STRING"}]},
                        {"label": "Car", "properties": []}
                    ],
                    "relationships": [
                        {"relationship": "OWNS", "list": [{"header": "Person", "tail": "Car"}]}
                    ]
                }))]],
            ),
        );
        let styles = MemoryStyleStore::new();
        styles.save("Person", ElementKind::Node, StyleConfig::from(json!({"color": "red"})));

        let schema = search_bar(&store, &styles).await.unwrap();
        assert_eq!(schema.nodes.len(), 2);
        assert_eq!(schema.nodes[0].properties[0], PropertySchema { key: "name".into(), value_type: "STRING".into() });
        assert!(schema.nodes[0].style.is_some());
        assert!(schema.nodes[1].style.is_none());
        assert_eq!(schema.relationships[0].list[0].tail, "Car");
        assert_eq!(styles.lookup_count(), 3);
    }

    #[tokio::test]
    async fn test_search_bar_empty_result() {
        let schema = search_bar(&ReplayGraphStore::new(), &MemoryStyleStore::new()).await.unwrap();
        assert_eq!(schema, SearchBarSchema::default());
    }
}
