//! Request shapes: the block chain a client sends to describe a traversal.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// What a block constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockKind {
    Node,
    Relationship,
    SavedQuery,
}

/// One unit of the traversal chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryBlock {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    /// Label (node) or type (relationship). The wildcard label or `None` means untyped.
    #[serde(default)]
    pub label: Option<String>,
    /// `OUT`, `IN`, anything else is undirected. Relationship blocks only.
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default, deserialize_with = "nullable_filters")]
    pub properties: PropertyFilters,
    #[serde(default)]
    pub saved_query_content: Option<SavedQueryContent>,
}

impl QueryBlock {
    pub fn node(label: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Node,
            label: Some(label.into()),
            direction: None,
            properties: PropertyFilters::default(),
            saved_query_content: None,
        }
    }

    pub fn relationship(label: impl Into<String>, direction: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Relationship,
            label: Some(label.into()),
            direction: Some(direction.into()),
            properties: PropertyFilters::default(),
            saved_query_content: None,
        }
    }

    pub fn saved_query(cypher: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::SavedQuery,
            label: None,
            direction: None,
            properties: PropertyFilters::default(),
            saved_query_content: Some(SavedQueryContent {
                cypher_query: Some(cypher.into()),
                title: None,
            }),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, filter: impl Into<PropertyFilter>) -> Self {
        self.properties.insert(key.into(), filter.into());
        self
    }

    /// Label to type the pattern element with, or `None` for untyped.
    pub fn typed_label(&self, wildcard: &str) -> Option<&str> {
        match self.label.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(l) if l == wildcard => None,
            Some(l) => Some(l),
        }
    }
}

/// Stored query carried by a `SAVED_QUERY` block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedQueryContent {
    #[serde(default)]
    pub cypher_query: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// A whole search request: the block chain plus result shaping flags.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub cyphers: Vec<QueryBlock>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub case_insensitive_search: bool,
}

// ============================================================================
// Property filters
// ============================================================================

/// Filter value for one property: a bare literal, or `{operator, value}`.
///
/// Any JSON object carrying an `operator` or `value` key is structured;
/// its other keys are ignored. Everything else is a literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyFilter {
    Structured(StructuredFilter),
    Literal(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StructuredFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl PropertyFilter {
    pub fn op(operator: &str, value: impl Into<serde_json::Value>) -> Self {
        PropertyFilter::Structured(StructuredFilter {
            operator: Some(operator.to_owned()),
            value: Some(value.into()),
        })
    }

    /// Operator without a value (`IS_NULL`, `IS_NOT_NULL`).
    pub fn unary(operator: &str) -> Self {
        PropertyFilter::Structured(StructuredFilter { operator: Some(operator.to_owned()), value: None })
    }
}

impl From<serde_json::Value> for PropertyFilter {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Object(mut map) if map.contains_key("operator") || map.contains_key("value") => {
                let operator = match map.remove("operator") {
                    Some(serde_json::Value::String(op)) => Some(op),
                    Some(serde_json::Value::Null) | None => None,
                    Some(other) => Some(other.to_string()),
                };
                PropertyFilter::Structured(StructuredFilter { operator, value: map.remove("value") })
            }
            other => PropertyFilter::Literal(other),
        }
    }
}

impl<'de> Deserialize<'de> for PropertyFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(PropertyFilter::from)
    }
}

impl From<&str> for PropertyFilter {
    fn from(v: &str) -> Self {
        PropertyFilter::Literal(v.into())
    }
}

impl From<i64> for PropertyFilter {
    fn from(v: i64) -> Self {
        PropertyFilter::Literal(v.into())
    }
}

/// Property filters in request order. Serialized as a JSON object.
pub type PropertyFilters = IndexMap<String, PropertyFilter>;

fn nullable_filters<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PropertyFilters, D::Error> {
    Option::<PropertyFilters>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_block_keeps_property_order() {
        let block: QueryBlock = serde_json::from_value(json!({
            "type": "NODE",
            "label": "Person",
            "properties": {
                "zeta": "z",
                "age": {"operator": "GREATER_THAN", "value": 30},
                "alpha": {"operator": "IS_NULL"}
            }
        }))
        .unwrap();

        assert_eq!(block.kind, BlockKind::Node);
        let keys: Vec<&str> = block.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "age", "alpha"]);
        assert_eq!(block.properties["zeta"], PropertyFilter::Literal(json!("z")));
        assert_eq!(block.properties["age"], PropertyFilter::op("GREATER_THAN", 30));
        assert_eq!(block.properties["alpha"], PropertyFilter::unary("IS_NULL"));
    }

    #[test]
    fn test_object_literal_without_filter_keys_stays_literal() {
        let filter: PropertyFilter = serde_json::from_value(json!({"city": "Oslo"})).unwrap();
        assert_eq!(filter, PropertyFilter::Literal(json!({"city": "Oslo"})));
    }

    #[test]
    fn test_filter_object_with_extra_keys_is_structured() {
        let filter: PropertyFilter =
            serde_json::from_value(json!({"operator": "GREATER_THAN", "value": 30, "dataType": "number"}))
                .unwrap();
        assert_eq!(filter, PropertyFilter::op("GREATER_THAN", 30));

        let value_only: PropertyFilter = serde_json::from_value(json!({"value": "Oslo", "label": "City"})).unwrap();
        assert_eq!(
            value_only,
            PropertyFilter::Structured(StructuredFilter { operator: None, value: Some(json!("Oslo")) })
        );
    }

    #[test]
    fn test_null_properties_is_empty() {
        let block: QueryBlock =
            serde_json::from_value(json!({"type": "RELATIONSHIP", "label": "ANY", "properties": null}))
                .unwrap();
        assert!(block.properties.is_empty());
        assert_eq!(block.typed_label("ANY"), None);
    }

    #[test]
    fn test_search_request_shape() {
        let req: SearchRequest = serde_json::from_value(json!({
            "cyphers": [
                {"type": "SAVED_QUERY", "savedQueryContent": {"cypherQuery": "MATCH (n) RETURN n"}}
            ],
            "limit": 25,
            "caseInsensitiveSearch": true
        }))
        .unwrap();
        assert_eq!(req.limit, Some(25));
        assert!(req.case_insensitive_search);
        assert_eq!(
            req.cyphers[0].saved_query_content.as_ref().and_then(|c| c.cypher_query.as_deref()),
            Some("MATCH (n) RETURN n"),
        );
    }
}
