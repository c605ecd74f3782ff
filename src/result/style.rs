//! Style configs, the per-request style cache, and caption building.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::model::Node;
use crate::storage::{ElementKind, StyleStore};
use crate::Result;

/// Opaque presentation metadata (color, size, caption rules, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleConfig(pub serde_json::Map<String, serde_json::Value>);

/// One entry of a style's `captions` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionRule {
    pub property: String,
    #[serde(default)]
    pub show_on_node: bool,
}

impl StyleConfig {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Caption rules in declaration order. Malformed entries are skipped.
    pub fn captions(&self) -> Vec<CaptionRule> {
        match self.0.get("captions") {
            Some(serde_json::Value::Array(entries)) => entries
                .iter()
                .filter_map(|e| serde_json::from_value(e.clone()).ok())
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl From<serde_json::Value> for StyleConfig {
    /// Objects become configs; any other JSON yields an empty config.
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Object(map) => StyleConfig(map),
            _ => StyleConfig::default(),
        }
    }
}

/// Build a node's display caption from its style's caption rules.
///
/// Rules with `showOnNode` contribute, in order: the primary label for the
/// label token, otherwise the property's text when present and non-null.
/// `None` when nothing contributed.
pub fn caption(
    style: Option<&StyleConfig>,
    node: &Node,
    primary_label: &str,
    label_token: &str,
    separator: &str,
) -> Option<String> {
    let style = style?;
    let parts: Vec<String> = style
        .captions()
        .into_iter()
        .filter(|rule| rule.show_on_node)
        .filter_map(|rule| {
            if rule.property == label_token {
                Some(primary_label.to_owned())
            } else {
                node.get(&rule.property)
                    .filter(|v| !v.is_null())
                    .map(|v| v.display_text())
            }
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join(separator))
}

/// Request-scoped memo of style lookups.
///
/// Each distinct (label, kind) pair reaches the store at most once, misses
/// included.
pub struct StyleCache<'s, S: StyleStore + ?Sized> {
    store: &'s S,
    entries: HashMap<(String, ElementKind), Option<StyleConfig>>,
}

impl<'s, S: StyleStore + ?Sized> StyleCache<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store, entries: HashMap::new() }
    }

    /// Style for `label`, or `None` if the store has none. Empty labels never hit the store.
    pub async fn get(&mut self, label: &str, kind: ElementKind) -> Result<Option<StyleConfig>> {
        if label.is_empty() {
            return Ok(None);
        }
        let key = (label.to_owned(), kind);
        if let Some(hit) = self.entries.get(&key) {
            tracing::trace!(label, kind = kind.as_str(), "style cache hit");
            return Ok(hit.clone());
        }
        tracing::trace!(label, kind = kind.as_str(), "style cache miss");
        let style = self.store.lookup(label, kind).await?;
        self.entries.insert(key, style.clone());
        Ok(style)
    }

    /// Distinct pairs looked up so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStyleStore;
    use serde_json::json;

    fn person_style() -> StyleConfig {
        StyleConfig::from(json!({
            "color": "#f00",
            "captions": [
                {"property": "nodeLabel", "showOnNode": true},
                {"property": "name", "showOnNode": true},
                {"property": "secret", "showOnNode": false},
                {"property": "missing", "showOnNode": true},
                {"property": "nickname", "showOnNode": true},
                "garbage"
            ]
        }))
    }

    #[test]
    fn test_caption_rules() {
        let node = Node::new("4:x:1")
            .with_labels(["Person"])
            .with_property("name", "Alice")
            .with_property("secret", "s3cr3t")
            .with_property("nickname", crate::model::Value::Null);
        let style = person_style();
        assert_eq!(
            caption(Some(&style), &node, "Person", "nodeLabel", " | ").as_deref(),
            Some("Person | Alice"),
        );
        assert_eq!(caption(None, &node, "Person", "nodeLabel", " "), None);
        assert_eq!(caption(Some(&StyleConfig::default()), &node, "Person", "nodeLabel", " "), None);
    }

    #[test]
    fn test_caption_stringifies_non_text() {
        let node = Node::new("4:x:1").with_property("age", 42);
        let style = StyleConfig::from(json!({"captions": [{"property": "age", "showOnNode": true}]}));
        assert_eq!(caption(Some(&style), &node, "Unknown", "nodeLabel", " ").as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn test_cache_hits_store_once_per_pair() {
        let store = MemoryStyleStore::new();
        store.save("Person", ElementKind::Node, person_style());

        let mut cache = StyleCache::new(&store);
        for _ in 0..3 {
            assert!(cache.get("Person", ElementKind::Node).await.unwrap().is_some());
            assert!(cache.get("Person", ElementKind::Relationship).await.unwrap().is_none());
            assert!(cache.get("Nope", ElementKind::Node).await.unwrap().is_none());
            assert!(cache.get("", ElementKind::Node).await.unwrap().is_none());
        }
        assert_eq!(store.lookup_count(), 3);
        assert_eq!(cache.len(), 3);
    }
}
