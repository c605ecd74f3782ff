//! Expansion stats: incident edges of a node, grouped three ways.
//!
//! - `relationships` by (type, direction)
//! - `categories` by target label
//! - `pairs` by (type, direction, target label)
//!
//! Groups keep first-seen order; ids (`rel-0`, `cat-0`, `pair-0`, ...) are
//! assigned after aggregation.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::execution::{QueryResult, ResultRow};
use crate::Result;

pub const STATS_QUERY: &str = "MATCH (n) WHERE elementId(n) = $elementId\n\
     MATCH (n)-[r]-(m)\n\
     WHERE NOT elementId(r) IN $excludeIds\n\
     WITH type(r) as relType, labels(m) as targetLabels, startNode(r) = n as isOutgoing, count(m) as cnt\n\
     RETURN relType, targetLabels, CASE WHEN isOutgoing THEN 'OUT' ELSE 'IN' END as direction, cnt";

/// One row of the stats query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatRow {
    pub rel_type: String,
    /// First label of the far node, or the unknown-label sentinel.
    pub target_label: String,
    /// `OUT` or `IN`.
    pub direction: String,
    pub count: u64,
}

impl StatRow {
    pub fn from_row(row: &ResultRow, unknown_label: &str) -> Result<Self> {
        let labels: Vec<String> = row.get_or_null::<Option<Vec<String>>>("targetLabels")?.unwrap_or_default();
        Ok(Self {
            rel_type: row.get("relType")?,
            target_label: labels.into_iter().next().unwrap_or_else(|| unknown_label.to_owned()),
            direction: row.get("direction")?,
            count: row.get_or_null::<Option<u64>>("cnt")?.unwrap_or(0),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionStat {
    pub id: String,
    /// Relationship type, or the target label for categories.
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExpansionStats {
    pub relationships: Vec<ExpansionStat>,
    pub categories: Vec<ExpansionStat>,
    pub pairs: Vec<ExpansionStat>,
}

/// Count accumulator that remembers first-seen key order.
struct Groups<K> {
    index: HashMap<K, usize>,
    entries: Vec<ExpansionStat>,
}

impl<K: std::hash::Hash + Eq> Groups<K> {
    fn new() -> Self {
        Self { index: HashMap::new(), entries: Vec::new() }
    }

    fn add(&mut self, key: K, count: u64, make: impl FnOnce() -> ExpansionStat) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].count += count,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(ExpansionStat { count, ..make() });
            }
        }
    }

    fn finish(self, prefix: &str) -> Vec<ExpansionStat> {
        self.entries
            .into_iter()
            .enumerate()
            .map(|(i, stat)| ExpansionStat { id: format!("{prefix}-{i}"), ..stat })
            .collect()
    }
}

/// Group stat rows three ways.
pub fn aggregate<'a>(rows: impl IntoIterator<Item = &'a StatRow>) -> ExpansionStats {
    let mut rels = Groups::new();
    let mut cats = Groups::new();
    let mut pairs = Groups::new();

    for row in rows {
        rels.add((row.rel_type.as_str(), row.direction.as_str()), row.count, || ExpansionStat {
            id: String::new(),
            label: row.rel_type.clone(),
            target_label: None,
            direction: Some(row.direction.clone()),
            count: 0,
        });
        cats.add(row.target_label.as_str(), row.count, || ExpansionStat {
            id: String::new(),
            label: row.target_label.clone(),
            target_label: None,
            direction: None,
            count: 0,
        });
        pairs.add(
            (row.rel_type.as_str(), row.direction.as_str(), row.target_label.as_str()),
            row.count,
            || ExpansionStat {
                id: String::new(),
                label: row.rel_type.clone(),
                target_label: Some(row.target_label.clone()),
                direction: Some(row.direction.clone()),
                count: 0,
            },
        );
    }

    ExpansionStats {
        relationships: rels.finish("rel"),
        categories: cats.finish("cat"),
        pairs: pairs.finish("pair"),
    }
}

/// Decode and aggregate a stats query result.
pub fn from_result(result: &QueryResult, unknown_label: &str) -> Result<ExpansionStats> {
    let rows = result
        .rows
        .iter()
        .map(|row| StatRow::from_row(row, unknown_label))
        .collect::<Result<Vec<_>>>()?;
    Ok(aggregate(&rows))
}

impl ExpansionStats {
    /// Sum counts of matching groups; groups only in `other` are appended.
    /// Ids are reassigned afterwards.
    pub fn merge(self, other: ExpansionStats) -> ExpansionStats {
        fn combine(prefix: &str, a: Vec<ExpansionStat>, b: Vec<ExpansionStat>) -> Vec<ExpansionStat> {
            let mut groups = Groups::new();
            for stat in a.into_iter().chain(b) {
                let key = (stat.label.clone(), stat.target_label.clone(), stat.direction.clone());
                let count = stat.count;
                groups.add(key, count, || stat);
            }
            groups.finish(prefix)
        }

        ExpansionStats {
            relationships: combine("rel", self.relationships, other.relationships),
            categories: combine("cat", self.categories, other.categories),
            pairs: combine("pair", self.pairs, other.pairs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn row(rel: &str, dir: &str, target: &str, count: u64) -> StatRow {
        StatRow { rel_type: rel.into(), target_label: target.into(), direction: dir.into(), count }
    }

    #[test]
    fn test_owns_cars_and_company() {
        let result = QueryResult::from_rows(
            ["relType", "targetLabels", "direction", "cnt"],
            [
                vec![Value::from("OWNS"), Value::from(vec!["Car"]), Value::from("OUT"), Value::Int(3)],
                vec![Value::from("OWNS"), Value::from(vec!["Company", "Org"]), Value::from("IN"), Value::Int(1)],
            ],
        );
        let stats = from_result(&result, "Unknown").unwrap();

        assert_eq!(
            stats.relationships,
            vec![
                ExpansionStat { id: "rel-0".into(), label: "OWNS".into(), target_label: None, direction: Some("OUT".into()), count: 3 },
                ExpansionStat { id: "rel-1".into(), label: "OWNS".into(), target_label: None, direction: Some("IN".into()), count: 1 },
            ]
        );
        assert_eq!(
            stats.categories.iter().map(|c| (c.id.as_str(), c.label.as_str(), c.count)).collect::<Vec<_>>(),
            [("cat-0", "Car", 3), ("cat-1", "Company", 1)]
        );
        assert_eq!(stats.pairs.len(), 2);
        assert_eq!(stats.pairs[1].target_label.as_deref(), Some("Company"));
        assert_eq!(stats.pairs[1].id, "pair-1");
    }

    #[test]
    fn test_unlabeled_targets_and_grouping() {
        let result = QueryResult::from_rows(
            ["relType", "targetLabels", "direction", "cnt"],
            [
                vec![Value::from("LINKS"), Value::List(vec![]), Value::from("OUT"), Value::Int(2)],
                vec![Value::from("LINKS"), Value::from(vec!["Page"]), Value::from("OUT"), Value::Int(5)],
            ],
        );
        let stats = from_result(&result, "Unknown").unwrap();
        assert_eq!(stats.relationships.len(), 1);
        assert_eq!(stats.relationships[0].count, 7);
        assert_eq!(stats.categories[0].label, "Unknown");
        assert_eq!(stats.pairs.len(), 2);
    }

    #[test]
    fn test_serialized_shape() {
        let stats = aggregate(&[row("OWNS", "OUT", "Car", 3)]);
        assert_eq!(
            serde_json::to_value(&stats).unwrap(),
            serde_json::json!({
                "relationships": [{"id": "rel-0", "label": "OWNS", "direction": "OUT", "count": 3}],
                "categories": [{"id": "cat-0", "label": "Car", "count": 3}],
                "pairs": [{"id": "pair-0", "label": "OWNS", "targetLabel": "Car", "direction": "OUT", "count": 3}],
            })
        );
    }

    fn arb_row() -> impl Strategy<Value = StatRow> {
        (
            prop::sample::select(vec!["OWNS", "KNOWS", "WORKS_AT"]),
            prop::sample::select(vec!["OUT", "IN"]),
            prop::sample::select(vec!["Car", "Person", "Unknown"]),
            1u64..50,
        )
            .prop_map(|(r, d, t, c)| row(r, d, t, c))
    }

    proptest! {
        #[test]
        fn prop_aggregation_is_associative(
            left in prop::collection::vec(arb_row(), 0..20),
            right in prop::collection::vec(arb_row(), 0..20),
        ) {
            let whole = aggregate(left.iter().chain(right.iter()));
            let merged = aggregate(&left).merge(aggregate(&right));
            prop_assert_eq!(whole, merged);
        }
    }
}
