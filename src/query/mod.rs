//! # Traversal Query Builder
//!
//! Turns a client's block chain into either a generated, parameterized
//! statement or the text of a saved query.
//!
//! ```text
//! blocks ─┬─ SAVED_QUERY present ──→ Plan::Saved(raw text, limit appended)
//!         └─ NODE/REL chain ──→ condition::compile ─┐
//!                            pattern::assemble ─────┴→ Plan::Traversal(Statement)
//! ```

pub mod block;
pub mod condition;
pub mod pattern;

use crate::cypher::ast::{Expr, MatchClause, Query, ReturnClause};
use crate::cypher::{Parameters, Statement};
use crate::model::Value;
use crate::{Error, Result};

pub use block::{BlockKind, PropertyFilter, PropertyFilters, QueryBlock, SavedQueryContent, SearchRequest};
pub use condition::{Condition, Operand, Operator};
pub use pattern::{Anchor, AnchorKind, AssembledPattern, PathTail};

/// What a block chain turns into.
#[derive(Debug, Clone)]
pub enum Plan {
    /// A stored query, run as-is (with a textual limit suffix when requested).
    Saved { cypher: String },
    /// A generated, parameterized traversal.
    Traversal(Statement),
}

/// Normalize a requested cap: only positive values limit.
pub fn positive_limit(limit: Option<i64>) -> Option<i64> {
    limit.filter(|l| *l > 0)
}

/// Plan a block chain. Fails before any store call on malformed input.
pub fn plan(
    blocks: &[QueryBlock],
    limit: Option<i64>,
    case_insensitive: bool,
    wildcard: &str,
) -> Result<Plan> {
    if blocks.is_empty() {
        return Err(Error::InvalidInput("block list is empty".into()));
    }

    if let Some(saved) = blocks.iter().find(|b| b.kind == BlockKind::SavedQuery) {
        let text = saved
            .saved_query_content
            .as_ref()
            .and_then(|c| c.cypher_query.as_deref())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::InvalidInput("saved query has no query text".into()))?;
        return Ok(Plan::Saved { cypher: with_limit_suffix(text, limit) });
    }

    build_statement(blocks, limit, case_insensitive, wildcard).map(Plan::Traversal)
}

/// Build `MATCH p = <chain> WHERE <conditions> RETURN p [LIMIT $limit]`.
pub fn build_statement(
    blocks: &[QueryBlock],
    limit: Option<i64>,
    case_insensitive: bool,
    wildcard: &str,
) -> Result<Statement> {
    let assembled = pattern::assemble(blocks, wildcard)?;

    let mut conditions = Vec::new();
    for anchor in &assembled.anchors {
        conditions.extend(condition::compile(&anchor.name, &blocks[anchor.block_index].properties)?);
    }

    let mut params = Parameters::new();
    let predicates: Vec<Expr> = conditions
        .iter()
        .map(|c| c.predicate(&mut params, case_insensitive))
        .collect();

    let limit = positive_limit(limit).map(|l| params.bind_named("limit", Value::Int(l)));

    let query = Query {
        matches: vec![MatchClause {
            optional: false,
            pattern: assembled.pattern,
            where_clause: Expr::conjunction(predicates),
        }],
        return_clause: ReturnClause::variables([pattern::PATH_VARIABLE]),
        limit,
    };

    Ok(Statement::new(query, params))
}

/// Append ` LIMIT n` unless the text already mentions LIMIT anywhere.
/// Trailing whitespace and `;` are stripped only when the suffix is added;
/// otherwise the text is returned untouched.
///
/// This is a substring test, not a parse: a `limit` inside a string literal
/// or identifier also suppresses the suffix.
pub fn with_limit_suffix(cypher: &str, limit: Option<i64>) -> String {
    match positive_limit(limit) {
        Some(n) if !cypher.to_ascii_uppercase().contains("LIMIT") => {
            let body = cypher.trim().trim_end_matches(';').trim_end();
            format!("{body} LIMIT {n}")
        }
        _ => cypher.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_single_node_with_filter_and_limit() {
        let blocks = [QueryBlock::node("Person").with_property("name", "Alice")];
        let stmt = build_statement(&blocks, Some(10), false, "ANY").unwrap();
        assert_eq!(
            stmt.cypher(),
            "MATCH p = (n0:Person)\nWHERE n0.name = $p0\nRETURN p\nLIMIT $limit",
        );
        assert_eq!(stmt.parameters["p0"], Value::from("Alice"));
        assert_eq!(stmt.parameters["limit"], Value::Int(10));
    }

    #[test]
    fn test_unconditional_chain_without_limit() {
        let blocks = [
            QueryBlock::node("ANY"),
            QueryBlock::relationship("KNOWS", "OUT"),
            QueryBlock::node("Person"),
        ];
        let stmt = build_statement(&blocks, Some(0), false, "ANY").unwrap();
        assert_eq!(stmt.cypher(), "MATCH p = (n0)-[r1:KNOWS]->(n2:Person)\nRETURN p");
        assert!(stmt.parameters.is_empty());
    }

    #[test]
    fn test_conditions_follow_block_order() {
        let blocks = [
            QueryBlock::node("Person").with_property("age", PropertyFilter::op("BETWEEN", json!([20, 30]))),
            QueryBlock::relationship("KNOWS", "OUT").with_property("since", PropertyFilter::op("LESS_THAN", 2020)),
            QueryBlock::node("Person").with_property("name", PropertyFilter::op("STARTS_WITH", "B")),
        ];
        let stmt = build_statement(&blocks, None, true, "ANY").unwrap();
        assert_eq!(
            stmt.cypher(),
            "MATCH p = (n0:Person)-[r1:KNOWS]->(n2:Person)\n\
             WHERE n0.age >= $p0 AND n0.age <= $p1 AND r1.since < $p2 AND toLower(n2.name) STARTS WITH $p3\n\
             RETURN p",
        );
        assert_eq!(stmt.parameters["p3"], Value::from("b"));
    }

    #[test]
    fn test_saved_query_wins_over_chain() {
        let blocks = [
            QueryBlock::node("Person"),
            QueryBlock::saved_query("MATCH (n:Movie) RETURN n;"),
        ];
        let Plan::Saved { cypher } = plan(&blocks, Some(5), false, "ANY").unwrap() else {
            panic!("expected saved plan");
        };
        assert_eq!(cypher, "MATCH (n:Movie) RETURN n LIMIT 5");
    }

    #[test]
    fn test_saved_query_without_text_fails() {
        let mut block = QueryBlock::saved_query("   ");
        assert!(matches!(plan(&[block.clone()], None, false, "ANY"), Err(Error::InvalidInput(_))));
        block.saved_query_content = None;
        assert!(plan(&[block], None, false, "ANY").is_err());
    }

    #[test]
    fn test_limit_suffix_heuristic() {
        assert_eq!(with_limit_suffix("MATCH (n) RETURN n", Some(3)), "MATCH (n) RETURN n LIMIT 3");
        assert_eq!(with_limit_suffix("MATCH (n) RETURN n limit 9", Some(3)), "MATCH (n) RETURN n limit 9");
        assert_eq!(with_limit_suffix("MATCH (n) RETURN n", None), "MATCH (n) RETURN n");
        assert_eq!(with_limit_suffix("MATCH (n) RETURN n", Some(-1)), "MATCH (n) RETURN n");
        // Known imprecision: a literal mentioning "limit" suppresses the suffix.
        assert_eq!(
            with_limit_suffix("MATCH (n {note: 'no limit'}) RETURN n", Some(3)),
            "MATCH (n {note: 'no limit'}) RETURN n",
        );
    }

    #[test]
    fn test_saved_query_text_untouched_without_suffix() {
        let text = "  MATCH (n:Movie) RETURN n;\n";
        assert_eq!(with_limit_suffix(text, None), text);
        assert_eq!(with_limit_suffix("MATCH (n) RETURN n LIMIT 2;", Some(5)), "MATCH (n) RETURN n LIMIT 2;");

        let Plan::Saved { cypher } = plan(&[QueryBlock::saved_query(text)], Some(0), false, "ANY").unwrap() else {
            panic!("expected saved plan");
        };
        assert_eq!(cypher, text);
    }

    #[test]
    fn test_filter_with_extra_keys_keeps_operator() {
        let block: QueryBlock = serde_json::from_value(json!({
            "type": "NODE",
            "label": "Person",
            "properties": {"age": {"operator": "GREATER_THAN", "value": 30, "dataType": "number"}}
        }))
        .unwrap();
        let stmt = build_statement(&[block], None, false, "ANY").unwrap();
        assert_eq!(stmt.cypher(), "MATCH p = (n0:Person)\nWHERE n0.age > $p0\nRETURN p");
        assert_eq!(stmt.parameters["p0"], Value::Int(30));
    }

    #[test]
    fn test_empty_blocks_fail() {
        assert!(matches!(plan(&[], Some(10), false, "ANY"), Err(Error::InvalidInput(_))));
    }
}
