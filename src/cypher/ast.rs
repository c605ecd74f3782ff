//! Cypher AST (Abstract Syntax Tree)
//!
//! These types describe the read statements this crate generates. They are
//! pure data with no storage references or execution logic.
//! Rendering to query text lives in [`super::render`].

/// A read query: one or more MATCH clauses, a RETURN, and an optional LIMIT.
#[derive(Debug, Clone)]
pub struct Query {
    pub matches: Vec<MatchClause>,
    pub return_clause: ReturnClause,
    pub limit: Option<Expr>,
}

/// MATCH clause with a single pattern and its own optional WHERE.
#[derive(Debug, Clone)]
pub struct MatchClause {
    pub optional: bool,
    pub pattern: Pattern,
    pub where_clause: Option<Expr>,
}

/// A pattern: `p = (a:Person)-[:KNOWS]->(b:Person)`
#[derive(Debug, Clone)]
pub struct Pattern {
    /// Named whole-path variable (`p = ...`).
    pub path_variable: Option<String>,
    pub elements: Vec<PatternElement>,
}

/// Element of a pattern: either a node or a relationship.
#[derive(Debug, Clone)]
pub enum PatternElement {
    Node(NodePattern),
    Relationship(RelPattern),
}

/// Node pattern: (alias:Label1:Label2)
#[derive(Debug, Clone, Default)]
pub struct NodePattern {
    pub alias: Option<String>,
    pub labels: Vec<String>,
}

impl NodePattern {
    pub fn named(alias: impl Into<String>) -> Self {
        Self { alias: Some(alias.into()), labels: Vec::new() }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }
}

/// Relationship pattern: -[alias:TYPE]->
#[derive(Debug, Clone)]
pub struct RelPattern {
    pub alias: Option<String>,
    pub rel_types: Vec<String>,
    pub direction: PatternDirection,
}

/// Pattern direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternDirection {
    /// ->
    Right,
    /// <-
    Left,
    /// - (undirected)
    Both,
}

/// RETURN clause.
#[derive(Debug, Clone)]
pub struct ReturnClause {
    pub items: Vec<ReturnItem>,
}

impl ReturnClause {
    /// `RETURN a, b, c` over plain variables.
    pub fn variables<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            items: names
                .into_iter()
                .map(|n| ReturnItem { expr: Expr::Variable(n.to_owned()), alias: None })
                .collect(),
        }
    }
}

/// Single item in RETURN.
#[derive(Debug, Clone)]
pub struct ReturnItem {
    pub expr: Expr,
    pub alias: Option<String>,
}

// ============================================================================
// Expressions
// ============================================================================

/// Expression in Cypher.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Variable reference: `n`, `r`, `p`
    Variable(String),
    /// Property access: `n.name`
    Property { expr: Box<Expr>, key: String },
    /// Parameter: `$name`
    Parameter(String),
    /// Function call: `toLower(n.name)`, `elementId(n)`
    FunctionCall { name: String, args: Vec<Expr> },
    /// Binary operation: `a = b`, `a AND b`
    BinaryOp { left: Box<Expr>, op: BinaryOp, right: Box<Expr> },
    /// Unary operation: `NOT a`
    UnaryOp { op: UnaryOp, expr: Box<Expr> },
    /// IS NULL / IS NOT NULL
    IsNull { expr: Box<Expr>, negated: bool },
    /// String operations: STARTS WITH, ENDS WITH, CONTAINS
    StringOp { left: Box<Expr>, op: StringOp, right: Box<Expr> },
}

impl Expr {
    /// `variable.key`
    pub fn property(variable: &str, key: impl Into<String>) -> Self {
        Expr::Property { expr: Box::new(Expr::Variable(variable.to_owned())), key: key.into() }
    }

    pub fn call(name: &str, args: Vec<Expr>) -> Self {
        Expr::FunctionCall { name: name.to_owned(), args }
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::BinaryOp { left: Box::new(left), op, right: Box::new(right) }
    }

    pub fn and(self, other: Expr) -> Self {
        Expr::binary(self, BinaryOp::And, other)
    }

    pub fn not(self) -> Self {
        Expr::UnaryOp { op: UnaryOp::Not, expr: Box::new(self) }
    }

    /// Fold predicates with AND. `None` for an empty conjunction (match everything).
    pub fn conjunction(predicates: impl IntoIterator<Item = Expr>) -> Option<Expr> {
        predicates.into_iter().reduce(Expr::and)
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Comparison
    Eq, Neq, Lt, Lte, Gt, Gte,
    // Logical
    And,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
}

/// String-specific operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringOp {
    StartsWith,
    EndsWith,
    Contains,
}
