//! # Cypher Generation
//!
//! A small Cypher AST plus a renderer. Statements are built as data, then
//! rendered once into query text with a separate parameter table, so user
//! values never get spliced into the query string.

pub mod ast;
pub mod render;

use crate::model::{PropertyMap, Value};
use ast::{Expr, Query};

pub use render::escape_name;

/// Parameter catalog filled while a statement is being built.
///
/// Anonymous parameters are named `p0`, `p1`, ... in binding order.
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    values: PropertyMap,
    next: usize,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an anonymous parameter and return the expression referencing it.
    pub fn bind(&mut self, value: Value) -> Expr {
        let name = format!("p{}", self.next);
        self.next += 1;
        self.bind_named(name, value)
    }

    /// Bind a parameter under an explicit name (e.g. `limit`, `elementId`).
    pub fn bind_named(&mut self, name: impl Into<String>, value: Value) -> Expr {
        let name = name.into();
        self.values.insert(name.clone(), value);
        Expr::Parameter(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_map(self) -> PropertyMap {
        self.values
    }
}

/// A fully built read statement: AST plus bound parameters.
#[derive(Debug, Clone)]
pub struct Statement {
    pub query: Query,
    pub parameters: PropertyMap,
}

impl Statement {
    pub fn new(query: Query, parameters: Parameters) -> Self {
        Self { query, parameters: parameters.into_map() }
    }

    /// Render the query text.
    pub fn cypher(&self) -> String {
        self.query.to_string()
    }
}
