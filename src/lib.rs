//! # graph-explorer: Visual Graph Exploration Core
//!
//! Turns a chain of UI search blocks into one parameterized read query,
//! runs it against a property graph store, and reshapes the heterogeneous
//! rows into deduplicated, styled, connectivity-annotated nodes and
//! relationships ready to draw.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `GraphStore` and `StyleStore` are the only contact with the outside world
//! 2. **Queries are data**: statements are built as a Cypher AST and rendered once, values bound as parameters
//! 3. **Fail before I/O**: malformed block chains are rejected before any store call
//! 4. **Request-scoped state**: style cache and endpoint side-table live and die with one call
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use graph_explorer::{Explorer, MemoryStyleStore, QueryBlock, ReplayGraphStore};
//!
//! # async fn example() -> graph_explorer::Result<()> {
//! let explorer = Explorer::new(ReplayGraphStore::new(), MemoryStyleStore::new());
//!
//! let blocks = [
//!     QueryBlock::node("ANY"),
//!     QueryBlock::relationship("KNOWS", "OUT"),
//!     QueryBlock::node("Person").with_property("name", "Alice"),
//! ];
//! let view = explorer.build_and_run(&blocks, Some(50), true).await?;
//!
//! for node in &view.nodes {
//!     println!("{} {:?}", node.label, node.display_label);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! | Stage | Module |
//! |-------|--------|
//! | Condition compiler, pattern assembler | `query` |
//! | Cypher AST and rendering | `cypher` |
//! | Statement, saved and raw execution | `execution` |
//! | Denormalizer, style cache, connectivity | `result` |
//! | Neighbor expansion and stats | `expansion` |
//! | Schema introspection | `schema` |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod cypher;
pub mod query;
pub mod execution;
pub mod result;
pub mod expansion;
pub mod schema;
pub mod storage;
pub mod config;

use serde::{Deserialize, Serialize};

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{Direction, ElementId, Node, Path, PropertyMap, Relationship, Value};
pub use query::{BlockKind, PropertyFilter, PropertyFilters, QueryBlock, SavedQueryContent, SearchRequest};
pub use execution::{QueryResult, ResultRow, WriteGuard};
pub use result::{ConnectDetail, EdgePosition, GraphNode, GraphRelationship, GraphView, StyleConfig};
pub use expansion::{ExpansionCriterion, ExpansionStat, ExpansionStats};
pub use storage::{ElementKind, GraphStore, MemoryStyleStore, ReplayGraphStore, StyleStore};
pub use config::ExplorerConfig;

use query::Plan;
use result::{connectivity, denormalize};

// ============================================================================
// Top-level Explorer handle
// ============================================================================

/// The primary entry point. An `Explorer` wraps a graph store and a style
/// store and answers search, expansion and schema requests.
///
/// Holds no per-request state; share it freely across concurrent requests.
pub struct Explorer<G: GraphStore, S: StyleStore> {
    graph: G,
    styles: S,
    config: ExplorerConfig,
    guard: WriteGuard,
}

/// Outcome of a query validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    pub message: String,
}

impl<G: GraphStore, S: StyleStore> Explorer<G, S> {
    pub fn new(graph: G, styles: S) -> Self {
        Self::with_config(graph, styles, ExplorerConfig::default())
    }

    pub fn with_config(graph: G, styles: S, config: ExplorerConfig) -> Self {
        let guard = config.write_guard();
        Self { graph, styles, config, guard }
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Access the underlying graph store (for advanced use).
    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn styles(&self) -> &S {
        &self.styles
    }

    /// Plan, run, denormalize and enrich a block chain.
    ///
    /// A SAVED_QUERY block anywhere in the chain replaces the whole chain
    /// with its stored text.
    pub async fn build_and_run(
        &self,
        blocks: &[QueryBlock],
        limit: Option<i64>,
        case_insensitive: bool,
    ) -> Result<GraphView> {
        let limit = self.config.effective_limit(limit);
        let plan = query::plan(blocks, limit, case_insensitive, &self.config.wildcard_label)?;

        let rows = match &plan {
            Plan::Saved { cypher } => execution::run_saved(&self.graph, cypher).await?,
            Plan::Traversal(statement) => execution::run_statement(&self.graph, statement).await?,
        };

        let mut view = denormalize::denormalize(&rows, &self.styles, &self.config).await?;
        connectivity::enrich(&self.graph, &mut view.nodes).await?;
        tracing::debug!(
            nodes = view.nodes.len(),
            relationships = view.relationships.len(),
            "search complete"
        );
        Ok(view)
    }

    /// [`build_and_run`](Self::build_and_run) for a deserialized request body.
    pub async fn search(&self, request: &SearchRequest) -> Result<GraphView> {
        self.build_and_run(&request.cyphers, request.limit, request.case_insensitive_search).await
    }

    pub async fn neighbors(&self, element_id: &ElementId) -> Result<GraphView> {
        expansion::neighbors(&self.graph, &self.styles, &self.config, element_id).await
    }

    pub async fn specific_neighbors(
        &self,
        element_id: &ElementId,
        relation: Option<&str>,
        direction: Option<&str>,
        target_label: Option<&str>,
    ) -> Result<GraphView> {
        expansion::specific_neighbors(
            &self.graph,
            &self.styles,
            &self.config,
            element_id,
            relation,
            direction,
            target_label,
        )
        .await
    }

    pub async fn batch_neighbors(
        &self,
        element_id: &ElementId,
        criteria: &[ExpansionCriterion],
        limit: Option<i64>,
    ) -> Result<GraphView> {
        expansion::batch_neighbors(&self.graph, &self.styles, &self.config, element_id, criteria, limit).await
    }

    pub async fn expansion_stats(&self, element_id: &ElementId, exclude: &[ElementId]) -> Result<ExpansionStats> {
        expansion::expansion_stats(&self.graph, &self.config, element_id, exclude).await
    }

    /// Run ad-hoc text after the write-keyword guard. Rows come back untouched.
    pub async fn execute_raw(&self, cypher: &str) -> Result<QueryResult> {
        execution::run_raw(&self.graph, &self.guard, cypher).await
    }

    /// Ask the store to plan `cypher`. Never fails: store errors become
    /// `valid: false` with the store's message.
    pub async fn validate(&self, cypher: &str) -> Validation {
        match self.graph.explain(cypher).await {
            Ok(()) => Validation { valid: true, message: "Valid Cypher Query".into() },
            Err(Error::Store(message)) => Validation { valid: false, message },
            Err(other) => Validation { valid: false, message: other.to_string() },
        }
    }

    /// Keep the queries the store can plan, in input order.
    pub async fn valid_queries<I, Q>(&self, queries: I) -> Vec<Q>
    where
        I: IntoIterator<Item = Q>,
        Q: AsRef<str>,
    {
        let mut valid = Vec::new();
        for query in queries {
            if self.validate(query.as_ref()).await.valid {
                valid.push(query);
            }
        }
        valid
    }

    pub async fn label_counts(&self) -> Result<Vec<schema::LabelCount>> {
        schema::label_counts(&self.graph).await
    }

    pub async fn schema_info(&self) -> Result<Vec<schema::LabelSchema>> {
        schema::schema_info(&self.graph).await
    }

    pub async fn search_bar(&self) -> Result<schema::SearchBarSchema> {
        schema::search_bar(&self.graph, &self.styles).await
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Graph store error: {0}")]
    Store(String),

    #[error("Style store error: {0}")]
    StyleStore(String),

    #[error("Query rejected: contains write keyword {keyword}")]
    SecurityRejected { keyword: String },

    #[error("Type error: expected {expected}, got {got}")]
    TypeError { expected: String, got: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
