//! # Collaborator Seams
//!
//! The two stores the explorer reads from. Everything behind these traits
//! (drivers, connection pools, the relational style table) is somebody
//! else's job.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStyleStore` | `memory` | In-memory style table for embedding/testing |
//! | `ReplayGraphStore` | `memory` | Scripted graph store that records every call |

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::execution::QueryResult;
use crate::model::PropertyMap;
use crate::result::StyleConfig;
use crate::Result;

pub use memory::{MemoryStyleStore, RecordedCall, ReplayGraphStore};

/// Which kind of element a style applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementKind {
    Node,
    Relationship,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Node => "NODE",
            ElementKind::Relationship => "RELATIONSHIP",
        }
    }
}

// ============================================================================
// GraphStore Trait
// ============================================================================

/// Read access to the property graph.
///
/// Implementations must run `run_read` in the driver's read-only mode.
/// Failures map to [`crate::Error::Store`] and are surfaced unchanged; the
/// explorer never retries.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Run a query with bound parameters and collect every row.
    async fn run_read(&self, query: &str, params: PropertyMap) -> Result<QueryResult>;

    /// Plan `query` without running it (the store prefixes `EXPLAIN`).
    /// `Err` carries the store's message for an invalid query.
    async fn explain(&self, query: &str) -> Result<()>;
}

// ============================================================================
// StyleStore Trait
// ============================================================================

/// Lookup of presentation metadata keyed by (label or type, element kind).
#[async_trait]
pub trait StyleStore: Send + Sync {
    async fn lookup(&self, label: &str, kind: ElementKind) -> Result<Option<StyleConfig>>;
}

#[async_trait]
impl<T: GraphStore + ?Sized> GraphStore for std::sync::Arc<T> {
    async fn run_read(&self, query: &str, params: PropertyMap) -> Result<QueryResult> {
        (**self).run_read(query, params).await
    }

    async fn explain(&self, query: &str) -> Result<()> {
        (**self).explain(query).await
    }
}

#[async_trait]
impl<T: StyleStore + ?Sized> StyleStore for std::sync::Arc<T> {
    async fn lookup(&self, label: &str, kind: ElementKind) -> Result<Option<StyleConfig>> {
        (**self).lookup(label, kind).await
    }
}
