//! In-memory stores.
//!
//! `MemoryStyleStore` is a usable style table for embedding. `ReplayGraphStore`
//! answers queries from a script and records every call, which is what the
//! test suites drive the explorer with.
//!
//! ## Limitations
//!
//! - **No Cypher**: `ReplayGraphStore` matches scripted responses by query
//!   substring, first registered wins. Unmatched queries return no rows.
//! - **No persistence**: both stores live and die with the process.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use crate::execution::QueryResult;
use crate::model::PropertyMap;
use crate::result::StyleConfig;
use crate::{Error, Result};
use super::{ElementKind, GraphStore, StyleStore};

// ============================================================================
// MemoryStyleStore
// ============================================================================

/// Style table keyed by (label or relationship type, element kind).
#[derive(Default)]
pub struct MemoryStyleStore {
    styles: RwLock<HashMap<(String, ElementKind), StyleConfig>>,
    lookups: AtomicU64,
}

impl MemoryStyleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the style for a (label, kind) pair.
    pub fn save(&self, label: impl Into<String>, kind: ElementKind, style: StyleConfig) {
        self.styles.write().insert((label.into(), kind), style);
    }

    pub fn remove(&self, label: &str, kind: ElementKind) -> Option<StyleConfig> {
        self.styles.write().remove(&(label.to_owned(), kind))
    }

    /// Number of `lookup` calls served so far.
    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl StyleStore for MemoryStyleStore {
    async fn lookup(&self, label: &str, kind: ElementKind) -> Result<Option<StyleConfig>> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        Ok(self.styles.read().get(&(label.to_owned(), kind)).cloned())
    }
}

// ============================================================================
// ReplayGraphStore
// ============================================================================

/// One `run_read` call as the store saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub query: String,
    pub params: PropertyMap,
}

enum Reply {
    Rows(QueryResult),
    Fail(String),
}

struct Script {
    fragment: String,
    reply: Reply,
}

/// Scripted graph store.
///
/// Cloning shares the script and the call log.
#[derive(Clone, Default)]
pub struct ReplayGraphStore {
    inner: Arc<ReplayInner>,
}

#[derive(Default)]
struct ReplayInner {
    scripts: RwLock<Vec<Script>>,
    invalid: RwLock<Vec<Script>>,
    calls: Mutex<Vec<RecordedCall>>,
    explained: Mutex<Vec<String>>,
}

impl ReplayGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer queries containing `fragment` with `rows`.
    pub fn respond(self, fragment: impl Into<String>, rows: QueryResult) -> Self {
        self.push_script(fragment.into(), Reply::Rows(rows));
        self
    }

    /// Fail queries containing `fragment` with a store error.
    pub fn fail(self, fragment: impl Into<String>, message: impl Into<String>) -> Self {
        self.push_script(fragment.into(), Reply::Fail(message.into()));
        self
    }

    /// Make `explain` reject queries containing `fragment`.
    pub fn reject_explain(self, fragment: impl Into<String>, message: impl Into<String>) -> Self {
        self.inner.invalid.write().push(Script {
            fragment: fragment.into(),
            reply: Reply::Fail(message.into()),
        });
        self
    }

    fn push_script(&self, fragment: String, reply: Reply) {
        self.inner.scripts.write().push(Script { fragment, reply });
    }

    /// Every `run_read` call so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.calls.lock().clone()
    }

    /// Every query passed to `explain` so far, in order.
    pub fn explained(&self) -> Vec<String> {
        self.inner.explained.lock().clone()
    }
}

#[async_trait]
impl GraphStore for ReplayGraphStore {
    async fn run_read(&self, query: &str, params: PropertyMap) -> Result<QueryResult> {
        self.inner.calls.lock().push(RecordedCall { query: query.to_owned(), params });

        let scripts = self.inner.scripts.read();
        match scripts.iter().find(|s| query.contains(&s.fragment)).map(|s| &s.reply) {
            Some(Reply::Rows(rows)) => Ok(rows.clone()),
            Some(Reply::Fail(message)) => Err(Error::Store(message.clone())),
            None => Ok(QueryResult::default()),
        }
    }

    async fn explain(&self, query: &str) -> Result<()> {
        self.inner.explained.lock().push(query.to_owned());

        let invalid = self.inner.invalid.read();
        match invalid.iter().find(|s| query.contains(&s.fragment)).map(|s| &s.reply) {
            Some(Reply::Fail(message)) => Err(Error::Store(message.clone())),
            _ => Ok(()),
        }
    }
}
