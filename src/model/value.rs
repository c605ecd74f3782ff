//! Universal value type matching Neo4j's type system.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Node, Relationship, Path};
use super::property_map::to_json_object;

/// Neo4j-compatible value type.
///
/// This is what a graph store hands back in each row column, and what
/// generated statements bind as parameters:
/// - Scalars: Bool, Int, Float, String, Bytes
/// - Containers: List, Map
/// - Graph: Node, Relationship, Path
/// - Temporal: Date, Time, DateTime, LocalDateTime, Duration
/// - Spatial: Point2D, Point3D
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(HashMap<String, Value>),

    // Graph types
    Node(Box<Node>),
    Relationship(Box<Relationship>),
    Path(Box<Path>),

    // Temporal types
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(DateTime<Utc>),
    LocalDateTime(NaiveDateTime),
    Duration(IsoDuration),

    // Spatial types
    Point2D { srid: i32, x: f64, y: f64 },
    Point3D { srid: i32, x: f64, y: f64, z: f64 },
}

/// ISO 8601 duration (months, days, seconds, nanoseconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsoDuration {
    pub months: i64,
    pub days: i64,
    pub seconds: i64,
    pub nanoseconds: i32,
}

// ============================================================================
// Type checking
// ============================================================================

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOLEAN",
            Value::Int(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::String(_) => "STRING",
            Value::Bytes(_) => "BYTES",
            Value::List(_) => "LIST",
            Value::Map(_) => "MAP",
            Value::Node(_) => "NODE",
            Value::Relationship(_) => "RELATIONSHIP",
            Value::Path(_) => "PATH",
            Value::Date(_) => "DATE",
            Value::Time(_) => "TIME",
            Value::DateTime(_) => "DATETIME",
            Value::LocalDateTime(_) => "LOCAL_DATETIME",
            Value::Duration(_) => "DURATION",
            Value::Point2D { .. } => "POINT",
            Value::Point3D { .. } => "POINT",
        }
    }

    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }

    /// Attempt to extract as i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// Attempt to extract as &str
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Text for captions: strings verbatim, everything else via `Display`.
    pub fn display_text(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

impl From<bool> for Value { fn from(v: bool) -> Self { Value::Bool(v) } }
impl From<i32> for Value { fn from(v: i32) -> Self { Value::Int(v as i64) } }
impl From<i64> for Value { fn from(v: i64) -> Self { Value::Int(v) } }
impl From<f64> for Value { fn from(v: f64) -> Self { Value::Float(v) } }
impl From<String> for Value { fn from(v: String) -> Self { Value::String(v) } }
impl From<&str> for Value { fn from(v: &str) -> Self { Value::String(v.to_owned()) } }
impl From<Node> for Value { fn from(v: Node) -> Self { Value::Node(Box::new(v)) } }
impl From<Relationship> for Value { fn from(v: Relationship) -> Self { Value::Relationship(Box::new(v)) } }
impl From<Path> for Value { fn from(v: Path) -> Self { Value::Path(Box::new(v)) } }
impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self { Value::List(v.into_iter().map(Into::into).collect()) }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self { v.map(Into::into).unwrap_or(Value::Null) }
}

// ============================================================================
// JSON bridge
// ============================================================================

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(arr) => Value::List(arr.iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => {
                Value::Map(map.iter().map(|(k, v)| (k.clone(), Value::from(v))).collect())
            }
        }
    }
}

impl Value {
    /// Render as plain JSON for display-facing shapes. Graph values collapse to
    /// their property maps; temporal and spatial values to their string form.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::json!(*i),
            Value::Float(f) => serde_json::json!(*f),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(b) => serde_json::Value::Array(b.iter().map(|x| serde_json::json!(*x)).collect()),
            Value::List(l) => serde_json::Value::Array(l.iter().map(Value::to_json).collect()),
            Value::Map(m) => {
                serde_json::Value::Object(m.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
            }
            Value::Node(n) => serde_json::Value::Object(to_json_object(&n.properties)),
            Value::Relationship(r) => serde_json::Value::Object(to_json_object(&r.properties)),
            Value::Path(p) => serde_json::Value::Array(
                p.nodes.iter().map(|n| serde_json::Value::Object(to_json_object(&n.properties))).collect(),
            ),
            other => serde_json::Value::String(other.to_string()),
        }
    }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
            Value::Bytes(b) => write!(f, "<bytes[{}]>", b.len()),
            Value::List(l) => {
                write!(f, "[")?;
                for (i, v) in l.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Value::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Value::Node(n) => write!(f, "({}:{})", n.element_id, n.labels.join(":")),
            Value::Relationship(r) => {
                write!(f, "({})-[{}:{}]->({})", r.start_node, r.element_id, r.rel_type, r.end_node)
            }
            Value::Path(p) => write!(f, "<path[{}]>", p.hops()),
            Value::Date(d) => write!(f, "{d}"),
            Value::Time(t) => write!(f, "{t}"),
            Value::DateTime(dt) => write!(f, "{dt}"),
            Value::LocalDateTime(dt) => write!(f, "{dt}"),
            Value::Duration(d) => write!(f, "P{}M{}DT{}S", d.months, d.days, d.seconds),
            Value::Point2D { x, y, srid } => write!(f, "point({{srid: {srid}, x: {x}, y: {y}}})"),
            Value::Point3D { x, y, z, srid } => write!(f, "point({{srid: {srid}, x: {x}, y: {y}, z: {z}}})"),
        }
    }
}
