//! # Property Graph Model
//!
//! Plain DTOs for the values a graph store hands back: nodes, relationships,
//! paths and the scalar/container values around them.
//!
//! This module is pure data. No I/O, no state, no async.

pub mod node;
pub mod relationship;
pub mod path;
pub mod value;
pub mod property_map;

pub use node::{ElementId, Node};
pub use relationship::{Relationship, Direction};
pub use path::Path;
pub use value::Value;
pub use property_map::PropertyMap;
