//! PropertyMap: the key-value store on nodes and relationships, and the
//! parameter table bound to generated statements.

use std::collections::HashMap;
use super::Value;

/// A map of property (or parameter) names to values.
pub type PropertyMap = HashMap<String, Value>;

/// Convert a property map into a JSON object, for display-facing shapes.
pub fn to_json_object(props: &PropertyMap) -> serde_json::Map<String, serde_json::Value> {
    props.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
}
