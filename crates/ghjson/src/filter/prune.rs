//! Irrelevance pruning of extracted properties.
//!
//! A property whose value is its type's "absent" default is dropped from the
//! output. Families for which such a default is real state list the property
//! in [`PRUNE_EXCEPTIONS`].

use lazy_static::lazy_static;
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value as Json;

use crate::model::NodeFamily;

/// `(family, property)` pairs that are kept even when at their default.
pub const PRUNE_EXCEPTIONS: &[(NodeFamily, &str)] = &[
    (NodeFamily::BooleanToggle, "value"),
    (NodeFamily::Panel, "multiline"),
    (NodeFamily::Panel, "wrap"),
    (NodeFamily::Script, "standardOutput"),
];

/// Integer flags whose zero value means "unset".
const INTEGER_FLAGS: &[&str] = &["alignment"];

/// Text properties whose empty value means "unset".
const OPTIONAL_TEXT: &[&str] = &["expression"];

/// Properties whose empty container means "no data".
const OPTIONAL_CONTAINERS: &[&str] = &["persistentData"];

lazy_static! {
    static ref EXCEPTIONS: FxHashSet<(NodeFamily, &'static str)> =
        PRUNE_EXCEPTIONS.iter().copied().collect();

    /// Enum properties and the name of their default member.
    static ref ENUM_DEFAULTS: FxHashMap<&'static str, &'static str> = {
        let mut m = FxHashMap::default();
        m.insert("dataMapping", "None");
        m.insert("iconDisplayMode", "Application");
        m
    };
}

/// Returns true if `(family, property)` is exempt from pruning.
pub fn is_exception(family: NodeFamily, property: &str) -> bool {
    EXCEPTIONS.contains(&(family, property))
}

/// Returns true if `value` is the absent default of `property`.
///
/// `owner_name` is the name a `nickName` is compared against (the
/// component's display name or the parameter's name).
pub fn is_default(property: &str, value: &Json, owner_name: &str) -> bool {
    match value {
        Json::Null => true,
        Json::Bool(b) => !b,
        Json::Number(n) => INTEGER_FLAGS.contains(&property) && n.as_i64() == Some(0),
        Json::String(s) => {
            if property == "nickName" {
                s.is_empty() || s == owner_name
            } else if let Some(default) = ENUM_DEFAULTS.get(property) {
                s.eq_ignore_ascii_case(default)
            } else {
                OPTIONAL_TEXT.contains(&property) && s.is_empty()
            }
        }
        Json::Object(map) => OPTIONAL_CONTAINERS.contains(&property) && map.is_empty(),
        Json::Array(items) => OPTIONAL_CONTAINERS.contains(&property) && items.is_empty(),
    }
}

/// Returns true if the property should be dropped from the output.
pub fn should_prune(family: NodeFamily, property: &str, value: &Json, owner_name: &str) -> bool {
    !is_exception(family, property) && is_default(property, value, owner_name)
}
