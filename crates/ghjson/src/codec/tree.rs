//! Data-tree ⇄ JSON conversion.
//!
//! The JSON form is keyed by path, then by item key:
//!
//! ```json
//! {
//!   "{0}":   { "{0}(0)": 1.0, "{0}(1)": 2.0 },
//!   "{0;1}": { "{0;1}(0)": null, "{0;1}(1)": 3.0 }
//! }
//! ```
//!
//! Primitive leaves are native JSON literals. Every other leaf is a prefixed
//! string produced by the codec registry. Host items are translated through
//! a [`ValueInspector`] on the way out and an [`ItemConstructor`] on the way
//! back in.

use serde_json::{Map, Value as Json};

use crate::codec::registry::CodecRegistry;
use crate::error::{CodecError, TreeError};
use crate::model::{CustomValue, DataTree, GhPath, TypedValue};

/// Key of the wrapper object some producers put around a leaf.
const WRAPPED_VALUE_KEY: &str = "value";

/// Tag key of the serde form of [`TypedValue`].
const TAGGED_KIND_KEY: &str = "kind";

/// One tree item between host and JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    /// A value the codec registry understands.
    Value(TypedValue),
    /// Raw JSON with no codec form.
    Json(Json),
}

/// Turns a live host item into a [`Leaf`].
pub trait ValueInspector<T> {
    fn inspect(&self, item: &T) -> Leaf;
}

impl<T, F> ValueInspector<T> for F
where
    F: Fn(&T) -> Leaf,
{
    fn inspect(&self, item: &T) -> Leaf {
        self(item)
    }
}

/// Builds a live host item from a decoded [`Leaf`].
pub trait ItemConstructor<T> {
    fn construct(&self, leaf: Leaf) -> Result<T, String>;
}

impl<T, F> ItemConstructor<T> for F
where
    F: Fn(Leaf) -> Result<T, String>,
{
    fn construct(&self, leaf: Leaf) -> Result<T, String> {
        self(leaf)
    }
}

/// Inspector and constructor for trees of [`TypedValue`].
///
/// Raw JSON leaves are read back as the serde form of a `TypedValue` or of a
/// [`CustomValue`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TypedItems;

impl ValueInspector<TypedValue> for TypedItems {
    fn inspect(&self, item: &TypedValue) -> Leaf {
        Leaf::Value(item.clone())
    }
}

impl ItemConstructor<TypedValue> for TypedItems {
    fn construct(&self, leaf: Leaf) -> Result<TypedValue, String> {
        match leaf {
            Leaf::Value(value) => Ok(value),
            Leaf::Json(json) => {
                if let Ok(value) = serde_json::from_value::<TypedValue>(json.clone()) {
                    return Ok(value);
                }
                serde_json::from_value::<CustomValue>(json.clone())
                    .map(TypedValue::Custom)
                    .map_err(|_| format!("unrecognized item {json}"))
            }
        }
    }
}

/// Converter between data trees and their JSON form.
#[derive(Debug, Clone, Copy)]
pub struct TreeCodec<'a> {
    codecs: &'a CodecRegistry,
}

impl<'a> TreeCodec<'a> {
    pub fn new(codecs: &'a CodecRegistry) -> Self {
        Self { codecs }
    }

    // =========================================================================
    // ENCODING
    // =========================================================================

    /// Flattens a tree into its nested path/index JSON form.
    pub fn flatten<T>(&self, tree: &DataTree<T>, inspector: &impl ValueInspector<T>) -> Json {
        let mut out = Map::with_capacity(tree.path_count());
        for branch in tree.branches() {
            let mut items = Map::with_capacity(branch.items.len());
            for (i, item) in branch.items.iter().enumerate() {
                let json = match item {
                    Some(item) => self.encode_leaf(&inspector.inspect(item)),
                    None => Json::Null,
                };
                items.insert(branch.path.item_key(i), json);
            }
            out.insert(branch.path.to_string(), Json::Object(items));
        }
        Json::Object(out)
    }

    /// Flattens a tree of typed values.
    pub fn flatten_values(&self, tree: &DataTree<TypedValue>) -> Json {
        self.flatten(tree, &TypedItems)
    }

    /// Encodes one leaf as JSON.
    pub fn encode_leaf(&self, leaf: &Leaf) -> Json {
        match leaf {
            Leaf::Json(json) => json.clone(),
            Leaf::Value(value) => self.encode_value(value),
        }
    }

    fn encode_value(&self, value: &TypedValue) -> Json {
        match value {
            // Text that would read back as an encoded value gets the text prefix
            TypedValue::Text(s) if self.codecs.is_encoded(s) => self
                .codecs
                .try_encode(value)
                .map(Json::String)
                .unwrap_or_else(|| Json::String(s.clone())),
            TypedValue::Number(n) if !n.is_finite() => self
                .codecs
                .try_encode(value)
                .map(Json::String)
                .unwrap_or(Json::Null),
            TypedValue::Text(_) | TypedValue::Number(_) | TypedValue::Integer(_) | TypedValue::Boolean(_) => {
                value.to_native_json().unwrap_or(Json::Null)
            }
            _ => match self.codecs.try_encode(value) {
                Some(encoded) => Json::String(encoded),
                None => serde_fallback(value),
            },
        }
    }

    // =========================================================================
    // DECODING
    // =========================================================================

    /// Rebuilds a tree from its JSON form.
    ///
    /// Accepts the nested path/index form or a bare array (one branch at
    /// `{0}`). Unparseable paths degrade to `{}`; malformed leaves fail.
    pub fn unflatten<T>(&self, json: &Json, ctor: &impl ItemConstructor<T>) -> Result<DataTree<T>, TreeError> {
        let mut tree = DataTree::new();
        match json {
            Json::Array(items) => {
                let path = GhPath::new(vec![0]);
                let entries = items.iter().enumerate().map(|(i, v)| (path.item_key(i), v));
                self.read_branch(&mut tree, path.clone(), entries, ctor)?;
            }
            Json::Object(branches) => {
                for (path_key, branch) in branches {
                    let path = parse_path_lenient(path_key);
                    match branch {
                        Json::Object(items) => {
                            let entries = ordered_items(items).into_iter().map(|(k, v)| (k.to_string(), v));
                            self.read_branch(&mut tree, path, entries, ctor)?;
                        }
                        Json::Array(items) => {
                            let entries = items.iter().enumerate().map(|(i, v)| (path.item_key(i), v));
                            self.read_branch(&mut tree, path.clone(), entries, ctor)?;
                        }
                        _ => {
                            return Err(TreeError::InvalidBranch {
                                path: path_key.clone(),
                            });
                        }
                    }
                }
            }
            other => {
                return Err(TreeError::InvalidShape {
                    found: json_type_name(other),
                });
            }
        }
        Ok(tree)
    }

    /// Rebuilds a tree of typed values.
    pub fn unflatten_values(&self, json: &Json) -> Result<DataTree<TypedValue>, TreeError> {
        self.unflatten(json, &TypedItems)
    }

    fn read_branch<'j, T>(
        &self,
        tree: &mut DataTree<T>,
        path: GhPath,
        entries: impl Iterator<Item = (String, &'j Json)>,
        ctor: &impl ItemConstructor<T>,
    ) -> Result<(), TreeError> {
        // Two path keys may degrade to the same path; their items are appended
        let branch = tree.branch_mut(path);
        for (key, json) in entries {
            let leaf = self
                .decode_leaf(json)
                .map_err(|source| TreeError::Item { key: key.clone(), source })?;
            let item = match leaf {
                Some(leaf) => Some(
                    ctor.construct(leaf)
                        .map_err(|message| TreeError::Construct { key, message })?,
                ),
                None => None,
            };
            branch.push(item);
        }
        Ok(())
    }

    /// Decodes one leaf; `None` for a null item.
    ///
    /// A `{ "value": x }` wrapper is unwrapped first and `x` decoded. Strings
    /// with a registered prefix go through the codec, other strings are text.
    /// An object or array `x` is handed on as raw JSON.
    pub fn decode_leaf(&self, json: &Json) -> Result<Option<Leaf>, CodecError> {
        match json {
            Json::Null => Ok(None),
            Json::Object(map) => match map.get(WRAPPED_VALUE_KEY) {
                Some(Json::Null) => Ok(None),
                Some(inner @ (Json::String(_) | Json::Number(_) | Json::Bool(_))) => {
                    self.decode_scalar(inner).map(Some)
                }
                // `{kind, value}` is the serde form of a typed value, not a wrapper
                Some(inner) if !map.contains_key(TAGGED_KIND_KEY) => Ok(Some(Leaf::Json(inner.clone()))),
                _ => Ok(Some(Leaf::Json(json.clone()))),
            },
            Json::Array(_) => Ok(Some(Leaf::Json(json.clone()))),
            scalar => self.decode_scalar(scalar).map(Some),
        }
    }

    fn decode_scalar(&self, json: &Json) -> Result<Leaf, CodecError> {
        if let Json::String(s) = json {
            if self.codecs.is_encoded(s) {
                return self.codecs.decode(s).map(Leaf::Value);
            }
        }
        Ok(match TypedValue::from_native_json(json) {
            Some(value) => Leaf::Value(value),
            None => Leaf::Json(json.clone()),
        })
    }
}

/// Collapses the two-level form into `{path: [leaf, ...]}`.
///
/// Leaves are left as raw JSON, ordered by item index. A bare array becomes
/// the single branch `{0}`.
pub fn project_branches(json: &Json) -> Result<Map<String, Json>, TreeError> {
    let mut out = Map::new();
    match json {
        Json::Array(items) => {
            out.insert(GhPath::new(vec![0]).to_string(), Json::Array(items.clone()));
        }
        Json::Object(branches) => {
            for (path_key, branch) in branches {
                let items: Vec<Json> = match branch {
                    Json::Object(items) => ordered_items(items).into_iter().map(|(_, v)| v.clone()).collect(),
                    Json::Array(items) => items.clone(),
                    _ => {
                        return Err(TreeError::InvalidBranch {
                            path: path_key.clone(),
                        });
                    }
                };
                out.insert(path_key.clone(), Json::Array(items));
            }
        }
        other => {
            return Err(TreeError::InvalidShape {
                found: json_type_name(other),
            });
        }
    }
    Ok(out)
}

/// Returns true if `json` has the nested path/index shape.
pub fn looks_like_tree(json: &Json) -> bool {
    match json {
        Json::Object(branches) => {
            !branches.is_empty()
                && branches
                    .iter()
                    .all(|(k, v)| k.trim_start().starts_with('{') && (v.is_object() || v.is_array()))
        }
        _ => false,
    }
}

/// Items of one branch, ordered by their `(i)` suffix.
///
/// Keys without a suffix keep their document position.
fn ordered_items(items: &Map<String, Json>) -> Vec<(&str, &Json)> {
    let mut entries: Vec<(usize, &str, &Json)> = items
        .iter()
        .enumerate()
        .map(|(pos, (key, value))| {
            let index = GhPath::split_item_key(key).1.unwrap_or(pos);
            (index, key.as_str(), value)
        })
        .collect();
    entries.sort_by_key(|(index, _, _)| *index);
    entries.into_iter().map(|(_, k, v)| (k, v)).collect()
}

fn parse_path_lenient(key: &str) -> GhPath {
    match key.parse::<GhPath>() {
        Ok(path) => path,
        Err(err) => {
            log::warn!("{}; using empty path", err);
            GhPath::empty()
        }
    }
}

fn serde_fallback(value: &TypedValue) -> Json {
    let result = match value {
        TypedValue::Custom(custom) => serde_json::to_value(custom),
        other => serde_json::to_value(other),
    };
    match result {
        Ok(json) => json,
        Err(err) => {
            log::warn!("dropping {} item: {}", value.kind(), err);
            Json::Null
        }
    }
}

pub(crate) fn json_type_name(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
