//! Serialized node records and documents.
//!
//! These are the JSON-facing types. Field names follow the GhJSON document
//! format (camelCase).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use uuid::Uuid;

use crate::error::RecordError;
use crate::model::{ComponentKind, NodeId};

/// First-writer-wins merge of one optional field.
///
/// `higher` is the contribution of the higher-priority handler. JSON `null`
/// counts as absent.
pub fn merge_field<T>(higher: Option<T>, lower: Option<T>) -> Option<T> {
    higher.or(lower)
}

fn merge_json(higher: Option<Json>, lower: Option<Json>) -> Option<Json> {
    merge_field(higher.filter(|v| !v.is_null()), lower.filter(|v| !v.is_null()))
}

/// Extension payloads keyed by dotted namespace (`gh.panel`, `vendor.tool`).
///
/// Payloads are opaque JSON, so namespaces no handler understands still
/// survive a round trip.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Extensions(Map<String, Json>);

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true for dotted lowercase identifiers such as `gh.panel`.
    pub fn is_valid_namespace(namespace: &str) -> bool {
        let mut segments = 0;
        for segment in namespace.split('.') {
            let mut chars = segment.chars();
            match chars.next() {
                Some(c) if c.is_ascii_lowercase() => {}
                _ => return false,
            }
            if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-') {
                return false;
            }
            segments += 1;
        }
        segments >= 2
    }

    pub fn get_raw(&self, namespace: &str) -> Option<&Json> {
        self.0.get(namespace)
    }

    /// Deserializes the payload of `namespace`.
    ///
    /// Returns `None` if absent, `Some(Err)` if present but not a `T`.
    pub fn get<T: DeserializeOwned>(&self, namespace: &str) -> Option<Result<T, serde_json::Error>> {
        self.0
            .get(namespace)
            .map(|raw| serde_json::from_value(raw.clone()))
    }

    pub fn insert_raw(&mut self, namespace: impl Into<String>, payload: Json) {
        self.0.insert(namespace.into(), payload);
    }

    /// Serializes `payload` under `namespace`.
    pub fn insert<T: Serialize>(&mut self, namespace: impl Into<String>, payload: &T) -> Result<(), serde_json::Error> {
        let raw = serde_json::to_value(payload)?;
        self.0.insert(namespace.into(), raw);
        Ok(())
    }

    pub fn remove(&mut self, namespace: &str) -> Option<Json> {
        self.0.remove(namespace)
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.0.contains_key(namespace)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Json)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Namespace-level first-writer-wins merge.
    pub fn merge(mut self, lower: Extensions) -> Extensions {
        for (namespace, payload) in lower.0 {
            if payload.is_null() {
                continue;
            }
            let taken = self.0.get(&namespace).is_some_and(|v| !v.is_null());
            if !taken {
                self.0.insert(namespace, payload);
            }
        }
        self
    }
}

/// UI state of a node, assembled from every matching object handler.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    /// Primary value in the family's own grammar (slider string, toggle bool, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Json>,
    #[serde(default, skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

impl ComponentState {
    pub fn is_empty(&self) -> bool {
        self.selected.is_none()
            && self.locked.is_none()
            && self.hidden.is_none()
            && self.value.as_ref().is_none_or(Json::is_null)
            && self.extensions.is_empty()
    }

    /// Merges a lower-priority contribution into this one.
    ///
    /// Every field keeps `self`'s value when present and falls back to
    /// `lower` otherwise.
    pub fn merge(self, lower: ComponentState) -> ComponentState {
        let ComponentState {
            selected,
            locked,
            hidden,
            value,
            extensions,
        } = lower;
        ComponentState {
            selected: merge_field(self.selected, selected),
            locked: merge_field(self.locked, locked),
            hidden: merge_field(self.hidden, hidden),
            value: merge_json(self.value, value),
            extensions: self.extensions.merge(extensions),
        }
    }
}

/// Per-parameter settings of a component.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSettings {
    pub parameter_name: String,
    #[serde(flatten)]
    pub properties: Map<String, Json>,
}

/// Serialized form of one canvas node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_guid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_guid: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Json>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_settings: Vec<ParameterSettings>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_settings: Vec<ParameterSettings>,
    #[serde(default, skip_serializing_if = "ComponentState::is_empty")]
    pub component_state: ComponentState,
}

impl NodeRecord {
    pub fn new(id: NodeId, kind: &ComponentKind) -> Self {
        Self {
            id,
            name: kind.name.clone(),
            component_guid: kind.guid,
            ..Self::default()
        }
    }

    /// Declared kind of this record.
    pub fn kind(&self) -> ComponentKind {
        ComponentKind::new(self.name.clone(), self.component_guid)
    }

    /// Fails if the record carries no kind identity.
    pub fn check_identity(&self) -> Result<(), RecordError> {
        if self.kind().is_anonymous() {
            return Err(RecordError::MissingKindIdentity { id: self.id });
        }
        Ok(())
    }
}

/// One end of a wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionEndpoint {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param_index: Option<usize>,
}

impl ConnectionEndpoint {
    pub fn by_name(id: NodeId, param_name: impl Into<String>) -> Self {
        Self {
            id,
            param_name: Some(param_name.into()),
            param_index: None,
        }
    }

    pub fn by_index(id: NodeId, param_index: usize) -> Self {
        Self {
            id,
            param_name: None,
            param_index: Some(param_index),
        }
    }
}

/// A wire between an output and an input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from: ConnectionEndpoint,
    pub to: ConnectionEndpoint,
}

/// A set of node records and the wires between them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    #[serde(default)]
    pub components: Vec<NodeRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connections: Vec<Connection>,
}

impl Document {
    pub fn from_json(text: &str) -> Result<Document, RecordError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Finds a record by its numeric id.
    pub fn node(&self, id: NodeId) -> Option<&NodeRecord> {
        self.components.iter().find(|c| c.id == id)
    }
}
