//! Boundary to the host canvas.
//!
//! The engine never touches host objects directly. It reads and writes named
//! properties through [`PropertyAccess`], learns a node's kind and family
//! through [`CanvasObject`], and asks a [`NodeFactory`] for fresh nodes when
//! deserializing.
//!
//! [`CanvasNode`] is an in-memory host model built on declared property
//! tables. Host integrations can use it directly or implement the traits on
//! their own types.

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HostError;
use crate::model::node::Extensions;
use crate::model::{ComponentKind, DataTree, TypedValue};

// =============================================================================
// HOST VALUES
// =============================================================================

/// Font description carried by panels and scribbles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSpec {
    pub family: String,
    pub size: f64,
    #[serde(default = "FontSpec::regular")]
    pub style: String,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f64, style: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            size,
            style: style.into(),
        }
    }

    fn regular() -> String {
        "Regular".to_string()
    }
}

impl FromStr for FontSpec {
    type Err = String;

    /// Parses the legacy `Family;Size;Style` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(';').map(str::trim).collect();
        if parts.len() < 2 || parts.len() > 3 || parts[0].is_empty() {
            return Err(format!("expected Family;Size[;Style], found {s:?}"));
        }
        let size = crate::util::parse_number(parts[1])
            .ok_or_else(|| format!("invalid font size {:?}", parts[1]))?;
        let style = parts.get(2).map(|s| s.to_string()).unwrap_or_else(FontSpec::regular);
        Ok(FontSpec::new(parts[0], size, style))
    }
}

/// A live property value as the host sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    /// Color, geometry, or an extension kind.
    Value(TypedValue),
    Font(FontSpec),
    Tree(DataTree<TypedValue>),
    List(Vec<HostValue>),
    /// Ordered named fields.
    Record(Vec<(String, HostValue)>),
}

impl HostValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HostValue::Bool(b) => Some(*b),
            HostValue::Value(TypedValue::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            HostValue::Integer(i) => Some(*i),
            HostValue::Value(TypedValue::Integer(i)) => Some(*i),
            HostValue::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HostValue::Number(n) => Some(*n),
            HostValue::Integer(i) => Some(*i as f64),
            HostValue::Value(v) => v.as_f64(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            HostValue::Text(s) => Some(s),
            HostValue::Value(TypedValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<crate::model::Color> {
        match self {
            HostValue::Value(v) => v.as_color(),
            _ => None,
        }
    }

    /// Looks up a field of a `Record` value.
    pub fn field(&self, name: &str) -> Option<&HostValue> {
        match self {
            HostValue::Record(fields) => fields.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        HostValue::Bool(value)
    }
}

impl From<i64> for HostValue {
    fn from(value: i64) -> Self {
        HostValue::Integer(value)
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        HostValue::Number(value)
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        HostValue::Text(value.to_string())
    }
}

impl From<String> for HostValue {
    fn from(value: String) -> Self {
        HostValue::Text(value)
    }
}

impl From<TypedValue> for HostValue {
    fn from(value: TypedValue) -> Self {
        HostValue::Value(value)
    }
}

impl From<DataTree<TypedValue>> for HostValue {
    fn from(value: DataTree<TypedValue>) -> Self {
        HostValue::Tree(value)
    }
}

// =============================================================================
// NODE FAMILIES
// =============================================================================

/// Well-known component GUIDs.
pub mod known_kinds {
    use uuid::Uuid;

    pub const NUMBER_SLIDER: Uuid = Uuid::from_u128(0x57da07bd_ecab_415d_9d86_af36d7073abc);
    pub const PANEL: Uuid = Uuid::from_u128(0x59e0b89a_e487_49f8_bab8_b5bab16be14c);
    pub const VALUE_LIST: Uuid = Uuid::from_u128(0x00027467_0d24_4fa7_b178_8dc0ac5f42ec);
    pub const BOOLEAN_TOGGLE: Uuid = Uuid::from_u128(0x2e78987b_9dfb_42a2_8b76_3923ac8bd91b);
    pub const COLOUR_SWATCH: Uuid = Uuid::from_u128(0x9c53bac0_ba66_40bd_8154_ce9829b9db1a);
    pub const SCRIBBLE: Uuid = Uuid::from_u128(0x7f5c6c55_f846_4a08_9c9a_cfdc285cc6fe);
}

/// Family a node kind belongs to; selects property categories and handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeFamily {
    #[default]
    Generic,
    Parameter,
    NumberSlider,
    Panel,
    ValueList,
    Script,
    BooleanToggle,
    ColourSwatch,
    Scribble,
}

lazy_static! {
    static ref FAMILY_BY_GUID: FxHashMap<Uuid, NodeFamily> = {
        let mut m = FxHashMap::default();
        m.insert(known_kinds::NUMBER_SLIDER, NodeFamily::NumberSlider);
        m.insert(known_kinds::PANEL, NodeFamily::Panel);
        m.insert(known_kinds::VALUE_LIST, NodeFamily::ValueList);
        m.insert(known_kinds::BOOLEAN_TOGGLE, NodeFamily::BooleanToggle);
        m.insert(known_kinds::COLOUR_SWATCH, NodeFamily::ColourSwatch);
        m.insert(known_kinds::SCRIBBLE, NodeFamily::Scribble);
        m
    };

    static ref FAMILY_BY_NAME: FxHashMap<&'static str, NodeFamily> = {
        let mut m = FxHashMap::default();
        m.insert("number slider", NodeFamily::NumberSlider);
        m.insert("panel", NodeFamily::Panel);
        m.insert("value list", NodeFamily::ValueList);
        m.insert("boolean toggle", NodeFamily::BooleanToggle);
        m.insert("colour swatch", NodeFamily::ColourSwatch);
        m.insert("color swatch", NodeFamily::ColourSwatch);
        m.insert("scribble", NodeFamily::Scribble);
        m.insert("c# script", NodeFamily::Script);
        m.insert("vb script", NodeFamily::Script);
        m.insert("python script", NodeFamily::Script);
        m.insert("python 3 script", NodeFamily::Script);
        m.insert("ironpython 2 script", NodeFamily::Script);
        m
    };
}

impl NodeFamily {
    /// Resolves a family from the static kind tables.
    ///
    /// The GUID is consulted first; unknown kinds are `Generic`.
    pub fn from_kind(kind: &ComponentKind) -> NodeFamily {
        if let Some(family) = kind.guid.and_then(|g| FAMILY_BY_GUID.get(&g).copied()) {
            return family;
        }
        FAMILY_BY_NAME
            .get(kind.name.trim().to_ascii_lowercase().as_str())
            .copied()
            .unwrap_or(NodeFamily::Generic)
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeFamily::Generic => "generic",
            NodeFamily::Parameter => "parameter",
            NodeFamily::NumberSlider => "slider",
            NodeFamily::Panel => "panel",
            NodeFamily::ValueList => "value-list",
            NodeFamily::Script => "script",
            NodeFamily::BooleanToggle => "toggle",
            NodeFamily::ColourSwatch => "swatch",
            NodeFamily::Scribble => "scribble",
        }
    }
}

impl fmt::Display for NodeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// HOST TRAITS
// =============================================================================

/// Named get/set access to a host object's properties.
pub trait PropertyAccess {
    /// Names of the properties this object exposes, in declaration order.
    fn property_names(&self) -> Vec<String>;

    /// Reads a property; `None` if the object has no such property.
    fn get_property(&self, name: &str) -> Option<HostValue>;

    /// Writes a property.
    fn set_property(&mut self, name: &str, value: HostValue) -> Result<(), HostError>;
}

/// Input or output side of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterSide {
    Input,
    Output,
}

/// Read view of one component parameter.
pub struct ParameterRef<'a> {
    pub name: &'a str,
    pub properties: &'a dyn PropertyAccess,
}

/// A live canvas node.
///
/// Handler resolution is cached per [`ComponentKind::key`] and family.
pub trait CanvasObject: Send + Sync {
    /// Declared kind.
    fn kind(&self) -> ComponentKind;

    /// Stable external identifier, if the host assigned one.
    fn instance_guid(&self) -> Option<Uuid>;

    /// Family used for filtering and handler matching.
    fn family(&self) -> NodeFamily {
        NodeFamily::from_kind(&self.kind())
    }

    /// Component-level properties.
    fn properties(&self) -> &dyn PropertyAccess;

    fn properties_mut(&mut self) -> &mut dyn PropertyAccess;

    /// Parameters on one side, in order.
    fn parameters(&self, _side: ParameterSide) -> Vec<ParameterRef<'_>> {
        Vec::new()
    }

    /// Mutable properties of the parameter called `name`.
    fn parameter_mut(&mut self, _side: ParameterSide, _name: &str) -> Option<&mut dyn PropertyAccess> {
        None
    }

    /// Storage for extension payloads no handler understands.
    fn extension_store(&self) -> Option<&Extensions> {
        None
    }

    fn extension_store_mut(&mut self) -> Option<&mut Extensions> {
        None
    }
}

/// Creates fresh host nodes during deserialization.
pub trait NodeFactory {
    fn create(&self, kind: &ComponentKind, instance_guid: Option<Uuid>) -> Option<Box<dyn CanvasObject>>;
}

impl<F> NodeFactory for F
where
    F: Fn(&ComponentKind, Option<Uuid>) -> Option<Box<dyn CanvasObject>>,
{
    fn create(&self, kind: &ComponentKind, instance_guid: Option<Uuid>) -> Option<Box<dyn CanvasObject>> {
        self(kind, instance_guid)
    }
}

// =============================================================================
// IN-MEMORY HOST MODEL
// =============================================================================

/// Declared, ordered property slots.
///
/// Setting a property that was never declared fails, which mirrors a host
/// object whose fields are fixed by its type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyTable {
    slots: Vec<(String, HostValue)>,
}

impl PropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a property with its initial value, replacing any previous one.
    pub fn declare(&mut self, name: impl Into<String>, value: impl Into<HostValue>) {
        let name = name.into();
        let value = value.into();
        match self.slots.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.slots.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&HostValue> {
        self.slots.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl PropertyAccess for PropertyTable {
    fn property_names(&self) -> Vec<String> {
        self.slots.iter().map(|(k, _)| k.clone()).collect()
    }

    fn get_property(&self, name: &str) -> Option<HostValue> {
        self.get(name).cloned()
    }

    fn set_property(&mut self, name: &str, value: HostValue) -> Result<(), HostError> {
        match self.slots.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => {
                slot.1 = value;
                Ok(())
            }
            None => Err(HostError::UnknownProperty(name.to_string())),
        }
    }
}

/// A parameter of a [`CanvasNode`].
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasParameter {
    pub name: String,
    pub properties: PropertyTable,
}

impl CanvasParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: PropertyTable::new(),
        }
    }
}

/// In-memory canvas node.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasNode {
    pub kind: ComponentKind,
    pub instance_guid: Option<Uuid>,
    pub family: NodeFamily,
    pub properties: PropertyTable,
    pub inputs: Vec<CanvasParameter>,
    pub outputs: Vec<CanvasParameter>,
    pub extensions: Extensions,
}

impl CanvasNode {
    /// Creates a node with the family resolved from `kind`.
    pub fn new(kind: ComponentKind) -> Self {
        let family = NodeFamily::from_kind(&kind);
        Self {
            kind,
            instance_guid: None,
            family,
            properties: PropertyTable::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            extensions: Extensions::default(),
        }
    }

    fn side(&self, side: ParameterSide) -> &[CanvasParameter] {
        match side {
            ParameterSide::Input => &self.inputs,
            ParameterSide::Output => &self.outputs,
        }
    }
}

impl CanvasObject for CanvasNode {
    fn kind(&self) -> ComponentKind {
        self.kind.clone()
    }

    fn instance_guid(&self) -> Option<Uuid> {
        self.instance_guid
    }

    fn family(&self) -> NodeFamily {
        self.family
    }

    fn properties(&self) -> &dyn PropertyAccess {
        &self.properties
    }

    fn properties_mut(&mut self) -> &mut dyn PropertyAccess {
        &mut self.properties
    }

    fn parameters(&self, side: ParameterSide) -> Vec<ParameterRef<'_>> {
        self.side(side)
            .iter()
            .map(|p| ParameterRef {
                name: &p.name,
                properties: &p.properties,
            })
            .collect()
    }

    fn parameter_mut(&mut self, side: ParameterSide, name: &str) -> Option<&mut dyn PropertyAccess> {
        let params = match side {
            ParameterSide::Input => &mut self.inputs,
            ParameterSide::Output => &mut self.outputs,
        };
        params
            .iter_mut()
            .find(|p| p.name == name)
            .map(|p| &mut p.properties as &mut dyn PropertyAccess)
    }

    fn extension_store(&self) -> Option<&Extensions> {
        Some(&self.extensions)
    }

    fn extension_store_mut(&mut self) -> Option<&mut Extensions> {
        Some(&mut self.extensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_from_guid_and_name() {
        let slider = ComponentKind::new("Renamed", Some(known_kinds::NUMBER_SLIDER));
        assert_eq!(NodeFamily::from_kind(&slider), NodeFamily::NumberSlider);
        assert_eq!(NodeFamily::from_kind(&ComponentKind::named("Panel")), NodeFamily::Panel);
        assert_eq!(
            NodeFamily::from_kind(&ComponentKind::named("Python 3 Script")),
            NodeFamily::Script
        );
        assert_eq!(NodeFamily::from_kind(&ComponentKind::named("Addition")), NodeFamily::Generic);
    }

    #[test]
    fn test_property_table_rejects_undeclared() {
        let mut table = PropertyTable::new();
        table.declare("locked", false);
        assert!(table.set_property("locked", HostValue::Bool(true)).is_ok());
        assert_eq!(table.get_property("locked"), Some(HostValue::Bool(true)));
        assert_eq!(
            table.set_property("hidden", HostValue::Bool(true)),
            Err(HostError::UnknownProperty("hidden".into()))
        );
    }

    #[test]
    fn test_parameter_mut_by_name() {
        let mut node = CanvasNode::new(ComponentKind::named("Addition"));
        let mut a = CanvasParameter::new("A");
        a.properties.declare("reverse", false);
        node.inputs.push(a);

        let params = node.parameters(ParameterSide::Input);
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "A");

        node.parameter_mut(ParameterSide::Input, "A")
            .unwrap()
            .set_property("reverse", HostValue::Bool(true))
            .unwrap();
        assert_eq!(node.inputs[0].properties.get("reverse"), Some(&HostValue::Bool(true)));
        assert!(node.parameter_mut(ParameterSide::Output, "A").is_none());
    }

    #[test]
    fn test_font_from_legacy_string() {
        let font: FontSpec = "Arial;8;Bold".parse().unwrap();
        assert_eq!(font, FontSpec::new("Arial", 8.0, "Bold"));
        let font: FontSpec = "Consolas; 10".parse().unwrap();
        assert_eq!(font.style, "Regular");
        assert!("Arial".parse::<FontSpec>().is_err());
    }
}
