//! Builder API for in-memory canvas nodes.
//!
//! Provides a fluent interface for building [`CanvasNode`]s with the
//! property tables their family expects.
//!
//! # Example
//!
//! ```rust
//! use ghjson::model::{CanvasNodeBuilder, HostValue};
//!
//! let slider = CanvasNodeBuilder::number_slider(5.5, 0.0, 10.0, 1)
//!     .nick_name("Radius")
//!     .build();
//! assert_eq!(slider.properties.get("currentValue"), Some(&HostValue::Number(5.5)));
//! ```

use serde_json::Value as Json;
use uuid::Uuid;

use crate::model::canvas::known_kinds;
use crate::model::{
    CanvasNode, CanvasObject, CanvasParameter, Color, ComponentKind, DataTree, FontSpec,
    HostValue, NodeFamily, PropertyTable, TypedValue,
};

/// Builder for constructing a [`CanvasNode`].
#[derive(Debug, Clone)]
pub struct CanvasNodeBuilder {
    node: CanvasNode,
}

impl CanvasNodeBuilder {
    /// Creates a builder whose node declares the core properties plus the
    /// defaults of the family resolved from `kind`.
    pub fn new(kind: ComponentKind) -> Self {
        let mut node = CanvasNode::new(kind);
        declare_core(&mut node.properties);
        declare_family(&mut node.properties, node.family);
        Self { node }
    }

    /// Creates a builder with no declared properties.
    pub fn bare(kind: ComponentKind) -> Self {
        Self {
            node: CanvasNode::new(kind),
        }
    }

    /// Overrides the family and declares its default properties.
    pub fn family(mut self, family: NodeFamily) -> Self {
        self.node.family = family;
        declare_family(&mut self.node.properties, family);
        self
    }

    pub fn instance_guid(mut self, guid: Uuid) -> Self {
        self.node.instance_guid = Some(guid);
        self
    }

    /// Declares (or overwrites) a property.
    pub fn property(mut self, name: impl Into<String>, value: impl Into<HostValue>) -> Self {
        self.node.properties.declare(name, value);
        self
    }

    pub fn nick_name(self, nick_name: impl Into<String>) -> Self {
        self.property("nickName", nick_name.into())
    }

    pub fn locked(self, locked: bool) -> Self {
        self.property("locked", locked)
    }

    pub fn hidden(self, hidden: bool) -> Self {
        self.property("hidden", hidden)
    }

    pub fn selected(self, selected: bool) -> Self {
        self.property("selected", selected)
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Adds an input parameter using a builder function.
    pub fn input<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(ParameterBuilder) -> ParameterBuilder,
    {
        self.node.inputs.push(f(ParameterBuilder::new(name)).build());
        self
    }

    /// Adds an output parameter using a builder function.
    pub fn output<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(ParameterBuilder) -> ParameterBuilder,
    {
        self.node.outputs.push(f(ParameterBuilder::new(name)).build());
        self
    }

    /// Stores an extension payload on the node.
    pub fn extension(mut self, namespace: impl Into<String>, payload: Json) -> Self {
        self.node.extensions.insert_raw(namespace, payload);
        self
    }

    // =========================================================================
    // Families
    // =========================================================================

    /// Number slider with its value, bounds and precision.
    pub fn number_slider(value: f64, minimum: f64, maximum: f64, decimals: i64) -> Self {
        Self::new(ComponentKind::new("Number Slider", Some(known_kinds::NUMBER_SLIDER)))
            .property("currentValue", value)
            .property("minimum", minimum)
            .property("maximum", maximum)
            .property("decimalPlaces", decimals)
    }

    pub fn panel(text: impl Into<String>) -> Self {
        Self::new(ComponentKind::new("Panel", Some(known_kinds::PANEL))).property("text", text.into())
    }

    pub fn boolean_toggle(value: bool) -> Self {
        Self::new(ComponentKind::new("Boolean Toggle", Some(known_kinds::BOOLEAN_TOGGLE)))
            .property("value", value)
    }

    pub fn colour_swatch(color: Color) -> Self {
        Self::new(ComponentKind::new("Colour Swatch", Some(known_kinds::COLOUR_SWATCH)))
            .property("color", TypedValue::Color(color))
    }

    /// Value list; items are `(name, expression, selected)`.
    pub fn value_list(list_mode: i64, items: &[(&str, &str, bool)]) -> Self {
        let items = items
            .iter()
            .map(|(name, expression, selected)| {
                HostValue::Record(vec![
                    ("name".to_string(), HostValue::from(*name)),
                    ("expression".to_string(), HostValue::from(*expression)),
                    ("selected".to_string(), HostValue::Bool(*selected)),
                ])
            })
            .collect();
        Self::new(ComponentKind::new("Value List", Some(known_kinds::VALUE_LIST)))
            .property("listMode", list_mode)
            .property("listItems", HostValue::List(items))
    }

    pub fn script(name: &str, language: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(ComponentKind::named(name))
            .family(NodeFamily::Script)
            .property("scriptLanguage", language.into())
            .property("script", code.into())
    }

    pub fn scribble(text: impl Into<String>) -> Self {
        Self::new(ComponentKind::new("Scribble", Some(known_kinds::SCRIBBLE)))
            .property("text", text.into())
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Builds the final node.
    pub fn build(self) -> CanvasNode {
        self.node
    }

    /// Builds the node as a boxed host object.
    pub fn boxed(self) -> Box<dyn CanvasObject> {
        Box::new(self.node)
    }
}

/// Builder for one parameter of a node.
#[derive(Debug, Clone)]
pub struct ParameterBuilder {
    param: CanvasParameter,
}

impl ParameterBuilder {
    /// Creates a parameter declaring the standard parameter properties.
    pub fn new(name: impl Into<String>) -> Self {
        let mut param = CanvasParameter::new(name);
        param.properties.declare("nickName", "");
        declare_parameter(&mut param.properties);
        Self { param }
    }

    pub fn property(mut self, name: impl Into<String>, value: impl Into<HostValue>) -> Self {
        self.param.properties.declare(name, value);
        self
    }

    pub fn nick_name(self, nick_name: impl Into<String>) -> Self {
        self.property("nickName", nick_name.into())
    }

    /// Sets the data mapping (0 none, 1 flatten, 2 graft).
    pub fn data_mapping(self, mapping: i64) -> Self {
        self.property("dataMapping", mapping)
    }

    pub fn reverse(self, reverse: bool) -> Self {
        self.property("reverse", reverse)
    }

    pub fn simplify(self, simplify: bool) -> Self {
        self.property("simplify", simplify)
    }

    pub fn optional(self, optional: bool) -> Self {
        self.property("optional", optional)
    }

    pub fn expression(self, expression: impl Into<String>) -> Self {
        self.property("expression", expression.into())
    }

    pub fn persistent_data(self, tree: DataTree<TypedValue>) -> Self {
        self.property("persistentData", tree)
    }

    pub fn build(self) -> CanvasParameter {
        self.param
    }
}

/// Node factory for the in-memory host model.
///
/// Every kind is accepted; the family is resolved from the kind tables and
/// its default property table is declared.
pub fn create_node(kind: &ComponentKind, instance_guid: Option<Uuid>) -> Option<Box<dyn CanvasObject>> {
    let mut builder = CanvasNodeBuilder::new(kind.clone());
    if let Some(guid) = instance_guid {
        builder = builder.instance_guid(guid);
    }
    Some(builder.boxed())
}

fn declare_core(table: &mut PropertyTable) {
    table.declare("nickName", "");
    table.declare("locked", false);
    table.declare("hidden", false);
    table.declare("selected", false);
    table.declare("iconDisplayMode", 0i64);
}

fn declare_parameter(table: &mut PropertyTable) {
    table.declare("dataMapping", 0i64);
    table.declare("reverse", false);
    table.declare("simplify", false);
    table.declare("optional", false);
    table.declare("expression", "");
    table.declare("persistentData", DataTree::<TypedValue>::new());
}

fn declare_family(table: &mut PropertyTable, family: NodeFamily) {
    match family {
        NodeFamily::Generic => {}
        NodeFamily::Parameter => declare_parameter(table),
        NodeFamily::NumberSlider => {
            table.declare("currentValue", 0.0);
            table.declare("minimum", 0.0);
            table.declare("maximum", 1.0);
            table.declare("decimalPlaces", 0i64);
        }
        NodeFamily::Panel => {
            table.declare("text", "");
            table.declare("font", HostValue::Font(FontSpec::new("Microsoft Sans Serif", 8.0, "Regular")));
            table.declare("multiline", true);
            table.declare("wrap", true);
            table.declare("drawIndices", true);
            table.declare("drawPaths", true);
            table.declare("alignment", 0i64);
            table.declare("color", TypedValue::Color(Color::argb(255, 255, 250, 90)));
        }
        NodeFamily::ValueList => {
            table.declare("listMode", 1i64);
            table.declare("listItems", HostValue::List(Vec::new()));
        }
        NodeFamily::Script => {
            table.declare("script", "");
            table.declare("scriptLanguage", "");
            table.declare("standardOutput", true);
        }
        NodeFamily::BooleanToggle => {
            table.declare("value", false);
        }
        NodeFamily::ColourSwatch => {
            table.declare("color", TypedValue::Color(Color::rgb(255, 255, 255)));
        }
        NodeFamily::Scribble => {
            table.declare("text", "");
            table.declare("font", HostValue::Font(FontSpec::new("Microsoft Sans Serif", 25.0, "Regular")));
        }
    }
}
