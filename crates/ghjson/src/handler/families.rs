//! Object handlers for the built-in node families.
//!
//! Each family stores its primary value in `componentState.value` and its
//! remaining UI settings in an extension namespace named after the handler.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::error::HandlerError;
use crate::handler::{HandlerContext, ObjectHandler, StateField};
use crate::model::{CanvasObject, ComponentKind, ComponentState, FontSpec, HostValue, NodeFamily};

const PRIORITY: i32 = 100;

/// Reads `(key, property)` pairs into an extension payload.
fn read_group(
    ctx: &HandlerContext<'_>,
    node: &dyn CanvasObject,
    fields: &[(&str, &str)],
) -> Result<Map<String, Json>, HandlerError> {
    let mut payload = Map::new();
    for (key, property) in fields {
        if let Some(value) = ctx.read(node, property)? {
            payload.insert(key.to_string(), value);
        }
    }
    Ok(payload)
}

/// Writes the keys of an extension payload back to their properties.
///
/// A failing key is recorded in `errors` and the remaining keys are still
/// written.
fn write_group(
    ctx: &HandlerContext<'_>,
    node: &mut dyn CanvasObject,
    payload: &Json,
    fields: &[(&str, &str)],
    errors: &mut Vec<HandlerError>,
) {
    for (key, property) in fields {
        if let Some(value) = payload.get(*key).filter(|v| !v.is_null()) {
            if let Err(err) = ctx.write(node, property, value) {
                errors.push(err);
            }
        }
    }
}

/// Deserializes and re-serializes an extension payload, rejecting payloads
/// that do not have the namespace's shape.
fn typed_payload<T>(state: &ComponentState, namespace: &str) -> Result<Option<Json>, HandlerError>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    match state.extensions.get::<T>(namespace) {
        None => Ok(None),
        Some(Ok(typed)) => serde_json::to_value(&typed)
            .map(Some)
            .map_err(|err| HandlerError::invalid(namespace, err.to_string())),
        Some(Err(err)) => Err(HandlerError::invalid(namespace, err.to_string())),
    }
}

fn value_state(value: Option<Json>) -> ComponentState {
    ComponentState {
        value,
        ..Default::default()
    }
}

fn apply_value(
    ctx: &HandlerContext<'_>,
    node: &mut dyn CanvasObject,
    state: &ComponentState,
    property: &str,
) -> Result<(), HandlerError> {
    match &state.value {
        Some(value) if !value.is_null() => ctx.write(node, property, value),
        _ => Ok(()),
    }
}

// =============================================================================
// SINGLE-VALUE FAMILIES
// =============================================================================

/// Number slider: `value` is the compact `current<min,max>` string.
#[derive(Debug, Clone, Copy, Default)]
pub struct SliderHandler;

impl ObjectHandler for SliderHandler {
    fn name(&self) -> &str {
        "gh.slider"
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn can_handle(&self, _kind: &ComponentKind, family: NodeFamily) -> bool {
        family == NodeFamily::NumberSlider
    }

    fn owned_fields(&self) -> Vec<StateField> {
        vec![StateField::Value]
    }

    fn extract(&self, ctx: &HandlerContext<'_>, node: &dyn CanvasObject) -> Result<ComponentState, HandlerError> {
        Ok(value_state(ctx.read(node, "currentValue")?))
    }

    fn apply(
        &self,
        ctx: &HandlerContext<'_>,
        node: &mut dyn CanvasObject,
        state: &ComponentState,
    ) -> Result<(), HandlerError> {
        apply_value(ctx, node, state, "currentValue")
    }
}

/// Boolean toggle: `value` is the toggle state.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToggleHandler;

impl ObjectHandler for ToggleHandler {
    fn name(&self) -> &str {
        "gh.toggle"
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn can_handle(&self, _kind: &ComponentKind, family: NodeFamily) -> bool {
        family == NodeFamily::BooleanToggle
    }

    fn owned_fields(&self) -> Vec<StateField> {
        vec![StateField::Value]
    }

    fn extract(&self, ctx: &HandlerContext<'_>, node: &dyn CanvasObject) -> Result<ComponentState, HandlerError> {
        Ok(value_state(ctx.read(node, "value")?))
    }

    fn apply(
        &self,
        ctx: &HandlerContext<'_>,
        node: &mut dyn CanvasObject,
        state: &ComponentState,
    ) -> Result<(), HandlerError> {
        apply_value(ctx, node, state, "value")
    }
}

/// Colour swatch: `value` is an `argb:` string.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwatchHandler;

impl ObjectHandler for SwatchHandler {
    fn name(&self) -> &str {
        "gh.swatch"
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn can_handle(&self, _kind: &ComponentKind, family: NodeFamily) -> bool {
        family == NodeFamily::ColourSwatch
    }

    fn owned_fields(&self) -> Vec<StateField> {
        vec![StateField::Value]
    }

    fn extract(&self, ctx: &HandlerContext<'_>, node: &dyn CanvasObject) -> Result<ComponentState, HandlerError> {
        Ok(value_state(ctx.read(node, "color")?))
    }

    fn apply(
        &self,
        ctx: &HandlerContext<'_>,
        node: &mut dyn CanvasObject,
        state: &ComponentState,
    ) -> Result<(), HandlerError> {
        apply_value(ctx, node, state, "color")
    }
}

// =============================================================================
// PANEL
// =============================================================================

/// `gh.panel` extension payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelExtension {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw_indices: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draw_paths: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<i64>,
    /// `argb:` string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<FontSpec>,
}

const PANEL_FIELDS: &[(&str, &str)] = &[
    ("multiline", "multiline"),
    ("wrap", "wrap"),
    ("drawIndices", "drawIndices"),
    ("drawPaths", "drawPaths"),
    ("alignment", "alignment"),
    ("color", "color"),
    ("font", "font"),
];

/// Panel: `value` is the text; `gh.panel` holds layout and appearance.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanelHandler;

impl PanelHandler {
    pub const NAMESPACE: &'static str = "gh.panel";
}

impl ObjectHandler for PanelHandler {
    fn name(&self) -> &str {
        Self::NAMESPACE
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn can_handle(&self, _kind: &ComponentKind, family: NodeFamily) -> bool {
        family == NodeFamily::Panel
    }

    fn owned_fields(&self) -> Vec<StateField> {
        vec![StateField::Value, StateField::Extension(Self::NAMESPACE.to_string())]
    }

    fn extract(&self, ctx: &HandlerContext<'_>, node: &dyn CanvasObject) -> Result<ComponentState, HandlerError> {
        let mut state = value_state(ctx.read(node, "text")?);
        let payload = read_group(ctx, node, PANEL_FIELDS)?;
        if !payload.is_empty() {
            state.extensions.insert_raw(Self::NAMESPACE, Json::Object(payload));
        }
        Ok(state)
    }

    fn apply(
        &self,
        ctx: &HandlerContext<'_>,
        node: &mut dyn CanvasObject,
        state: &ComponentState,
    ) -> Result<(), HandlerError> {
        let mut errors = Vec::new();
        if let Err(err) = apply_value(ctx, node, state, "text") {
            errors.push(err);
        }
        match typed_payload::<PanelExtension>(state, Self::NAMESPACE) {
            Ok(Some(payload)) => write_group(ctx, node, &payload, PANEL_FIELDS, &mut errors),
            Ok(None) => {}
            Err(err) => errors.push(err),
        }
        HandlerError::collect(errors)
    }
}

// =============================================================================
// VALUE LIST
// =============================================================================

/// One entry of a value list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueListItem {
    pub name: String,
    #[serde(default)]
    pub expression: String,
    #[serde(default)]
    pub selected: bool,
}

impl ValueListItem {
    fn from_host(value: &HostValue) -> Option<ValueListItem> {
        Some(ValueListItem {
            name: value.field("name")?.as_text()?.to_string(),
            expression: value
                .field("expression")
                .and_then(|v| v.as_text())
                .unwrap_or_default()
                .to_string(),
            selected: value.field("selected").and_then(|v| v.as_bool()).unwrap_or(false),
        })
    }

    fn to_host(&self) -> HostValue {
        HostValue::Record(vec![
            ("name".to_string(), HostValue::from(self.name.as_str())),
            ("expression".to_string(), HostValue::from(self.expression.as_str())),
            ("selected".to_string(), HostValue::Bool(self.selected)),
        ])
    }
}

/// `gh.valuelist` extension payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueListExtension {
    /// Member name or index of the list mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_mode: Option<Json>,
    #[serde(default)]
    pub items: Vec<ValueListItem>,
}

/// Value list: everything lives in the `gh.valuelist` extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueListHandler;

impl ValueListHandler {
    pub const NAMESPACE: &'static str = "gh.valuelist";
}

impl ObjectHandler for ValueListHandler {
    fn name(&self) -> &str {
        Self::NAMESPACE
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn can_handle(&self, _kind: &ComponentKind, family: NodeFamily) -> bool {
        family == NodeFamily::ValueList
    }

    fn owned_fields(&self) -> Vec<StateField> {
        vec![StateField::Extension(Self::NAMESPACE.to_string())]
    }

    fn extract(&self, ctx: &HandlerContext<'_>, node: &dyn CanvasObject) -> Result<ComponentState, HandlerError> {
        let items = match ctx.host(node, "listItems")? {
            HostValue::List(items) => items
                .iter()
                .map(|item| {
                    ValueListItem::from_host(item)
                        .ok_or_else(|| HandlerError::invalid("listItems", "item has no name"))
                })
                .collect::<Result<Vec<_>, _>>()?,
            _ => return Err(HandlerError::invalid("listItems", "host value is not a list")),
        };
        let payload = ValueListExtension {
            list_mode: ctx.read(node, "listMode")?,
            items,
        };
        let mut state = ComponentState::default();
        state
            .extensions
            .insert(Self::NAMESPACE, &payload)
            .map_err(|err| HandlerError::invalid(Self::NAMESPACE, err.to_string()))?;
        Ok(state)
    }

    fn apply(
        &self,
        ctx: &HandlerContext<'_>,
        node: &mut dyn CanvasObject,
        state: &ComponentState,
    ) -> Result<(), HandlerError> {
        let payload = match state.extensions.get::<ValueListExtension>(Self::NAMESPACE) {
            None => return Ok(()),
            Some(parsed) => parsed.map_err(|err| HandlerError::invalid(Self::NAMESPACE, err.to_string()))?,
        };
        let mut errors = Vec::new();
        if let Some(mode) = &payload.list_mode {
            if let Err(err) = ctx.write(node, "listMode", mode) {
                errors.push(err);
            }
        }
        let items = payload.items.iter().map(ValueListItem::to_host).collect();
        if let Err(err) = node.properties_mut().set_property("listItems", HostValue::List(items)) {
            errors.push(HandlerError::from(err));
        }
        HandlerError::collect(errors)
    }
}

// =============================================================================
// SCRIPT AND SCRIBBLE
// =============================================================================

/// `gh.script` extension payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptExtension {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_output: Option<bool>,
}

const SCRIPT_FIELDS: &[(&str, &str)] = &[
    ("language", "scriptLanguage"),
    ("code", "script"),
    ("standardOutput", "standardOutput"),
];

/// Script components: source and language in `gh.script`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptHandler;

impl ScriptHandler {
    pub const NAMESPACE: &'static str = "gh.script";
}

impl ObjectHandler for ScriptHandler {
    fn name(&self) -> &str {
        Self::NAMESPACE
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn can_handle(&self, _kind: &ComponentKind, family: NodeFamily) -> bool {
        family == NodeFamily::Script
    }

    fn owned_fields(&self) -> Vec<StateField> {
        vec![StateField::Extension(Self::NAMESPACE.to_string())]
    }

    fn extract(&self, ctx: &HandlerContext<'_>, node: &dyn CanvasObject) -> Result<ComponentState, HandlerError> {
        let mut state = ComponentState::default();
        let payload = read_group(ctx, node, SCRIPT_FIELDS)?;
        if !payload.is_empty() {
            state.extensions.insert_raw(Self::NAMESPACE, Json::Object(payload));
        }
        Ok(state)
    }

    fn apply(
        &self,
        ctx: &HandlerContext<'_>,
        node: &mut dyn CanvasObject,
        state: &ComponentState,
    ) -> Result<(), HandlerError> {
        let mut errors = Vec::new();
        if let Some(payload) = typed_payload::<ScriptExtension>(state, Self::NAMESPACE)? {
            write_group(ctx, node, &payload, SCRIPT_FIELDS, &mut errors);
        }
        HandlerError::collect(errors)
    }
}

/// `gh.scribble` extension payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScribbleExtension {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<FontSpec>,
}

const SCRIBBLE_FIELDS: &[(&str, &str)] = &[("font", "font")];

/// Scribble: `value` is the text, `gh.scribble` the font.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScribbleHandler;

impl ScribbleHandler {
    pub const NAMESPACE: &'static str = "gh.scribble";
}

impl ObjectHandler for ScribbleHandler {
    fn name(&self) -> &str {
        Self::NAMESPACE
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn can_handle(&self, _kind: &ComponentKind, family: NodeFamily) -> bool {
        family == NodeFamily::Scribble
    }

    fn owned_fields(&self) -> Vec<StateField> {
        vec![StateField::Value, StateField::Extension(Self::NAMESPACE.to_string())]
    }

    fn extract(&self, ctx: &HandlerContext<'_>, node: &dyn CanvasObject) -> Result<ComponentState, HandlerError> {
        let mut state = value_state(ctx.read(node, "text")?);
        let payload = read_group(ctx, node, SCRIBBLE_FIELDS)?;
        if !payload.is_empty() {
            state.extensions.insert_raw(Self::NAMESPACE, Json::Object(payload));
        }
        Ok(state)
    }

    fn apply(
        &self,
        ctx: &HandlerContext<'_>,
        node: &mut dyn CanvasObject,
        state: &ComponentState,
    ) -> Result<(), HandlerError> {
        let mut errors = Vec::new();
        if let Err(err) = apply_value(ctx, node, state, "text") {
            errors.push(err);
        }
        match typed_payload::<ScribbleExtension>(state, Self::NAMESPACE) {
            Ok(Some(payload)) => write_group(ctx, node, &payload, SCRIBBLE_FIELDS, &mut errors),
            Ok(None) => {}
            Err(err) => errors.push(err),
        }
        HandlerError::collect(errors)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::registry::CodecRegistry;
    use crate::handler::HandlerRegistry;
    use crate::model::{CanvasNodeBuilder, Color};
    use crate::property::PropertyRegistry;

    struct Services {
        codecs: CodecRegistry,
        properties: PropertyRegistry,
        handlers: HandlerRegistry,
    }

    impl Services {
        fn new() -> Self {
            Self {
                codecs: CodecRegistry::with_builtins(),
                properties: PropertyRegistry::with_builtins(),
                handlers: HandlerRegistry::with_builtins(),
            }
        }

        fn ctx(&self) -> HandlerContext<'_> {
            HandlerContext::new(&self.codecs, &self.properties, 1)
        }
    }

    #[test]
    fn test_slider_state() {
        let s = Services::new();
        let slider = CanvasNodeBuilder::number_slider(5.5, 0.0, 10.0, 1).locked(true).build();
        let (state, warnings) = s.handlers.serialize_state(&s.ctx(), &slider);
        assert!(warnings.is_empty());
        assert_eq!(state.value, Some(json!("5.5<0,10>")));
        assert_eq!(state.locked, Some(true));
        assert_eq!(state.hidden, None);

        let mut fresh = CanvasNodeBuilder::number_slider(0.0, 0.0, 1.0, 0).build();
        let warnings = s.handlers.apply_state(&s.ctx(), &mut fresh, &state);
        assert!(warnings.is_empty());
        assert_eq!(fresh.properties.get("currentValue"), Some(&HostValue::Number(5.5)));
        assert_eq!(fresh.properties.get("maximum"), Some(&HostValue::Number(10.0)));
        assert_eq!(fresh.properties.get("decimalPlaces"), Some(&HostValue::Integer(1)));
        assert_eq!(fresh.properties.get("locked"), Some(&HostValue::Bool(true)));
    }

    #[test]
    fn test_panel_state() {
        let s = Services::new();
        let panel = CanvasNodeBuilder::panel("hello")
            .property("wrap", false)
            .property("color", crate::model::TypedValue::Color(Color::argb(255, 0, 0, 255)))
            .build();
        let (state, _) = s.handlers.serialize_state(&s.ctx(), &panel);
        assert_eq!(state.value, Some(json!("hello")));
        let ext = state.extensions.get_raw("gh.panel").unwrap();
        assert_eq!(ext["wrap"], json!(false));
        assert_eq!(ext["color"], json!("argb:255,0,0,255"));
        assert_eq!(ext["font"]["family"], json!("Microsoft Sans Serif"));

        let mut fresh = CanvasNodeBuilder::panel("").build();
        assert!(s.handlers.apply_state(&s.ctx(), &mut fresh, &state).is_empty());
        assert_eq!(fresh.properties, panel.properties);
    }

    #[test]
    fn test_panel_rejects_malformed_extension() {
        let s = Services::new();
        let mut panel = CanvasNodeBuilder::panel("").build();
        let mut state = ComponentState {
            value: Some(json!("text survives")),
            ..Default::default()
        };
        state.extensions.insert_raw("gh.panel", json!({"wrap": "often"}));

        let warnings = s.handlers.apply_state(&s.ctx(), &mut panel, &state);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].subject, "gh.panel");
        assert_eq!(panel.properties.get("text"), Some(&HostValue::Text("text survives".into())));
    }

    #[test]
    fn test_panel_bad_field_does_not_block_later_fields() {
        let s = Services::new();
        let mut panel = CanvasNodeBuilder::panel("").build();
        let mut state = ComponentState {
            value: Some(json!("kept")),
            ..Default::default()
        };
        state.extensions.insert_raw(
            "gh.panel",
            json!({
                "wrap": false,
                "color": "argb:bad",
                "font": {"family": "Consolas", "size": 12.0, "style": "Regular"}
            }),
        );

        let warnings = s.handlers.apply_state(&s.ctx(), &mut panel, &state);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].subject, "gh.panel");
        assert!(warnings[0].message.contains("bad"));
        assert_eq!(panel.properties.get("text"), Some(&HostValue::Text("kept".into())));
        assert_eq!(panel.properties.get("wrap"), Some(&HostValue::Bool(false)));
        assert_eq!(
            panel.properties.get("font"),
            Some(&HostValue::Font(FontSpec::new("Consolas", 12.0, "Regular")))
        );
    }

    #[test]
    fn test_value_list_bad_mode_still_sets_items() {
        let s = Services::new();
        let list = CanvasNodeBuilder::value_list(1, &[("One", "1", true), ("Two", "2", false)]).build();
        let mut state = ComponentState::default();
        state.extensions.insert_raw(
            "gh.valuelist",
            json!({
                "listMode": "Sideways",
                "items": [
                    {"name": "One", "expression": "1", "selected": true},
                    {"name": "Two", "expression": "2", "selected": false}
                ]
            }),
        );

        let mut fresh = CanvasNodeBuilder::value_list(0, &[]).build();
        let warnings = s.handlers.apply_state(&s.ctx(), &mut fresh, &state);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("Sideways"));
        assert_eq!(fresh.properties.get("listMode"), Some(&HostValue::Integer(0)));
        assert_eq!(fresh.properties.get("listItems"), list.properties.get("listItems"));
    }

    #[test]
    fn test_value_list_state() {
        let s = Services::new();
        let list = CanvasNodeBuilder::value_list(1, &[("One", "1", true), ("Two", "2", false)]).build();
        let (state, _) = s.handlers.serialize_state(&s.ctx(), &list);
        assert_eq!(state.value, None);
        assert_eq!(
            state.extensions.get_raw("gh.valuelist"),
            Some(&json!({
                "listMode": "DropDown",
                "items": [
                    {"name": "One", "expression": "1", "selected": true},
                    {"name": "Two", "expression": "2", "selected": false}
                ]
            }))
        );

        let mut fresh = CanvasNodeBuilder::value_list(0, &[]).build();
        s.handlers.apply_state(&s.ctx(), &mut fresh, &state);
        assert_eq!(fresh.properties, list.properties);
    }

    #[test]
    fn test_script_and_toggle_state() {
        let s = Services::new();
        let script = CanvasNodeBuilder::script("Python 3 Script", "python3", "a = x + 1").build();
        let (state, _) = s.handlers.serialize_state(&s.ctx(), &script);
        assert_eq!(
            state.extensions.get_raw("gh.script"),
            Some(&json!({"language": "python3", "code": "a = x + 1", "standardOutput": true}))
        );

        let toggle = CanvasNodeBuilder::boolean_toggle(false).build();
        let (state, _) = s.handlers.serialize_state(&s.ctx(), &toggle);
        assert_eq!(state.value, Some(json!(false)));
        let mut on = CanvasNodeBuilder::boolean_toggle(true).build();
        s.handlers.apply_state(&s.ctx(), &mut on, &state);
        assert_eq!(on.properties.get("value"), Some(&HostValue::Bool(false)));
    }

    #[test]
    fn test_swatch_and_scribble_state() {
        let s = Services::new();
        let swatch = CanvasNodeBuilder::colour_swatch(Color::argb(0, 1, 2, 3)).build();
        let (state, _) = s.handlers.serialize_state(&s.ctx(), &swatch);
        assert_eq!(state.value, Some(json!("argb:0,1,2,3")));

        let scribble = CanvasNodeBuilder::scribble("Title").build();
        let (state, _) = s.handlers.serialize_state(&s.ctx(), &scribble);
        assert_eq!(state.value, Some(json!("Title")));
        assert_eq!(state.extensions.get_raw("gh.scribble").unwrap()["font"]["size"], json!(25.0));
    }
}
