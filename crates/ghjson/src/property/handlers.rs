//! Conversion handlers for properties whose JSON shape differs from the
//! host's.

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;
use serde_json::Value as Json;

use crate::codec::slider::{SliderValue, MAX_SLIDER_DECIMALS};
use crate::codec::tree::TreeCodec;
use crate::error::HandlerError;
use crate::model::{DataTree, HostValue, NodeFamily, PropertyAccess, TypedValue};
use crate::property::convert::{json_to_color, json_to_f64, json_to_font, json_to_i64};
use crate::property::{PropertyContext, PropertyHandler};

fn read(target: &dyn PropertyAccess, property: &str) -> Result<HostValue, HandlerError> {
    target.get_property(property).ok_or_else(|| HandlerError::UnknownProperty {
        property: property.to_string(),
    })
}

fn read_f64(target: &dyn PropertyAccess, property: &str) -> Result<f64, HandlerError> {
    read(target, property)?
        .as_f64()
        .ok_or_else(|| HandlerError::invalid(property, "host value is not numeric"))
}

/// Writes a number, keeping the host's integer/float representation.
fn write_numeric(target: &mut dyn PropertyAccess, property: &str, value: f64) -> Result<(), HandlerError> {
    let host = match target.get_property(property) {
        Some(HostValue::Integer(_)) if value.fract() == 0.0 => HostValue::Integer(value as i64),
        Some(HostValue::Integer(_)) => return Err(HandlerError::invalid(property, "expected an integer")),
        _ => HostValue::Number(value),
    };
    target.set_property(property, host)?;
    Ok(())
}

// =============================================================================
// SLIDER VALUE
// =============================================================================

/// Slider `currentValue` ⇄ `current<min,max>`.
///
/// Applying a compact string sets bounds and precision before the value, so
/// the host never clamps the value against stale bounds. A bare number sets
/// only the value.
#[derive(Debug, Clone, Copy, Default)]
pub struct SliderValueHandler;

impl SliderValueHandler {
    pub const PROPERTY: &'static str = "currentValue";
    pub const RELATED: [&'static str; 3] = ["minimum", "maximum", "decimalPlaces"];

    /// Reads the compact value of a slider.
    pub fn read(target: &dyn PropertyAccess) -> Result<SliderValue, HandlerError> {
        let decimals = read(target, "decimalPlaces")?
            .as_i64()
            .ok_or_else(|| HandlerError::invalid("decimalPlaces", "host value is not an integer"))?;
        Ok(SliderValue::new(
            read_f64(target, Self::PROPERTY)?,
            read_f64(target, "minimum")?,
            read_f64(target, "maximum")?,
            decimals.clamp(0, MAX_SLIDER_DECIMALS as i64) as u32,
        ))
    }

    /// Writes a compact value: bounds, then precision, then the value.
    pub fn write(target: &mut dyn PropertyAccess, value: &SliderValue) -> Result<(), HandlerError> {
        write_numeric(target, "minimum", value.minimum)?;
        write_numeric(target, "maximum", value.maximum)?;
        write_numeric(target, "decimalPlaces", value.decimals as f64)?;
        write_numeric(target, Self::PROPERTY, value.current)
    }
}

impl PropertyHandler for SliderValueHandler {
    fn name(&self) -> &str {
        "slider-value"
    }

    fn priority(&self) -> i32 {
        200
    }

    fn can_handle(&self, ctx: &PropertyContext<'_>, _target: &dyn PropertyAccess, property: &str) -> bool {
        ctx.family == NodeFamily::NumberSlider && property == Self::PROPERTY
    }

    fn extract(
        &self,
        _ctx: &PropertyContext<'_>,
        target: &dyn PropertyAccess,
        _property: &str,
    ) -> Result<Option<Json>, HandlerError> {
        Ok(Some(Json::String(Self::read(target)?.encode())))
    }

    fn apply(
        &self,
        ctx: &PropertyContext<'_>,
        target: &mut dyn PropertyAccess,
        property: &str,
        value: &Json,
    ) -> Result<(), HandlerError> {
        if let Json::String(s) = value {
            if s.contains('<') {
                let slider = SliderValue::decode(s)?;
                return Self::write(target, &slider);
            }
        }
        let current =
            json_to_f64(ctx.codecs, value).ok_or_else(|| HandlerError::invalid(property, "expected a number"))?;
        write_numeric(target, property, current)
    }

    fn related_properties(&self, _ctx: &PropertyContext<'_>, _property: &str) -> Vec<String> {
        Self::RELATED.iter().map(|s| s.to_string()).collect()
    }
}

// =============================================================================
// DATA TREE
// =============================================================================

/// `persistentData` and any other tree-valued property ⇄ nested tree JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataTreeHandler;

impl PropertyHandler for DataTreeHandler {
    fn name(&self) -> &str {
        "data-tree"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn can_handle(&self, _ctx: &PropertyContext<'_>, target: &dyn PropertyAccess, property: &str) -> bool {
        property == "persistentData" || matches!(target.get_property(property), Some(HostValue::Tree(_)))
    }

    fn extract(
        &self,
        ctx: &PropertyContext<'_>,
        target: &dyn PropertyAccess,
        property: &str,
    ) -> Result<Option<Json>, HandlerError> {
        match target.get_property(property) {
            Some(HostValue::Tree(tree)) => Ok(Some(TreeCodec::new(ctx.codecs).flatten_values(&tree))),
            _ => Ok(None),
        }
    }

    fn apply(
        &self,
        ctx: &PropertyContext<'_>,
        target: &mut dyn PropertyAccess,
        property: &str,
        value: &Json,
    ) -> Result<(), HandlerError> {
        let tree = match value {
            Json::Null => DataTree::new(),
            _ => TreeCodec::new(ctx.codecs).unflatten_values(value)?,
        };
        target.set_property(property, HostValue::Tree(tree))?;
        Ok(())
    }
}

// =============================================================================
// COLOR
// =============================================================================

/// `color` and any other color-valued property ⇄ `argb:a,r,g,b`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorHandler;

impl PropertyHandler for ColorHandler {
    fn name(&self) -> &str {
        "color"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn can_handle(&self, _ctx: &PropertyContext<'_>, target: &dyn PropertyAccess, property: &str) -> bool {
        property == "color" || target.get_property(property).and_then(|v| v.as_color()).is_some()
    }

    fn extract(
        &self,
        ctx: &PropertyContext<'_>,
        target: &dyn PropertyAccess,
        property: &str,
    ) -> Result<Option<Json>, HandlerError> {
        match target.get_property(property).and_then(|v| v.as_color()) {
            Some(color) => Ok(Some(Json::String(ctx.codecs.encode(&TypedValue::Color(color))?))),
            None => Ok(None),
        }
    }

    fn apply(
        &self,
        ctx: &PropertyContext<'_>,
        target: &mut dyn PropertyAccess,
        property: &str,
        value: &Json,
    ) -> Result<(), HandlerError> {
        let color = json_to_color(ctx.codecs, property, value)?;
        target.set_property(property, HostValue::Value(TypedValue::Color(color)))?;
        Ok(())
    }
}

// =============================================================================
// FONT
// =============================================================================

/// `font` ⇄ `{family, size, style}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontHandler;

impl PropertyHandler for FontHandler {
    fn name(&self) -> &str {
        "font"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn can_handle(&self, _ctx: &PropertyContext<'_>, target: &dyn PropertyAccess, property: &str) -> bool {
        property == "font" || matches!(target.get_property(property), Some(HostValue::Font(_)))
    }

    fn extract(
        &self,
        _ctx: &PropertyContext<'_>,
        target: &dyn PropertyAccess,
        property: &str,
    ) -> Result<Option<Json>, HandlerError> {
        match target.get_property(property) {
            Some(HostValue::Font(font)) => serde_json::to_value(&font)
                .map(Some)
                .map_err(|err| HandlerError::invalid(property, err.to_string())),
            _ => Ok(None),
        }
    }

    fn apply(
        &self,
        _ctx: &PropertyContext<'_>,
        target: &mut dyn PropertyAccess,
        property: &str,
        value: &Json,
    ) -> Result<(), HandlerError> {
        let font = json_to_font(property, value)?;
        target.set_property(property, HostValue::Font(font))?;
        Ok(())
    }
}

// =============================================================================
// DISPLAY MODES
// =============================================================================

lazy_static! {
    /// Enum properties stored as integers by the host, by member index.
    static ref DISPLAY_MODES: FxHashMap<&'static str, &'static [&'static str]> = {
        let mut m: FxHashMap<&'static str, &'static [&'static str]> = FxHashMap::default();
        m.insert("dataMapping", &["None", "Flatten", "Graft"]);
        m.insert("iconDisplayMode", &["Application", "Icon", "Name"]);
        m.insert("listMode", &["CheckList", "DropDown", "Sequence", "Cycle"]);
        m
    };
}

/// Integer host enums ⇄ member names.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayModeHandler;

impl DisplayModeHandler {
    /// Member names of an enum property.
    pub fn members(property: &str) -> Option<&'static [&'static str]> {
        DISPLAY_MODES.get(property).copied()
    }
}

impl PropertyHandler for DisplayModeHandler {
    fn name(&self) -> &str {
        "display-mode"
    }

    fn priority(&self) -> i32 {
        100
    }

    fn can_handle(&self, _ctx: &PropertyContext<'_>, _target: &dyn PropertyAccess, property: &str) -> bool {
        DISPLAY_MODES.contains_key(property)
    }

    fn extract(
        &self,
        _ctx: &PropertyContext<'_>,
        target: &dyn PropertyAccess,
        property: &str,
    ) -> Result<Option<Json>, HandlerError> {
        let Some(value) = target.get_property(property) else {
            return Ok(None);
        };
        if let HostValue::Text(name) = value {
            return Ok(Some(Json::String(name)));
        }
        let index = value
            .as_i64()
            .ok_or_else(|| HandlerError::invalid(property, "host value is not an enum index"))?;
        let members = Self::members(property).unwrap_or_default();
        Ok(Some(match usize::try_from(index).ok().and_then(|i| members.get(i)) {
            Some(name) => Json::String(name.to_string()),
            // Unknown members survive as their index
            None => Json::from(index),
        }))
    }

    fn apply(
        &self,
        _ctx: &PropertyContext<'_>,
        target: &mut dyn PropertyAccess,
        property: &str,
        value: &Json,
    ) -> Result<(), HandlerError> {
        let members = Self::members(property).unwrap_or_default();
        let index = match value {
            Json::String(s) => match members.iter().position(|m| m.eq_ignore_ascii_case(s.trim())) {
                Some(i) => i as i64,
                None => json_to_i64(value)
                    .ok_or_else(|| HandlerError::invalid(property, format!("unknown member {s:?}")))?,
            },
            _ => json_to_i64(value).ok_or_else(|| HandlerError::invalid(property, "expected a name or index"))?,
        };
        let host = match target.get_property(property) {
            Some(HostValue::Text(_)) => match usize::try_from(index).ok().and_then(|i| members.get(i)) {
                Some(name) => HostValue::Text(name.to_string()),
                None => return Err(HandlerError::invalid(property, format!("no member at index {index}"))),
            },
            _ => HostValue::Integer(index),
        };
        target.set_property(property, host)?;
        Ok(())
    }
}
