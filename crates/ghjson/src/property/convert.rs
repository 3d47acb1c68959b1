//! Host value ⇄ JSON conversion.
//!
//! Outgoing values pick their JSON shape from the [`HostValue`] variant.
//! Incoming JSON is shaped by the property's current value (the hint), so a
//! property that holds an integer is set from `3`, `3.0` or `"3"` alike.

use serde_json::{Map, Value as Json};

use crate::codec::registry::CodecRegistry;
use crate::codec::tree::{looks_like_tree, Leaf, TreeCodec};
use crate::error::HandlerError;
use crate::model::{Color, FontSpec, HostValue, TypedValue};
use crate::util::parse_number;

// =============================================================================
// ENCODING
// =============================================================================

/// Converts a host value to JSON.
pub fn host_to_json(codecs: &CodecRegistry, value: &HostValue) -> Json {
    match value {
        HostValue::Null => Json::Null,
        HostValue::Bool(b) => Json::Bool(*b),
        HostValue::Integer(i) => Json::from(*i),
        HostValue::Number(n) => number_to_json(codecs, *n),
        HostValue::Text(s) => Json::String(s.clone()),
        HostValue::Value(value) => typed_to_json(codecs, value),
        HostValue::Font(font) => font_to_json(font),
        HostValue::Tree(tree) => TreeCodec::new(codecs).flatten_values(tree),
        HostValue::List(items) => Json::Array(items.iter().map(|v| host_to_json(codecs, v)).collect()),
        HostValue::Record(fields) => {
            let mut map = Map::with_capacity(fields.len());
            for (name, value) in fields {
                map.insert(name.clone(), host_to_json(codecs, value));
            }
            Json::Object(map)
        }
    }
}

/// Converts a typed value to JSON: native literal for primitives, prefixed
/// string otherwise. Text that would read back as an encoded value is
/// escaped with the text prefix.
pub fn typed_to_json(codecs: &CodecRegistry, value: &TypedValue) -> Json {
    TreeCodec::new(codecs).encode_leaf(&Leaf::Value(value.clone()))
}

fn number_to_json(codecs: &CodecRegistry, n: f64) -> Json {
    typed_to_json(codecs, &TypedValue::Number(n))
}

fn font_to_json(font: &FontSpec) -> Json {
    serde_json::to_value(font).unwrap_or(Json::Null)
}

// =============================================================================
// DECODING
// =============================================================================

/// Converts JSON to a host value shaped like `hint`.
///
/// With no hint (or a `Null` hint) the JSON shape alone decides.
pub fn json_to_host(
    codecs: &CodecRegistry,
    property: &str,
    json: &Json,
    hint: Option<&HostValue>,
) -> Result<HostValue, HandlerError> {
    let hint = match hint {
        Some(HostValue::Null) | None => return json_to_host_untyped(codecs, property, json),
        Some(hint) => hint,
    };
    match hint {
        HostValue::Bool(_) => json_to_bool(json)
            .map(HostValue::Bool)
            .ok_or_else(|| HandlerError::invalid(property, "expected a boolean")),
        HostValue::Integer(_) => json_to_i64(json)
            .map(HostValue::Integer)
            .ok_or_else(|| HandlerError::invalid(property, "expected an integer")),
        HostValue::Number(_) => json_to_f64(codecs, json)
            .map(HostValue::Number)
            .ok_or_else(|| HandlerError::invalid(property, "expected a number")),
        HostValue::Text(_) => match json {
            Json::String(s) => Ok(HostValue::Text(s.clone())),
            Json::Number(n) => Ok(HostValue::Text(n.to_string())),
            Json::Bool(b) => Ok(HostValue::Text(b.to_string())),
            Json::Null => Ok(HostValue::Text(String::new())),
            _ => Err(HandlerError::invalid(property, "expected text")),
        },
        HostValue::Value(current) => json_to_typed(codecs, property, json, current).map(HostValue::Value),
        HostValue::Font(_) => json_to_font(property, json).map(HostValue::Font),
        HostValue::Tree(_) => match json {
            Json::Null => Ok(HostValue::Tree(Default::default())),
            _ => Ok(HostValue::Tree(TreeCodec::new(codecs).unflatten_values(json)?)),
        },
        HostValue::List(current) => match json {
            Json::Array(items) => {
                let item_hint = current.first();
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(json_to_host(codecs, property, item, item_hint)?);
                }
                Ok(HostValue::List(out))
            }
            _ => Err(HandlerError::invalid(property, "expected an array")),
        },
        HostValue::Record(current) => match json {
            Json::Object(map) => {
                let mut fields = Vec::with_capacity(map.len());
                for (name, value) in map {
                    let field_hint = current.iter().find(|(k, _)| k == name).map(|(_, v)| v);
                    fields.push((name.clone(), json_to_host(codecs, property, value, field_hint)?));
                }
                Ok(HostValue::Record(fields))
            }
            _ => Err(HandlerError::invalid(property, "expected an object")),
        },
        HostValue::Null => json_to_host_untyped(codecs, property, json),
    }
}

/// Converts JSON to a host value from its shape alone.
pub fn json_to_host_untyped(codecs: &CodecRegistry, property: &str, json: &Json) -> Result<HostValue, HandlerError> {
    Ok(match json {
        Json::Null => HostValue::Null,
        Json::Bool(b) => HostValue::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => HostValue::Integer(i),
            None => HostValue::Number(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) if codecs.is_encoded(s) => HostValue::Value(codecs.decode(s)?),
        Json::String(s) => HostValue::Text(s.clone()),
        Json::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(json_to_host_untyped(codecs, property, item)?);
            }
            HostValue::List(out)
        }
        Json::Object(_) if looks_like_tree(json) => HostValue::Tree(TreeCodec::new(codecs).unflatten_values(json)?),
        Json::Object(map) => {
            let mut fields = Vec::with_capacity(map.len());
            for (name, value) in map {
                fields.push((name.clone(), json_to_host_untyped(codecs, property, value)?));
            }
            HostValue::Record(fields)
        }
    })
}

fn json_to_typed(
    codecs: &CodecRegistry,
    property: &str,
    json: &Json,
    current: &TypedValue,
) -> Result<TypedValue, HandlerError> {
    let decoded = match json {
        Json::String(s) if codecs.is_encoded(s) => codecs.decode(s)?,
        Json::Object(_) => serde_json::from_value::<TypedValue>(json.clone())
            .map_err(|err| HandlerError::invalid(property, err.to_string()))?,
        other => TypedValue::from_native_json(other)
            .ok_or_else(|| HandlerError::invalid(property, "expected an encoded value"))?,
    };
    if decoded.kind() == current.kind() {
        return Ok(decoded);
    }
    // Primitive kinds convert among themselves
    match (current, &decoded) {
        (TypedValue::Number(_), other) => other
            .as_f64()
            .map(TypedValue::Number)
            .ok_or_else(|| HandlerError::invalid(property, "expected a number")),
        (TypedValue::Integer(_), TypedValue::Number(n)) if n.fract() == 0.0 => Ok(TypedValue::Integer(*n as i64)),
        (TypedValue::Text(_), TypedValue::Integer(i)) => Ok(TypedValue::Text(i.to_string())),
        (TypedValue::Text(_), TypedValue::Number(n)) => Ok(TypedValue::Text(n.to_string())),
        _ => Err(HandlerError::invalid(
            property,
            format!("expected a {} value, found {}", current.kind(), decoded.kind()),
        )),
    }
}

/// Reads a boolean from `true`, `"true"` or `1`/`0`.
pub fn json_to_bool(json: &Json) -> Option<bool> {
    match json {
        Json::Bool(b) => Some(*b),
        Json::String(s) if s.trim().eq_ignore_ascii_case("true") => Some(true),
        Json::String(s) if s.trim().eq_ignore_ascii_case("false") => Some(false),
        Json::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        _ => None,
    }
}

/// Reads an integer from `3`, `3.0` or `"3"`.
pub fn json_to_i64(json: &Json) -> Option<i64> {
    match json {
        Json::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15).map(|f| f as i64)),
        Json::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Reads a float from a number, a numeric string or a `number:` value.
pub fn json_to_f64(codecs: &CodecRegistry, json: &Json) -> Option<f64> {
    match json {
        Json::Number(n) => n.as_f64(),
        Json::String(s) if codecs.is_encoded(s) => codecs.decode(s).ok()?.as_f64(),
        Json::String(s) => parse_number(s),
        _ => None,
    }
}

/// Reads a font from `{family, size, style}` or `"Family;Size;Style"`.
pub fn json_to_font(property: &str, json: &Json) -> Result<FontSpec, HandlerError> {
    match json {
        Json::Object(_) => {
            serde_json::from_value(json.clone()).map_err(|err| HandlerError::invalid(property, err.to_string()))
        }
        Json::String(s) => s.parse::<FontSpec>().map_err(|reason| HandlerError::invalid(property, reason)),
        _ => Err(HandlerError::invalid(property, "expected a font object or Family;Size;Style")),
    }
}

/// Reads a color from any accepted spelling.
///
/// Accepts `argb:a,r,g,b`, `#RRGGBB`, `#AARRGGBB`, `r,g,b`, `a,r,g,b` and
/// `{a, r, g, b}` objects (alpha optional).
pub fn json_to_color(codecs: &CodecRegistry, property: &str, json: &Json) -> Result<Color, HandlerError> {
    match json {
        Json::String(s) if codecs.is_encoded(s) => match codecs.decode(s)? {
            TypedValue::Color(c) => Ok(c),
            other => Err(HandlerError::invalid(property, format!("expected a color, found {}", other.kind()))),
        },
        Json::String(s) => parse_color_text(s).ok_or_else(|| HandlerError::invalid(property, "unrecognized color")),
        Json::Object(map) => {
            let channel = |key: &str, default: Option<u8>| -> Result<u8, HandlerError> {
                match map.get(key) {
                    Some(v) => v
                        .as_u64()
                        .and_then(|n| u8::try_from(n).ok())
                        .ok_or_else(|| HandlerError::invalid(property, "channel must be in 0..=255")),
                    None => default.ok_or_else(|| HandlerError::invalid(property, "missing color channel")),
                }
            };
            Ok(Color::argb(
                channel("a", Some(255))?,
                channel("r", None)?,
                channel("g", None)?,
                channel("b", None)?,
            ))
        }
        _ => Err(HandlerError::invalid(property, "expected a color")),
    }
}

fn parse_color_text(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return match hex.len() {
            6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Color::argb(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        };
    }
    let channels: Vec<u8> = s
        .split(',')
        .map(|c| c.trim().parse::<u8>().ok())
        .collect::<Option<Vec<u8>>>()?;
    match channels.as_slice() {
        [r, g, b] => Some(Color::rgb(*r, *g, *b)),
        [a, r, g, b] => Some(Color::argb(*a, *r, *g, *b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::{DataTree, GhPath};

    #[test]
    fn test_host_to_json_shapes() {
        let codecs = CodecRegistry::with_builtins();
        assert_eq!(host_to_json(&codecs, &HostValue::Integer(3)), json!(3));
        assert_eq!(
            host_to_json(&codecs, &HostValue::Value(TypedValue::Color(Color::argb(255, 1, 2, 3)))),
            json!("argb:255,1,2,3")
        );
        assert_eq!(
            host_to_json(&codecs, &HostValue::Font(FontSpec::new("Arial", 8.0, "Bold"))),
            json!({"family": "Arial", "size": 8.0, "style": "Bold"})
        );
        assert_eq!(host_to_json(&codecs, &HostValue::Number(f64::NAN)), json!("number:NaN"));
        let record = HostValue::Record(vec![("name".into(), "One".into()), ("selected".into(), true.into())]);
        assert_eq!(host_to_json(&codecs, &record), json!({"name": "One", "selected": true}));
    }

    #[test]
    fn test_hint_shapes_incoming_value() {
        let codecs = CodecRegistry::with_builtins();
        let int_hint = HostValue::Integer(0);
        assert_eq!(json_to_host(&codecs, "p", &json!(3.0), Some(&int_hint)).unwrap(), HostValue::Integer(3));
        assert_eq!(json_to_host(&codecs, "p", &json!("4"), Some(&int_hint)).unwrap(), HostValue::Integer(4));
        assert!(json_to_host(&codecs, "p", &json!(3.5), Some(&int_hint)).is_err());

        let bool_hint = HostValue::Bool(false);
        assert_eq!(json_to_host(&codecs, "p", &json!("True"), Some(&bool_hint)).unwrap(), HostValue::Bool(true));

        let text_hint = HostValue::Text(String::new());
        assert_eq!(
            json_to_host(&codecs, "p", &json!("argb:1,2,3,4"), Some(&text_hint)).unwrap(),
            HostValue::Text("argb:1,2,3,4".into())
        );
    }

    #[test]
    fn test_tree_hint() {
        let codecs = CodecRegistry::with_builtins();
        let hint = HostValue::Tree(DataTree::new());
        let value = json_to_host(&codecs, "persistentData", &json!({"{0}": {"{0}(0)": 1}}), Some(&hint)).unwrap();
        let mut expected = DataTree::new();
        expected.append(GhPath::new(vec![0]), TypedValue::Integer(1));
        assert_eq!(value, HostValue::Tree(expected));
    }

    #[test]
    fn test_untyped_decodes_prefixed_strings() {
        let codecs = CodecRegistry::with_builtins();
        assert_eq!(
            json_to_host(&codecs, "p", &json!("pointXYZ:1,2,3"), None).unwrap(),
            HostValue::Value(TypedValue::Point(crate::model::Point3::new(1.0, 2.0, 3.0)))
        );
        assert_eq!(json_to_host(&codecs, "p", &json!("plain"), None).unwrap(), HostValue::Text("plain".into()));
        assert!(json_to_host(&codecs, "p", &json!("argb:bad"), None).is_err());
    }

    #[test]
    fn test_color_spellings() {
        let codecs = CodecRegistry::with_builtins();
        let expected = Color::argb(255, 128, 64, 255);
        for input in [
            json!("argb:255,128,64,255"),
            json!("#8040FF"),
            json!("#FF8040ff"),
            json!("128,64,255"),
            json!("255, 128, 64, 255"),
            json!({"r": 128, "g": 64, "b": 255}),
        ] {
            assert_eq!(json_to_color(&codecs, "color", &input).unwrap(), expected, "{input}");
        }
        assert!(json_to_color(&codecs, "color", &json!("#12345")).is_err());
        assert!(json_to_color(&codecs, "color", &json!("pointXYZ:1,2,3")).is_err());
        assert!(json_to_color(&codecs, "color", &json!("300,0,0")).is_err());
    }

    #[test]
    fn test_font_spellings() {
        let expected = FontSpec::new("Consolas", 10.0, "Regular");
        assert_eq!(json_to_font("font", &json!({"family": "Consolas", "size": 10})).unwrap(), expected);
        assert_eq!(json_to_font("font", &json!("Consolas;10;Regular")).unwrap(), expected);
        assert!(json_to_font("font", &json!(10)).is_err());
    }
}
