//! Typed scalar and geometric values.
//!
//! A [`TypedValue`] is what a prefixed string decodes to. Each variant has
//! exactly one [`ValueKind`] and the kind selects the codec.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic kind of a typed value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    Text,
    Number,
    Integer,
    Boolean,
    Color,
    Point,
    Vector,
    Line,
    Plane,
    Circle,
    Arc,
    Box,
    Rectangle,
    Interval,
    Bounds,
    /// Kind contributed by an externally registered codec.
    Custom(String),
}

impl ValueKind {
    /// All built-in kinds, in wire-table order.
    pub const BUILTIN: [ValueKind; 15] = [
        ValueKind::Text,
        ValueKind::Number,
        ValueKind::Integer,
        ValueKind::Boolean,
        ValueKind::Color,
        ValueKind::Point,
        ValueKind::Vector,
        ValueKind::Line,
        ValueKind::Plane,
        ValueKind::Circle,
        ValueKind::Arc,
        ValueKind::Box,
        ValueKind::Rectangle,
        ValueKind::Interval,
        ValueKind::Bounds,
    ];

    /// Returns the canonical prefix of a built-in kind.
    pub fn canonical_prefix(&self) -> Option<&'static str> {
        Some(match self {
            ValueKind::Text => "text",
            ValueKind::Number => "number",
            ValueKind::Integer => "integer",
            ValueKind::Boolean => "boolean",
            ValueKind::Color => "argb",
            ValueKind::Point => "pointXYZ",
            ValueKind::Vector => "vectorXYZ",
            ValueKind::Line => "line2p",
            ValueKind::Plane => "planeOXY",
            ValueKind::Circle => "circleCNRS",
            ValueKind::Arc => "arc3P",
            ValueKind::Box => "boxOXY",
            ValueKind::Rectangle => "rectangleCXY",
            ValueKind::Interval => "interval",
            ValueKind::Bounds => "bounds",
            ValueKind::Custom(_) => return None,
        })
    }

    /// Returns true for kinds that have a native JSON literal form.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            ValueKind::Text | ValueKind::Number | ValueKind::Integer | ValueKind::Boolean
        )
    }

    /// Human-readable kind name.
    pub fn name(&self) -> &str {
        match self {
            ValueKind::Text => "text",
            ValueKind::Number => "number",
            ValueKind::Integer => "integer",
            ValueKind::Boolean => "boolean",
            ValueKind::Color => "color",
            ValueKind::Point => "point",
            ValueKind::Vector => "vector",
            ValueKind::Line => "line",
            ValueKind::Plane => "plane",
            ValueKind::Circle => "circle",
            ValueKind::Arc => "arc",
            ValueKind::Box => "box",
            ValueKind::Rectangle => "rectangle",
            ValueKind::Interval => "interval",
            ValueKind::Bounds => "bounds",
            ValueKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 8-bit ARGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// Opaque color from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { a: 255, r, g, b }
    }
}

/// Location in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Direction and magnitude in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Straight segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Line {
    pub from: Point3,
    pub to: Point3,
}

/// Plane given by origin and in-plane axes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Plane {
    pub origin: Point3,
    pub x_axis: Vector3,
    pub y_axis: Vector3,
}

impl Plane {
    /// The world XY plane.
    pub const fn world_xy() -> Self {
        Self {
            origin: Point3::new(0.0, 0.0, 0.0),
            x_axis: Vector3::new(1.0, 0.0, 0.0),
            y_axis: Vector3::new(0.0, 1.0, 0.0),
        }
    }
}

/// Circle given by center, normal, radius and seam start point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point3,
    pub normal: Vector3,
    pub radius: f64,
    pub start: Point3,
}

/// Circular arc through three points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CircularArc {
    pub start: Point3,
    pub interior: Point3,
    pub end: Point3,
}

/// Numeric domain. `start` may exceed `end` (decreasing domain).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

/// Box oriented by a plane, with one domain per plane axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrientedBox {
    pub plane: Plane,
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

/// Rectangle centered on a point with explicit axes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rectangle {
    pub center: Point3,
    pub x_axis: Vector3,
    pub y_axis: Vector3,
    pub width: f64,
    pub height: f64,
}

/// 2D extent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

/// Value owned by an externally registered codec.
///
/// The payload is opaque to the engine; only the codec registered for `kind`
/// knows how to turn it into text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomValue {
    pub kind: String,
    pub payload: serde_json::Value,
}

/// A value with a declared semantic kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum TypedValue {
    Text(String),
    Number(f64),
    Integer(i64),
    Boolean(bool),
    Color(Color),
    Point(Point3),
    Vector(Vector3),
    Line(Line),
    Plane(Plane),
    Circle(Circle),
    Arc(CircularArc),
    Box(OrientedBox),
    Rectangle(Rectangle),
    Interval(Interval),
    Bounds(Bounds),
    Custom(CustomValue),
}

impl TypedValue {
    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            TypedValue::Text(_) => ValueKind::Text,
            TypedValue::Number(_) => ValueKind::Number,
            TypedValue::Integer(_) => ValueKind::Integer,
            TypedValue::Boolean(_) => ValueKind::Boolean,
            TypedValue::Color(_) => ValueKind::Color,
            TypedValue::Point(_) => ValueKind::Point,
            TypedValue::Vector(_) => ValueKind::Vector,
            TypedValue::Line(_) => ValueKind::Line,
            TypedValue::Plane(_) => ValueKind::Plane,
            TypedValue::Circle(_) => ValueKind::Circle,
            TypedValue::Arc(_) => ValueKind::Arc,
            TypedValue::Box(_) => ValueKind::Box,
            TypedValue::Rectangle(_) => ValueKind::Rectangle,
            TypedValue::Interval(_) => ValueKind::Interval,
            TypedValue::Bounds(_) => ValueKind::Bounds,
            TypedValue::Custom(custom) => ValueKind::Custom(custom.kind.clone()),
        }
    }

    /// Returns the native JSON literal for primitive kinds.
    pub fn to_native_json(&self) -> Option<serde_json::Value> {
        match self {
            TypedValue::Text(s) => Some(serde_json::Value::String(s.clone())),
            TypedValue::Number(n) => Some(serde_json::Value::from(*n)),
            TypedValue::Integer(i) => Some(serde_json::Value::from(*i)),
            TypedValue::Boolean(b) => Some(serde_json::Value::Bool(*b)),
            _ => None,
        }
    }

    /// Reads a primitive value from a native JSON literal.
    ///
    /// Integers stay integers; every other number becomes `Number`.
    pub fn from_native_json(json: &serde_json::Value) -> Option<TypedValue> {
        match json {
            serde_json::Value::String(s) => Some(TypedValue::Text(s.clone())),
            serde_json::Value::Bool(b) => Some(TypedValue::Boolean(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(TypedValue::Integer(i))
                } else {
                    n.as_f64().map(TypedValue::Number)
                }
            }
            _ => None,
        }
    }

    /// Returns the color if this is a color value.
    pub fn as_color(&self) -> Option<Color> {
        match self {
            TypedValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns the value as a float for numeric kinds.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Number(n) => Some(*n),
            TypedValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        TypedValue::Text(value.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(value: String) -> Self {
        TypedValue::Text(value)
    }
}

impl From<f64> for TypedValue {
    fn from(value: f64) -> Self {
        TypedValue::Number(value)
    }
}

impl From<i64> for TypedValue {
    fn from(value: i64) -> Self {
        TypedValue::Integer(value)
    }
}

impl From<bool> for TypedValue {
    fn from(value: bool) -> Self {
        TypedValue::Boolean(value)
    }
}

impl From<Color> for TypedValue {
    fn from(value: Color) -> Self {
        TypedValue::Color(value)
    }
}

impl From<Point3> for TypedValue {
    fn from(value: Point3) -> Self {
        TypedValue::Point(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_kinds_have_prefixes() {
        for kind in ValueKind::BUILTIN.iter() {
            assert!(kind.canonical_prefix().is_some(), "{kind}");
        }
        assert!(ValueKind::Custom("mesh".into()).canonical_prefix().is_none());
    }

    #[test]
    fn test_native_json_integer_vs_number() {
        assert_eq!(
            TypedValue::from_native_json(&serde_json::json!(3)),
            Some(TypedValue::Integer(3))
        );
        assert_eq!(
            TypedValue::from_native_json(&serde_json::json!(3.5)),
            Some(TypedValue::Number(3.5))
        );
        assert_eq!(TypedValue::from_native_json(&serde_json::Value::Null), None);
    }

    #[test]
    fn test_number_native_json_keeps_float() {
        let json = TypedValue::Number(2.0).to_native_json().unwrap();
        assert!(json.is_f64());
        assert_eq!(TypedValue::from_native_json(&json), Some(TypedValue::Number(2.0)));
    }

    #[test]
    fn test_custom_kind() {
        let v = TypedValue::Custom(CustomValue {
            kind: "pointXY".into(),
            payload: serde_json::json!([1.0, 2.0]),
        });
        assert_eq!(v.kind(), ValueKind::Custom("pointXY".into()));
        assert_eq!(v.kind().name(), "pointXY");
    }
}
