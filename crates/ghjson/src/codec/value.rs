//! Built-in payload grammars.
//!
//! Each built-in [`ValueKind`] has one payload grammar:
//!
//! | Kind      | Payload                                   |
//! |-----------|-------------------------------------------|
//! | Text      | raw text                                  |
//! | Number    | `v`                                       |
//! | Integer   | `i`                                       |
//! | Boolean   | `true` / `false`                          |
//! | Color     | `a,r,g,b`                                 |
//! | Point     | `x,y,z`                                   |
//! | Vector    | `x,y,z`                                   |
//! | Line      | `x,y,z;x,y,z`                             |
//! | Plane     | `origin;xaxis;yaxis`                      |
//! | Circle    | `center;normal;radius;start`              |
//! | Arc       | `start;interior;end`                      |
//! | Box       | `origin;xaxis;yaxis;x0,x1;y0,y1;z0,z1`    |
//! | Rectangle | `center;xaxis;yaxis;WxH`                  |
//! | Interval  | `a<b`                                     |
//! | Bounds    | `WxH`                                     |
//!
//! The delimiters are part of the wire format.

use crate::codec::primitives::{PayloadReader, PayloadWriter, GROUP_SEPARATOR};
use crate::codec::registry::ValueCodec;
use crate::error::CodecError;
use crate::model::{
    Bounds, Circle, CircularArc, Color, Interval, Line, OrientedBox, Plane, Rectangle, TypedValue,
    ValueKind,
};

/// Separator between interval bounds.
pub const INTERVAL_SEPARATOR: char = '<';

/// Separator between width and height.
pub const EXTENT_SEPARATOR: char = 'x';

// =============================================================================
// ENCODING
// =============================================================================

/// Encodes the payload of a built-in value (without the prefix).
///
/// Returns `UnsupportedType` for externally registered kinds.
pub fn encode_payload(value: &TypedValue) -> Result<String, CodecError> {
    let mut w = PayloadWriter::with_capacity(32);
    match value {
        TypedValue::Text(s) => {
            w.text(s);
        }
        TypedValue::Number(n) => {
            w.number(*n);
        }
        TypedValue::Integer(i) => {
            w.integer(*i);
        }
        TypedValue::Boolean(b) => {
            w.text(if *b { "true" } else { "false" });
        }
        TypedValue::Color(c) => {
            w.text(&format!("{},{},{},{}", c.a, c.r, c.g, c.b));
        }
        TypedValue::Point(p) => {
            w.point(p);
        }
        TypedValue::Vector(v) => {
            w.vector(v);
        }
        TypedValue::Line(line) => {
            w.point(&line.from).sep(GROUP_SEPARATOR).point(&line.to);
        }
        TypedValue::Plane(plane) => {
            write_plane(&mut w, plane);
        }
        TypedValue::Circle(circle) => {
            w.point(&circle.center)
                .sep(GROUP_SEPARATOR)
                .vector(&circle.normal)
                .sep(GROUP_SEPARATOR)
                .number(circle.radius)
                .sep(GROUP_SEPARATOR)
                .point(&circle.start);
        }
        TypedValue::Arc(arc) => {
            w.point(&arc.start)
                .sep(GROUP_SEPARATOR)
                .point(&arc.interior)
                .sep(GROUP_SEPARATOR)
                .point(&arc.end);
        }
        TypedValue::Box(b) => {
            write_plane(&mut w, &b.plane);
            for domain in [&b.x, &b.y, &b.z] {
                w.sep(GROUP_SEPARATOR).numbers(&[domain.start, domain.end]);
            }
        }
        TypedValue::Rectangle(rect) => {
            w.point(&rect.center)
                .sep(GROUP_SEPARATOR)
                .vector(&rect.x_axis)
                .sep(GROUP_SEPARATOR)
                .vector(&rect.y_axis)
                .sep(GROUP_SEPARATOR)
                .number(rect.width)
                .sep(EXTENT_SEPARATOR)
                .number(rect.height);
        }
        TypedValue::Interval(interval) => {
            w.number(interval.start).sep(INTERVAL_SEPARATOR).number(interval.end);
        }
        TypedValue::Bounds(bounds) => {
            w.number(bounds.width).sep(EXTENT_SEPARATOR).number(bounds.height);
        }
        TypedValue::Custom(custom) => {
            return Err(CodecError::UnsupportedType {
                kind: custom.kind.clone(),
            });
        }
    }
    Ok(w.into_string())
}

fn write_plane(w: &mut PayloadWriter, plane: &Plane) {
    w.point(&plane.origin)
        .sep(GROUP_SEPARATOR)
        .vector(&plane.x_axis)
        .sep(GROUP_SEPARATOR)
        .vector(&plane.y_axis);
}

// =============================================================================
// DECODING
// =============================================================================

/// Decodes the payload of a built-in kind.
pub fn decode_payload(kind: &ValueKind, payload: &str) -> Result<TypedValue, CodecError> {
    let r = PayloadReader::new(kind.name(), payload);
    let value = match kind {
        ValueKind::Text => TypedValue::Text(payload.to_string()),
        ValueKind::Number => TypedValue::Number(r.number(payload)?),
        ValueKind::Integer => TypedValue::Integer(r.integer(payload)?),
        ValueKind::Boolean => {
            let token = payload.trim();
            if token.eq_ignore_ascii_case("true") {
                TypedValue::Boolean(true)
            } else if token.eq_ignore_ascii_case("false") {
                TypedValue::Boolean(false)
            } else {
                return Err(r.error("expected true or false"));
            }
        }
        ValueKind::Color => {
            let parts = r.split_exact(payload, ',', 4)?;
            TypedValue::Color(Color::argb(
                r.byte(parts[0])?,
                r.byte(parts[1])?,
                r.byte(parts[2])?,
                r.byte(parts[3])?,
            ))
        }
        ValueKind::Point => TypedValue::Point(r.point(payload)?),
        ValueKind::Vector => TypedValue::Vector(r.vector(payload)?),
        ValueKind::Line => {
            let g = r.groups(2)?;
            TypedValue::Line(Line {
                from: r.point(g[0])?,
                to: r.point(g[1])?,
            })
        }
        ValueKind::Plane => {
            let g = r.groups(3)?;
            TypedValue::Plane(read_plane(&r, &g)?)
        }
        ValueKind::Circle => {
            let g = r.groups(4)?;
            TypedValue::Circle(Circle {
                center: r.point(g[0])?,
                normal: r.vector(g[1])?,
                radius: r.number(g[2])?,
                start: r.point(g[3])?,
            })
        }
        ValueKind::Arc => {
            let g = r.groups(3)?;
            TypedValue::Arc(CircularArc {
                start: r.point(g[0])?,
                interior: r.point(g[1])?,
                end: r.point(g[2])?,
            })
        }
        ValueKind::Box => {
            let g = r.groups(6)?;
            let plane = read_plane(&r, &g[..3])?;
            let [x0, x1] = r.numbers::<2>(g[3])?;
            let [y0, y1] = r.numbers::<2>(g[4])?;
            let [z0, z1] = r.numbers::<2>(g[5])?;
            TypedValue::Box(OrientedBox {
                plane,
                x: Interval::new(x0, x1),
                y: Interval::new(y0, y1),
                z: Interval::new(z0, z1),
            })
        }
        ValueKind::Rectangle => {
            let g = r.groups(4)?;
            let (w, h) = r.pair(g[3], EXTENT_SEPARATOR)?;
            TypedValue::Rectangle(Rectangle {
                center: r.point(g[0])?,
                x_axis: r.vector(g[1])?,
                y_axis: r.vector(g[2])?,
                width: r.number(w)?,
                height: r.number(h)?,
            })
        }
        ValueKind::Interval => {
            let (a, b) = r.pair(payload, INTERVAL_SEPARATOR)?;
            TypedValue::Interval(Interval::new(r.number(a)?, r.number(b)?))
        }
        ValueKind::Bounds => {
            let (w, h) = r.pair(payload, EXTENT_SEPARATOR)?;
            TypedValue::Bounds(Bounds {
                width: r.number(w)?,
                height: r.number(h)?,
            })
        }
        ValueKind::Custom(name) => {
            return Err(CodecError::UnsupportedType { kind: name.clone() });
        }
    };
    Ok(value)
}

fn read_plane(r: &PayloadReader<'_>, groups: &[&str]) -> Result<Plane, CodecError> {
    Ok(Plane {
        origin: r.point(groups[0])?,
        x_axis: r.vector(groups[1])?,
        y_axis: r.vector(groups[2])?,
    })
}

// =============================================================================
// CODEC
// =============================================================================

/// Codec for one built-in kind under its canonical prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinCodec {
    kind: ValueKind,
    prefix: &'static str,
}

impl BuiltinCodec {
    /// Returns the codec for a built-in kind, or `None` for custom kinds.
    pub fn new(kind: ValueKind) -> Option<Self> {
        let prefix = kind.canonical_prefix()?;
        Some(Self { kind, prefix })
    }

    /// Codecs for every built-in kind.
    pub fn all() -> impl Iterator<Item = BuiltinCodec> {
        ValueKind::BUILTIN.into_iter().filter_map(BuiltinCodec::new)
    }
}

impl ValueCodec for BuiltinCodec {
    fn kind(&self) -> ValueKind {
        self.kind.clone()
    }

    fn prefix(&self) -> &str {
        self.prefix
    }

    fn encode_payload(&self, value: &TypedValue) -> Result<String, CodecError> {
        if value.kind() != self.kind {
            return Err(CodecError::UnsupportedType {
                kind: value.kind().name().to_string(),
            });
        }
        encode_payload(value)
    }

    fn decode_payload(&self, payload: &str) -> Result<TypedValue, CodecError> {
        decode_payload(&self.kind, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Point3, Vector3};

    fn roundtrip(value: TypedValue) -> String {
        let payload = encode_payload(&value).unwrap();
        let back = decode_payload(&value.kind(), &payload).unwrap();
        assert_eq!(back, value, "payload {payload}");
        payload
    }

    #[test]
    fn test_color_grammar() {
        assert_eq!(roundtrip(TypedValue::Color(Color::argb(255, 128, 64, 255))), "255,128,64,255");
        assert_eq!(roundtrip(TypedValue::Color(Color::argb(0, 0, 0, 0))), "0,0,0,0");
    }

    #[test]
    fn test_geometry_grammars() {
        let p = Point3::new(1.0, -2.5, 0.0);
        let q = Point3::new(4.0, 5.0, 6.0);
        let z = Vector3::new(0.0, 0.0, 1.0);

        assert_eq!(roundtrip(TypedValue::Point(p)), "1,-2.5,0");
        assert_eq!(roundtrip(TypedValue::Line(Line { from: p, to: q })), "1,-2.5,0;4,5,6");
        assert_eq!(roundtrip(TypedValue::Plane(Plane::world_xy())), "0,0,0;1,0,0;0,1,0");
        assert_eq!(
            roundtrip(TypedValue::Circle(Circle {
                center: p,
                normal: z,
                radius: 2.0,
                start: q,
            })),
            "1,-2.5,0;0,0,1;2;4,5,6"
        );
        assert_eq!(
            roundtrip(TypedValue::Arc(CircularArc {
                start: p,
                interior: q,
                end: p,
            })),
            "1,-2.5,0;4,5,6;1,-2.5,0"
        );
        assert_eq!(
            roundtrip(TypedValue::Box(OrientedBox {
                plane: Plane::world_xy(),
                x: Interval::new(0.0, 1.0),
                y: Interval::new(-1.0, 1.0),
                z: Interval::new(0.0, 0.5),
            })),
            "0,0,0;1,0,0;0,1,0;0,1;-1,1;0,0.5"
        );
        assert_eq!(
            roundtrip(TypedValue::Rectangle(Rectangle {
                center: p,
                x_axis: Vector3::new(1.0, 0.0, 0.0),
                y_axis: Vector3::new(0.0, 1.0, 0.0),
                width: 3.0,
                height: 4.0,
            })),
            "1,-2.5,0;1,0,0;0,1,0;3x4"
        );
        assert_eq!(roundtrip(TypedValue::Interval(Interval::new(10.0, -2.0))), "10<-2");
        assert_eq!(roundtrip(TypedValue::Bounds(Bounds { width: 1.5, height: 2.0 })), "1.5x2");
    }

    #[test]
    fn test_scalar_grammars() {
        assert_eq!(roundtrip(TypedValue::Text(String::new())), "");
        assert_eq!(roundtrip(TypedValue::Text("a:b;c".into())), "a:b;c");
        assert_eq!(roundtrip(TypedValue::Number(-0.5)), "-0.5");
        assert_eq!(roundtrip(TypedValue::Integer(i64::MIN)), i64::MIN.to_string());
        assert_eq!(roundtrip(TypedValue::Boolean(false)), "false");
        assert_eq!(
            decode_payload(&ValueKind::Boolean, "True").unwrap(),
            TypedValue::Boolean(true)
        );
    }

    #[test]
    fn test_malformed_payloads() {
        let cases: &[(ValueKind, &str)] = &[
            (ValueKind::Color, "255,128,64"),
            (ValueKind::Color, "255,128,64,256"),
            (ValueKind::Color, "255,128,64,-1"),
            (ValueKind::Point, "1,2,3,4"),
            (ValueKind::Point, "1,2,abc"),
            (ValueKind::Line, "1,2,3"),
            (ValueKind::Interval, "1,2"),
            (ValueKind::Interval, "1<2<3"),
            (ValueKind::Bounds, "12"),
            (ValueKind::Number, "1,5"),
            (ValueKind::Integer, "1.5"),
            (ValueKind::Boolean, "yes"),
            (ValueKind::Rectangle, "0,0,0;1,0,0;0,1,0;3"),
        ];
        for (kind, payload) in cases {
            let err = decode_payload(kind, payload).unwrap_err();
            assert!(
                matches!(err, CodecError::MalformedPayload { .. }),
                "{kind} {payload:?}: {err}"
            );
        }
    }

    #[test]
    fn test_builtin_codec_rejects_other_kinds() {
        let codec = BuiltinCodec::new(ValueKind::Point).unwrap();
        assert_eq!(codec.prefix(), "pointXYZ");
        assert!(codec.encode_payload(&TypedValue::Number(1.0)).is_err());
        assert!(BuiltinCodec::new(ValueKind::Custom("mesh".into())).is_none());
        assert_eq!(BuiltinCodec::all().count(), ValueKind::BUILTIN.len());
    }
}
