//! Prefix ⇄ codec table.
//!
//! The registry maps each [`ValueKind`] to exactly one codec and each
//! lowercase prefix to exactly one kind. Lookups take a read lock and clone
//! the codec handle out, so codecs never run under the lock.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::codec::primitives::{is_valid_prefix, PREFIX_SEPARATOR};
use crate::codec::value::BuiltinCodec;
use crate::error::CodecError;
use crate::model::{TypedValue, ValueKind};

/// Encoder/decoder for one value kind.
pub trait ValueCodec: Send + Sync {
    /// Kind this codec owns.
    fn kind(&self) -> ValueKind;

    /// Canonical prefix, emitted verbatim on encode.
    fn prefix(&self) -> &str;

    /// Encodes the payload (the part after `prefix:`).
    fn encode_payload(&self, value: &TypedValue) -> Result<String, CodecError>;

    /// Decodes a payload.
    fn decode_payload(&self, payload: &str) -> Result<TypedValue, CodecError>;
}

type EncodeFn = dyn Fn(&TypedValue) -> Result<String, CodecError> + Send + Sync;
type DecodeFn = dyn Fn(&str) -> Result<TypedValue, CodecError> + Send + Sync;

/// Codec assembled from a `(prefix, encode, decode)` triple.
pub struct FnCodec {
    kind: ValueKind,
    prefix: String,
    encode: Box<EncodeFn>,
    decode: Box<DecodeFn>,
}

impl FnCodec {
    pub fn new<E, D>(kind: ValueKind, prefix: impl Into<String>, encode: E, decode: D) -> Self
    where
        E: Fn(&TypedValue) -> Result<String, CodecError> + Send + Sync + 'static,
        D: Fn(&str) -> Result<TypedValue, CodecError> + Send + Sync + 'static,
    {
        Self {
            kind,
            prefix: prefix.into(),
            encode: Box::new(encode),
            decode: Box::new(decode),
        }
    }
}

impl fmt::Debug for FnCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCodec")
            .field("kind", &self.kind)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl ValueCodec for FnCodec {
    fn kind(&self) -> ValueKind {
        self.kind.clone()
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn encode_payload(&self, value: &TypedValue) -> Result<String, CodecError> {
        (self.encode)(value)
    }

    fn decode_payload(&self, payload: &str) -> Result<TypedValue, CodecError> {
        (self.decode)(payload)
    }
}

#[derive(Default)]
struct CodecTable {
    by_kind: FxHashMap<ValueKind, Arc<dyn ValueCodec>>,
    /// Lowercase prefix to kind.
    by_prefix: FxHashMap<String, ValueKind>,
}

impl CodecTable {
    fn codec_for_prefix(&self, prefix: &str) -> Option<Arc<dyn ValueCodec>> {
        let kind = self.by_prefix.get(&prefix.to_ascii_lowercase())?;
        self.by_kind.get(kind).cloned()
    }

    fn remove_kind(&mut self, kind: &ValueKind) -> Option<Arc<dyn ValueCodec>> {
        let old = self.by_kind.remove(kind)?;
        self.by_prefix.remove(&old.prefix().to_ascii_lowercase());
        Some(old)
    }

    fn insert(&mut self, codec: Arc<dyn ValueCodec>) {
        let kind = codec.kind();
        self.by_prefix.insert(codec.prefix().to_ascii_lowercase(), kind.clone());
        self.by_kind.insert(kind, codec);
    }
}

/// Thread-safe registry of value codecs.
#[derive(Default)]
pub struct CodecRegistry {
    table: RwLock<CodecTable>,
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.read();
        let mut prefixes: Vec<&String> = table.by_prefix.keys().collect();
        prefixes.sort();
        f.debug_struct("CodecRegistry").field("prefixes", &prefixes).finish()
    }
}

impl CodecRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in codec.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        {
            let mut table = registry.table.write();
            for codec in BuiltinCodec::all() {
                table.insert(Arc::new(codec));
            }
        }
        registry
    }

    /// Registers a codec.
    ///
    /// Fails with `Conflict` if its kind or (case-insensitive) prefix is
    /// already taken. Use [`replace`](Self::replace) for intentional
    /// replacement.
    pub fn register(&self, codec: Arc<dyn ValueCodec>) -> Result<(), CodecError> {
        check_prefix(codec.as_ref())?;
        let mut table = self.table.write();
        let prefix = codec.prefix().to_ascii_lowercase();
        if let Some(owner) = table.by_prefix.get(&prefix) {
            return Err(CodecError::Conflict {
                prefix: codec.prefix().to_string(),
                kind: owner.name().to_string(),
            });
        }
        let kind = codec.kind();
        if let Some(existing) = table.by_kind.get(&kind) {
            return Err(CodecError::Conflict {
                prefix: existing.prefix().to_string(),
                kind: kind.name().to_string(),
            });
        }
        log::debug!("registered value codec {}:{}", codec.prefix(), kind);
        table.insert(codec);
        Ok(())
    }

    /// Registers a codec, replacing whatever owned its kind or its prefix.
    ///
    /// Returns the codec previously registered for the same kind.
    pub fn replace(&self, codec: Arc<dyn ValueCodec>) -> Result<Option<Arc<dyn ValueCodec>>, CodecError> {
        check_prefix(codec.as_ref())?;
        let mut table = self.table.write();
        let kind = codec.kind();
        let old = table.remove_kind(&kind);
        if let Some(other) = table.by_prefix.get(&codec.prefix().to_ascii_lowercase()).cloned() {
            table.remove_kind(&other);
        }
        log::debug!("replaced value codec for {}", kind);
        table.insert(codec);
        Ok(old)
    }

    /// Removes the codec for `kind`.
    pub fn unregister(&self, kind: &ValueKind) -> Option<Arc<dyn ValueCodec>> {
        self.table.write().remove_kind(kind)
    }

    /// Returns the codec for `kind`.
    pub fn codec(&self, kind: &ValueKind) -> Option<Arc<dyn ValueCodec>> {
        self.table.read().by_kind.get(kind).cloned()
    }

    /// Returns true if a codec exists for `kind`.
    pub fn supports(&self, kind: &ValueKind) -> bool {
        self.table.read().by_kind.contains_key(kind)
    }

    /// Returns the canonical prefix registered for `kind`.
    pub fn prefix_of(&self, kind: &ValueKind) -> Option<String> {
        self.codec(kind).map(|c| c.prefix().to_string())
    }

    /// Returns true if `prefix` (case-insensitive) is registered.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.table.read().by_prefix.contains_key(&prefix.to_ascii_lowercase())
    }

    /// Registered kinds, in no particular order.
    pub fn kinds(&self) -> Vec<ValueKind> {
        self.table.read().by_kind.keys().cloned().collect()
    }

    // =========================================================================
    // ENCODING
    // =========================================================================

    /// Encodes `value` as `prefix:payload`.
    pub fn encode(&self, value: &TypedValue) -> Result<String, CodecError> {
        let kind = value.kind();
        let codec = self.codec(&kind).ok_or_else(|| CodecError::UnsupportedType {
            kind: kind.name().to_string(),
        })?;
        let payload = codec.encode_payload(value)?;
        let mut out = String::with_capacity(codec.prefix().len() + 1 + payload.len());
        out.push_str(codec.prefix());
        out.push(PREFIX_SEPARATOR);
        out.push_str(&payload);
        Ok(out)
    }

    /// Encodes `value`, returning `None` if it cannot be encoded.
    ///
    /// Callers omit the field in that case.
    pub fn try_encode(&self, value: &TypedValue) -> Option<String> {
        match self.encode(value) {
            Ok(s) => Some(s),
            Err(err) => {
                log::debug!("omitting value: {}", err);
                None
            }
        }
    }

    // =========================================================================
    // DECODING
    // =========================================================================

    /// Decodes a `prefix:payload` string.
    pub fn decode(&self, s: &str) -> Result<TypedValue, CodecError> {
        let (prefix, payload) = s
            .split_once(PREFIX_SEPARATOR)
            .ok_or_else(|| CodecError::malformed("prefixed", s, "missing ':' after prefix"))?;
        let codec = self
            .table
            .read()
            .codec_for_prefix(prefix)
            .ok_or_else(|| CodecError::UnknownPrefix {
                prefix: prefix.to_string(),
            })?;
        codec.decode_payload(payload)
    }

    /// Returns true if `s` starts with a registered prefix.
    pub fn is_encoded(&self, s: &str) -> bool {
        match s.split_once(PREFIX_SEPARATOR) {
            Some((prefix, _)) => is_valid_prefix(prefix) && self.has_prefix(prefix),
            None => false,
        }
    }
}

fn check_prefix(codec: &dyn ValueCodec) -> Result<(), CodecError> {
    if is_valid_prefix(codec.prefix()) {
        Ok(())
    } else {
        Err(CodecError::malformed(
            "prefix",
            codec.prefix(),
            "prefix must be 1..=32 ASCII alphanumerics",
        ))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::{Color, CustomValue, Point3};

    fn point_xy_codec() -> FnCodec {
        FnCodec::new(
            ValueKind::Custom("pointXY".into()),
            "pointXY",
            |value| match value {
                TypedValue::Custom(c) => Ok(format!(
                    "{},{}",
                    c.payload[0].as_f64().unwrap_or(0.0),
                    c.payload[1].as_f64().unwrap_or(0.0)
                )),
                other => Err(CodecError::UnsupportedType {
                    kind: other.kind().to_string(),
                }),
            },
            |payload| {
                let (x, y) = payload
                    .split_once(',')
                    .ok_or_else(|| CodecError::malformed("pointXY", payload, "expected x,y"))?;
                let x: f64 = x.parse().map_err(|_| CodecError::malformed("pointXY", payload, "bad x"))?;
                let y: f64 = y.parse().map_err(|_| CodecError::malformed("pointXY", payload, "bad y"))?;
                Ok(TypedValue::Custom(CustomValue {
                    kind: "pointXY".into(),
                    payload: json!([x, y]),
                }))
            },
        )
    }

    #[test]
    fn test_encode_color_example() {
        let registry = CodecRegistry::with_builtins();
        let color = TypedValue::Color(Color::argb(255, 128, 64, 255));
        let encoded = registry.encode(&color).unwrap();
        assert_eq!(encoded, "argb:255,128,64,255");
        assert_eq!(registry.decode(&encoded).unwrap(), color);
    }

    #[test]
    fn test_prefix_case_insensitive() {
        let registry = CodecRegistry::with_builtins();
        let p = TypedValue::Point(Point3::new(1.0, 2.0, 3.0));
        assert_eq!(registry.decode("POINTXYZ:1,2,3").unwrap(), p);
        assert_eq!(registry.decode("pointxyz:1,2,3").unwrap(), p);
        assert_eq!(registry.encode(&p).unwrap(), "pointXYZ:1,2,3");
    }

    #[test]
    fn test_decode_failures() {
        let registry = CodecRegistry::with_builtins();
        assert_eq!(
            registry.decode("mesh:1,2"),
            Err(CodecError::UnknownPrefix { prefix: "mesh".into() })
        );
        assert!(matches!(
            registry.decode("no prefix here"),
            Err(CodecError::MalformedPayload { .. })
        ));
        assert!(matches!(
            registry.decode("argb:1,2,3"),
            Err(CodecError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn test_unsupported_kind() {
        let registry = CodecRegistry::with_builtins();
        let custom = TypedValue::Custom(CustomValue {
            kind: "pointXY".into(),
            payload: json!([1.0, 2.0]),
        });
        assert_eq!(
            registry.encode(&custom),
            Err(CodecError::UnsupportedType { kind: "pointXY".into() })
        );
        assert_eq!(registry.try_encode(&custom), None);
    }

    #[test]
    fn test_register_custom_codec() {
        let registry = CodecRegistry::with_builtins();
        registry.register(Arc::new(point_xy_codec())).unwrap();

        let value = TypedValue::Custom(CustomValue {
            kind: "pointXY".into(),
            payload: json!([1.5, 2.0]),
        });
        let encoded = registry.encode(&value).unwrap();
        assert_eq!(encoded, "pointXY:1.5,2");
        assert_eq!(registry.decode(&encoded).unwrap(), value);
        assert!(registry.is_encoded("pointxy:0,0"));
    }

    #[test]
    fn test_register_rejects_collisions() {
        let registry = CodecRegistry::with_builtins();
        let clash = FnCodec::new(
            ValueKind::Custom("other".into()),
            "ARGB",
            |_| Ok(String::new()),
            |_| Ok(TypedValue::Boolean(true)),
        );
        assert!(matches!(
            registry.register(Arc::new(clash)),
            Err(CodecError::Conflict { .. })
        ));

        let same_kind = FnCodec::new(
            ValueKind::Color,
            "rgba",
            |_| Ok(String::new()),
            |_| Ok(TypedValue::Boolean(true)),
        );
        assert!(matches!(
            registry.register(Arc::new(same_kind)),
            Err(CodecError::Conflict { .. })
        ));

        let bad_prefix = FnCodec::new(
            ValueKind::Custom("x".into()),
            "has space",
            |_| Ok(String::new()),
            |_| Ok(TypedValue::Boolean(true)),
        );
        assert!(registry.register(Arc::new(bad_prefix)).is_err());
    }

    #[test]
    fn test_replace_and_unregister() {
        let registry = CodecRegistry::with_builtins();
        let hex = FnCodec::new(
            ValueKind::Color,
            "hex",
            |value| match value {
                TypedValue::Color(c) => Ok(format!("{:02x}{:02x}{:02x}{:02x}", c.a, c.r, c.g, c.b)),
                other => Err(CodecError::UnsupportedType {
                    kind: other.kind().to_string(),
                }),
            },
            |_| Ok(TypedValue::Color(Color::rgb(0, 0, 0))),
        );
        let old = registry.replace(Arc::new(hex)).unwrap();
        assert_eq!(old.map(|c| c.prefix().to_string()), Some("argb".to_string()));
        assert!(!registry.has_prefix("argb"));
        assert_eq!(
            registry.encode(&TypedValue::Color(Color::rgb(255, 0, 16))).unwrap(),
            "hex:ffff0010"
        );

        assert!(registry.unregister(&ValueKind::Color).is_some());
        assert!(!registry.supports(&ValueKind::Color));
        assert!(!registry.is_encoded("hex:00"));
    }
}
