//! Primitive encoding/decoding for delimited text payloads.
//!
//! Every built-in grammar is a fixed-arity list of numbers separated by
//! `,` inside a group and `;` between groups. The reader enforces arity and
//! turns every failure into a [`CodecError::MalformedPayload`] that carries
//! the full payload.

use crate::error::CodecError;
use crate::limits::MAX_PREFIX_LEN;
use crate::model::{Point3, Vector3};
use crate::util::{format_number, parse_number};

/// Separator between the prefix and the payload.
pub const PREFIX_SEPARATOR: char = ':';

/// Separator between scalar components of a group.
pub const COMPONENT_SEPARATOR: char = ',';

/// Separator between compound groups.
pub const GROUP_SEPARATOR: char = ';';

/// Returns true if `prefix` is 1..=32 ASCII alphanumerics.
pub fn is_valid_prefix(prefix: &str) -> bool {
    !prefix.is_empty()
        && prefix.len() <= MAX_PREFIX_LEN
        && prefix.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Splits `prefix:payload` at the first colon.
///
/// Returns `None` when there is no colon or the prefix is not a valid token.
pub fn split_prefixed(s: &str) -> Option<(&str, &str)> {
    let (prefix, payload) = s.split_once(PREFIX_SEPARATOR)?;
    if is_valid_prefix(prefix) {
        Some((prefix, payload))
    } else {
        None
    }
}

// =============================================================================
// DECODING
// =============================================================================

/// Reader over one payload.
///
/// All methods are pure; the reader only remembers the kind and payload so
/// errors can report them.
#[derive(Debug, Clone, Copy)]
pub struct PayloadReader<'a> {
    kind: &'a str,
    payload: &'a str,
}

impl<'a> PayloadReader<'a> {
    /// Creates a reader for a payload of the given kind.
    pub fn new(kind: &'a str, payload: &'a str) -> Self {
        Self { kind, payload }
    }

    /// Returns the raw payload.
    pub fn payload(&self) -> &'a str {
        self.payload
    }

    /// Builds a malformed-payload error for this payload.
    pub fn error(&self, reason: &'static str) -> CodecError {
        CodecError::malformed(self.kind, self.payload, reason)
    }

    /// Splits `text` on `delimiter`, requiring exactly `count` parts.
    pub fn split_exact(&self, text: &'a str, delimiter: char, count: usize) -> Result<Vec<&'a str>, CodecError> {
        let parts: Vec<&str> = text.split(delimiter).collect();
        if parts.len() != count {
            return Err(self.error("wrong number of components"));
        }
        Ok(parts)
    }

    /// Splits the whole payload into exactly `count` `;`-separated groups.
    pub fn groups(&self, count: usize) -> Result<Vec<&'a str>, CodecError> {
        self.split_exact(self.payload, GROUP_SEPARATOR, count)
    }

    /// Splits `text` at the single occurrence of `delimiter`.
    pub fn pair(&self, text: &'a str, delimiter: char) -> Result<(&'a str, &'a str), CodecError> {
        let parts = self.split_exact(text, delimiter, 2)?;
        Ok((parts[0], parts[1]))
    }

    /// Parses one invariant number.
    pub fn number(&self, token: &str) -> Result<f64, CodecError> {
        parse_number(token).ok_or_else(|| self.error("invalid number"))
    }

    /// Parses one signed 64-bit integer.
    pub fn integer(&self, token: &str) -> Result<i64, CodecError> {
        token.trim().parse::<i64>().map_err(|_| self.error("invalid integer"))
    }

    /// Parses one color channel (0..=255).
    pub fn byte(&self, token: &str) -> Result<u8, CodecError> {
        token
            .trim()
            .parse::<u8>()
            .map_err(|_| self.error("channel must be an integer in 0..=255"))
    }

    /// Parses exactly `N` comma-separated numbers.
    pub fn numbers<const N: usize>(&self, group: &'a str) -> Result<[f64; N], CodecError> {
        let parts = self.split_exact(group, COMPONENT_SEPARATOR, N)?;
        let mut out = [0.0; N];
        for (slot, part) in out.iter_mut().zip(parts) {
            *slot = self.number(part)?;
        }
        Ok(out)
    }

    /// Parses an `x,y,z` group as a point.
    pub fn point(&self, group: &'a str) -> Result<Point3, CodecError> {
        let [x, y, z] = self.numbers::<3>(group)?;
        Ok(Point3::new(x, y, z))
    }

    /// Parses an `x,y,z` group as a vector.
    pub fn vector(&self, group: &'a str) -> Result<Vector3, CodecError> {
        let [x, y, z] = self.numbers::<3>(group)?;
        Ok(Vector3::new(x, y, z))
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Writer for building one payload.
#[derive(Debug, Clone, Default)]
pub struct PayloadWriter {
    buf: String,
}

impl PayloadWriter {
    /// Creates a new empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new writer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
        }
    }

    /// Returns the payload written so far.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Consumes the writer and returns the payload.
    pub fn into_string(self) -> String {
        self.buf
    }

    /// Writes raw text.
    pub fn text(&mut self, s: &str) -> &mut Self {
        self.buf.push_str(s);
        self
    }

    /// Writes a separator character.
    pub fn sep(&mut self, c: char) -> &mut Self {
        self.buf.push(c);
        self
    }

    /// Writes a number in its shortest invariant form.
    pub fn number(&mut self, v: f64) -> &mut Self {
        self.buf.push_str(&format_number(v));
        self
    }

    /// Writes a signed integer.
    pub fn integer(&mut self, v: i64) -> &mut Self {
        self.buf.push_str(&v.to_string());
        self
    }

    /// Writes numbers separated by commas.
    pub fn numbers(&mut self, values: &[f64]) -> &mut Self {
        for (i, v) in values.iter().enumerate() {
            if i > 0 {
                self.sep(COMPONENT_SEPARATOR);
            }
            self.number(*v);
        }
        self
    }

    pub fn point(&mut self, p: &Point3) -> &mut Self {
        self.numbers(&[p.x, p.y, p.z])
    }

    pub fn vector(&mut self, v: &Vector3) -> &mut Self {
        self.numbers(&[v.x, v.y, v.z])
    }
}
