//! Text encoding/decoding for GhJSON values.
//!
//! - [`registry`]: prefix ⇄ codec table (`prefix:payload` strings)
//! - [`value`]: built-in payload grammars
//! - [`tree`]: data-tree ⇄ nested JSON
//! - [`slider`]: compact slider value grammar

pub mod primitives;
pub mod registry;
pub mod slider;
pub mod tree;
pub mod value;

pub use primitives::{is_valid_prefix, split_prefixed, PayloadReader, PayloadWriter};
pub use registry::{CodecRegistry, FnCodec, ValueCodec};
pub use slider::SliderValue;
pub use tree::{project_branches, ItemConstructor, Leaf, TreeCodec, TypedItems, ValueInspector};
pub use value::{decode_payload, encode_payload, BuiltinCodec};
