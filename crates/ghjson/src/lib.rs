//! GhJSON: JSON documents for visual-programming canvases.
//!
//! This crate converts canvas nodes to and from GhJSON records, and encodes
//! the typed values and data trees those records carry.
//!
//! # Overview
//!
//! A conversion runs through four layers:
//! - **Value codec**: typed values as `prefix:payload` strings (`pointXYZ:1,2,3`)
//! - **Tree codec**: path-addressed data trees as nested JSON objects
//! - **Property handlers**: one handler per property, chosen by priority
//! - **Object handlers**: per-family component state, merged first-writer-wins
//!
//! Which properties are written is decided by a [`PropertyFilter`], built from
//! one of three [`SerializationContext`]s or a custom [`PropertyRule`].
//!
//! # Quick Start
//!
//! ```rust
//! use ghjson::{Engine, SerializationOptions};
//! use ghjson::model::{create_node, CanvasNodeBuilder, Document, TypedValue, Point3};
//!
//! let engine = Engine::new();
//!
//! // Typed values
//! let text = engine.encode_value(&TypedValue::Point(Point3::new(1.0, 2.0, 3.0))).unwrap();
//! assert_eq!(text, "pointXYZ:1,2,3");
//!
//! // Nodes
//! let slider = CanvasNodeBuilder::number_slider(5.5, 0.0, 10.0, 1).build();
//! let doc = engine
//!     .serialize_document([(1, &slider as &dyn ghjson::model::CanvasObject)], &SerializationOptions::standard())
//!     .value;
//! let json = doc.to_json().unwrap();
//!
//! let parsed = Document::from_json(&json).unwrap();
//! ghjson::validate::validate_document(&parsed).unwrap();
//! let nodes = engine.deserialize_document(&parsed, &create_node).unwrap();
//! assert_eq!(nodes.value.len(), 1);
//! ```
//!
//! # Modules
//!
//! - [`model`]: typed values, data trees, records and the host canvas boundary
//! - [`codec`]: value and data-tree text encodings
//! - [`filter`]: property categories, contexts and default pruning
//! - [`property`]: property handlers and their registry
//! - [`handler`]: object handlers and component-state merging
//! - [`engine`]: the conversion pipeline tying it all together
//! - [`validate`]: structural document checks
//! - [`error`]: error types
//! - [`limits`]: bounds applied while decoding
//!
//! # Extending
//!
//! Codecs, property handlers and object handlers can all be registered at
//! runtime. Registries are safe to share between threads; a registration
//! affects conversions that start after it.

pub mod codec;
pub mod engine;
pub mod error;
pub mod filter;
pub mod handler;
pub mod limits;
pub mod model;
pub mod property;
pub mod util;
pub mod validate;

// Re-export commonly used types at crate root
pub use codec::{CodecRegistry, SliderValue, TreeCodec, ValueCodec};
pub use engine::{Conversion, Engine, SerializationOptions};
pub use error::{
    CodecError, ConversionWarning, ErrorCode, HandlerError, HostError, RecordError, RegistryError, TreeError,
    ValidationError,
};
pub use filter::{PropertyCategories, PropertyFilter, PropertyRule, SerializationContext};
pub use handler::{HandlerContext, HandlerRegistry, ObjectHandler, StateField};
pub use model::{
    CanvasNode, CanvasObject, ComponentKind, ComponentState, DataTree, Document, GhPath, HostValue, NodeFamily,
    NodeId, NodeRecord, PropertyAccess, TypedValue,
};
pub use property::{PropertyContext, PropertyHandler, PropertyRegistry};
pub use validate::{validate_document, validate_record};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// GhJSON document schema version this crate writes.
pub const SCHEMA_VERSION: &str = "1.0";
