//! Data model types for GhJSON.
//!
//! This module contains the core types shared by the codecs and handlers:
//! - Typed values and their kinds
//! - Data trees (path-addressed branches)
//! - Component kinds and node ids
//! - The host canvas boundary (property access, node factory)
//! - Wire records (node records, component state, documents)
//! - Builders (ergonomic construction of in-memory nodes)

pub mod builder;
pub mod canvas;
pub mod id;
pub mod node;
pub mod tree;
pub mod value;

pub use builder::{create_node, CanvasNodeBuilder, ParameterBuilder};
pub use canvas::{
    known_kinds, CanvasNode, CanvasObject, CanvasParameter, FontSpec, HostValue, NodeFactory,
    NodeFamily, ParameterRef, ParameterSide, PropertyAccess, PropertyTable,
};
pub use id::{format_guid, new_instance_guid, parse_guid, ComponentKind, KindKey, NodeId};
pub use node::{
    merge_field, ComponentState, Connection, ConnectionEndpoint, Document, Extensions,
    NodeRecord, ParameterSettings,
};
pub use tree::{Branch, DataTree, GhPath};
pub use value::{
    Bounds, Circle, CircularArc, Color, CustomValue, Interval, Line, OrientedBox, Plane, Point3,
    Rectangle, TypedValue, ValueKind, Vector3,
};
