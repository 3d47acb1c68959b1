//! The conversion engine.
//!
//! An [`Engine`] owns one codec registry, one property handler registry and
//! one object handler registry. Extensions are registered on the engine and
//! apply to every conversion it runs afterwards.
//!
//! # Example
//!
//! ```rust
//! use ghjson::engine::{Engine, SerializationOptions};
//! use ghjson::model::{create_node, CanvasNodeBuilder};
//!
//! let engine = Engine::new();
//! let slider = CanvasNodeBuilder::number_slider(5.5, 0.0, 10.0, 1).build();
//!
//! let record = engine.serialize_node(&slider, 1, &SerializationOptions::optimized()).value;
//! assert_eq!(record.component_state.value, Some(serde_json::json!("5.5<0,10>")));
//!
//! let rebuilt = engine.deserialize_node(&record, &create_node).unwrap();
//! assert!(rebuilt.warnings.is_empty());
//! ```

use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde_json::{Map, Value as Json};

use crate::codec::registry::{CodecRegistry, FnCodec, ValueCodec};
use crate::codec::tree::TreeCodec;
use crate::error::{CodecError, ConversionWarning, ErrorCode, RecordError, RegistryError};
use crate::filter::{should_prune, PropertyFilter, PropertyRule, SerializationContext};
use crate::handler::{HandlerContext, HandlerRegistry, ObjectHandler};
use crate::model::{
    CanvasObject, Document, NodeFactory, NodeFamily, NodeId, NodeRecord, ParameterSettings, ParameterSide,
    PropertyAccess, TypedValue, ValueKind,
};
use crate::property::{PropertyContext, PropertyHandler, PropertyRegistry};

// =============================================================================
// OPTIONS
// =============================================================================

/// Options for serializing nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct SerializationOptions {
    pub context: SerializationContext,
    /// Replaces the context's rule when set.
    pub rule: Option<PropertyRule>,
    /// Drop properties at their irrelevant default.
    pub prune_defaults: bool,
    pub include_component_state: bool,
    pub include_parameter_settings: bool,
}

impl Default for SerializationOptions {
    fn default() -> Self {
        Self::standard()
    }
}

impl SerializationOptions {
    fn for_context(context: SerializationContext) -> Self {
        Self {
            context,
            rule: None,
            prune_defaults: true,
            include_component_state: true,
            include_parameter_settings: true,
        }
    }

    pub fn standard() -> Self {
        Self::for_context(SerializationContext::Standard)
    }

    pub fn optimized() -> Self {
        Self::for_context(SerializationContext::Optimized)
    }

    pub fn lite() -> Self {
        Self::for_context(SerializationContext::Lite)
    }

    pub fn with_rule(mut self, rule: PropertyRule) -> Self {
        self.rule = Some(rule);
        self
    }

    pub fn with_prune_defaults(mut self, prune: bool) -> Self {
        self.prune_defaults = prune;
        self
    }

    pub fn with_component_state(mut self, include: bool) -> Self {
        self.include_component_state = include;
        self
    }

    pub fn with_parameter_settings(mut self, include: bool) -> Self {
        self.include_parameter_settings = include;
        self
    }

    /// The property filter these options select.
    pub fn filter(&self) -> PropertyFilter {
        match &self.rule {
            Some(rule) => PropertyFilter::new(rule.clone()),
            None => PropertyFilter::for_context(self.context),
        }
    }
}

/// A conversion result with the warnings collected on the way.
#[derive(Debug)]
pub struct Conversion<T> {
    pub value: T,
    pub warnings: Vec<ConversionWarning>,
}

impl<T> Conversion<T> {
    pub fn new(value: T, warnings: Vec<ConversionWarning>) -> Self {
        Self { value, warnings }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Conversion<U> {
        Conversion {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// Conversion context holding every registry.
#[derive(Debug)]
pub struct Engine {
    codecs: CodecRegistry,
    properties: PropertyRegistry,
    handlers: HandlerRegistry,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates an engine with every built-in codec and handler.
    pub fn new() -> Self {
        Self {
            codecs: CodecRegistry::with_builtins(),
            properties: PropertyRegistry::with_builtins(),
            handlers: HandlerRegistry::with_builtins(),
        }
    }

    /// Creates an engine with the built-in codecs and only the two default
    /// handlers.
    pub fn empty() -> Self {
        Self {
            codecs: CodecRegistry::with_builtins(),
            properties: PropertyRegistry::new(),
            handlers: HandlerRegistry::new(),
        }
    }

    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    pub fn properties(&self) -> &PropertyRegistry {
        &self.properties
    }

    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    pub fn tree_codec(&self) -> TreeCodec<'_> {
        TreeCodec::new(&self.codecs)
    }

    fn handler_context(&self, node_id: NodeId) -> HandlerContext<'_> {
        HandlerContext::new(&self.codecs, &self.properties, node_id)
    }

    // =========================================================================
    // Registration
    // =========================================================================

    pub fn register_value_codec(&self, codec: Arc<dyn ValueCodec>) -> Result<(), CodecError> {
        self.codecs.register(codec)
    }

    /// Registers a codec from a `(kind, prefix, encode, decode)` quadruple.
    pub fn register_value_fn<E, D>(
        &self,
        kind: ValueKind,
        prefix: impl Into<String>,
        encode: E,
        decode: D,
    ) -> Result<(), CodecError>
    where
        E: Fn(&TypedValue) -> Result<String, CodecError> + Send + Sync + 'static,
        D: Fn(&str) -> Result<TypedValue, CodecError> + Send + Sync + 'static,
    {
        self.codecs.register(Arc::new(FnCodec::new(kind, prefix, encode, decode)))
    }

    pub fn replace_value_codec(&self, codec: Arc<dyn ValueCodec>) -> Result<Option<Arc<dyn ValueCodec>>, CodecError> {
        self.codecs.replace(codec)
    }

    pub fn unregister_value_codec(&self, kind: &ValueKind) -> Option<Arc<dyn ValueCodec>> {
        self.codecs.unregister(kind)
    }

    pub fn register_property_handler(&self, handler: Arc<dyn PropertyHandler>) -> Result<(), RegistryError> {
        self.properties.register(handler)
    }

    pub fn unregister_property_handler(&self, name: &str) -> Result<Option<Arc<dyn PropertyHandler>>, RegistryError> {
        self.properties.unregister(name)
    }

    pub fn register_object_handler(&self, handler: Arc<dyn ObjectHandler>) -> Result<(), RegistryError> {
        self.handlers.register(handler)
    }

    pub fn unregister_object_handler(&self, name: &str) -> Result<Option<Arc<dyn ObjectHandler>>, RegistryError> {
        self.handlers.unregister(name)
    }

    // =========================================================================
    // Values
    // =========================================================================

    pub fn encode_value(&self, value: &TypedValue) -> Result<String, CodecError> {
        self.codecs.encode(value)
    }

    pub fn decode_value(&self, s: &str) -> Result<TypedValue, CodecError> {
        self.codecs.decode(s)
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// Serializes one live node.
    ///
    /// Never fails: properties and handlers that fail are reported as
    /// warnings and left out of the record.
    pub fn serialize_node(
        &self,
        node: &dyn CanvasObject,
        id: NodeId,
        options: &SerializationOptions,
    ) -> Conversion<NodeRecord> {
        let kind = node.kind();
        let filter = options.filter();
        let mut warnings = Vec::new();
        let mut record = NodeRecord::new(id, &kind);
        record.instance_guid = node.instance_guid();

        record.properties = self.extract_properties(
            id,
            node.properties(),
            node.family(),
            &kind.name,
            &filter,
            options,
            &mut warnings,
        );

        if options.include_parameter_settings {
            for (side, out) in [
                (ParameterSide::Input, &mut record.input_settings),
                (ParameterSide::Output, &mut record.output_settings),
            ] {
                for param in node.parameters(side) {
                    let properties = self.extract_properties(
                        id,
                        param.properties,
                        NodeFamily::Parameter,
                        param.name,
                        &filter,
                        options,
                        &mut warnings,
                    );
                    if !properties.is_empty() {
                        out.push(ParameterSettings {
                            parameter_name: param.name.to_string(),
                            properties,
                        });
                    }
                }
            }
        }

        if options.include_component_state {
            let (state, state_warnings) = self.handlers.serialize_state(&self.handler_context(id), node);
            record.component_state = state;
            warnings.extend(state_warnings);
        }

        Conversion::new(record, warnings)
    }

    #[allow(clippy::too_many_arguments)]
    fn extract_properties(
        &self,
        id: NodeId,
        target: &dyn PropertyAccess,
        family: NodeFamily,
        owner_name: &str,
        filter: &PropertyFilter,
        options: &SerializationOptions,
        warnings: &mut Vec<ConversionWarning>,
    ) -> Map<String, Json> {
        let ctx = PropertyContext::new(&self.codecs, family);
        let exposed: FxHashSet<String> = target.property_names().into_iter().collect();

        let mut names = filter.allowed_properties(family);
        let mut i = 0;
        while i < names.len() {
            for related in self.properties.related_properties(&ctx, target, &names[i]) {
                if !filter.is_excluded(&related) && !names.contains(&related) {
                    names.push(related);
                }
            }
            i += 1;
        }

        let mut out = Map::new();
        for name in names.iter().filter(|name| exposed.contains(*name)) {
            match self.properties.extract(&ctx, target, name) {
                Ok(Some(value)) => {
                    if options.prune_defaults && should_prune(family, name, &value, owner_name) {
                        continue;
                    }
                    out.insert(name.clone(), value);
                }
                Ok(None) => {}
                Err(err) => warnings.push(ConversionWarning::from_handler(id, name, &err)),
            }
        }
        out
    }

    /// Serializes a set of nodes into a document.
    ///
    /// Wires are the caller's concern; the document has no connections.
    pub fn serialize_document<'a, I>(&self, nodes: I, options: &SerializationOptions) -> Conversion<Document>
    where
        I: IntoIterator<Item = (NodeId, &'a dyn CanvasObject)>,
    {
        let mut document = Document {
            schema_version: Some(crate::SCHEMA_VERSION.to_string()),
            ..Document::default()
        };
        let mut warnings = Vec::new();
        for (id, node) in nodes {
            let conversion = self.serialize_node(node, id, options);
            warnings.extend(conversion.warnings);
            document.components.push(conversion.value);
        }
        Conversion::new(document, warnings)
    }

    // =========================================================================
    // Deserialization
    // =========================================================================

    /// Applies a record to an existing node of the same kind.
    ///
    /// Properties are applied first, then parameter settings, then the
    /// component state, so handler-owned state has the last word.
    pub fn apply_record(
        &self,
        record: &NodeRecord,
        node: &mut dyn CanvasObject,
    ) -> Result<Vec<ConversionWarning>, RecordError> {
        record.check_identity()?;
        let node_kind = node.kind();
        if !record.kind().matches(&node_kind) {
            return Err(RecordError::KindMismatch {
                id: record.id,
                record: record.kind().to_string(),
                node: node_kind.to_string(),
            });
        }

        let mut warnings = Vec::new();
        let ctx = PropertyContext::new(&self.codecs, node.family());
        for (name, value) in &record.properties {
            if let Err(err) = self.properties.apply(&ctx, node.properties_mut(), name, value) {
                warnings.push(ConversionWarning::from_handler(record.id, name, &err));
            }
        }

        let ctx = PropertyContext::new(&self.codecs, NodeFamily::Parameter);
        for (side, settings) in [
            (ParameterSide::Input, &record.input_settings),
            (ParameterSide::Output, &record.output_settings),
        ] {
            for setting in settings {
                let Some(target) = node.parameter_mut(side, &setting.parameter_name) else {
                    warnings.push(ConversionWarning::new(
                        ErrorCode::HandlerFailure,
                        record.id,
                        &setting.parameter_name,
                        "node has no such parameter",
                    ));
                    continue;
                };
                for (name, value) in &setting.properties {
                    if let Err(err) = self.properties.apply(&ctx, target, name, value) {
                        let subject = format!("{}.{}", setting.parameter_name, name);
                        warnings.push(ConversionWarning::from_handler(record.id, subject, &err));
                    }
                }
            }
        }

        let state_warnings = self
            .handlers
            .apply_state(&self.handler_context(record.id), node, &record.component_state);
        warnings.extend(state_warnings);
        Ok(warnings)
    }

    /// Creates a node through `factory` and applies `record` to it.
    pub fn deserialize_node(
        &self,
        record: &NodeRecord,
        factory: &dyn NodeFactory,
    ) -> Result<Conversion<Box<dyn CanvasObject>>, RecordError> {
        record.check_identity()?;
        let kind = record.kind();
        let mut node = factory
            .create(&kind, record.instance_guid)
            .ok_or_else(|| RecordError::UnknownKind { kind: kind.to_string() })?;
        let warnings = self.apply_record(record, node.as_mut())?;
        Ok(Conversion::new(node, warnings))
    }

    /// Deserializes every record of a document, in order.
    pub fn deserialize_document(
        &self,
        document: &Document,
        factory: &dyn NodeFactory,
    ) -> Result<Conversion<Vec<(NodeId, Box<dyn CanvasObject>)>>, RecordError> {
        let mut nodes = Vec::with_capacity(document.components.len());
        let mut warnings = Vec::new();
        for record in &document.components {
            let conversion = self.deserialize_node(record, factory)?;
            warnings.extend(conversion.warnings);
            nodes.push((record.id, conversion.value));
        }
        Ok(Conversion::new(nodes, warnings))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::HandlerError;
    use crate::filter::PropertyCategories;
    use crate::handler::StateField;
    use crate::model::{
        create_node, CanvasNode, CanvasNodeBuilder, Color, ComponentKind, ComponentState, DataTree, GhPath,
        HostValue,
    };

    fn addition() -> CanvasNodeBuilder {
        CanvasNodeBuilder::new(ComponentKind::named("Addition"))
            .input("A", |p| p.data_mapping(2))
            .input("B", |p| {
                let mut tree = DataTree::new();
                tree.append(GhPath::new(vec![0]), TypedValue::Number(1.0));
                tree.append(GhPath::new(vec![0]), TypedValue::Number(2.0));
                p.persistent_data(tree)
            })
            .output("Result", |p| p)
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }

    #[test]
    fn test_slider_scenario() {
        let engine = Engine::new();
        let slider = CanvasNodeBuilder::number_slider(5.5, 0.0, 10.0, 1).build();

        let record = engine.serialize_node(&slider, 3, &SerializationOptions::standard());
        assert!(record.is_clean());
        let record = record.value;
        assert_eq!(record.component_state.value, Some(json!("5.5<0,10>")));
        assert_eq!(record.properties.get("currentValue"), Some(&json!("5.5<0,10>")));
        assert_eq!(record.properties.get("maximum"), Some(&json!(10.0)));

        let rebuilt = engine.deserialize_node(&record, &create_node).unwrap();
        assert!(rebuilt.is_clean());
        let props = rebuilt.value.properties();
        assert_eq!(props.get_property("currentValue"), Some(HostValue::Number(5.5)));
        assert_eq!(props.get_property("minimum"), Some(HostValue::Number(0.0)));
        assert_eq!(props.get_property("maximum"), Some(HostValue::Number(10.0)));
        assert_eq!(props.get_property("decimalPlaces"), Some(HostValue::Integer(1)));
    }

    #[test]
    fn test_optimized_carries_bounds_in_compact_value() {
        let engine = Engine::new();
        let slider = CanvasNodeBuilder::number_slider(2.25, -5.0, 5.0, 2).build();
        let record = engine
            .serialize_node(&slider, 1, &SerializationOptions::optimized())
            .value;
        assert_eq!(record.properties.get("minimum"), None);
        assert_eq!(record.properties.get("currentValue"), Some(&json!("2.25<-5,5>")));

        let rebuilt = engine.deserialize_node(&record, &create_node).unwrap().value;
        assert_eq!(rebuilt.properties().get_property("minimum"), Some(HostValue::Number(-5.0)));
        assert_eq!(rebuilt.properties().get_property("decimalPlaces"), Some(HostValue::Integer(2)));
    }

    #[test]
    fn test_generic_node_round_trip() {
        let engine = Engine::new();
        let node = addition().nick_name("Sum").locked(true).build();

        let record = engine.serialize_node(&node, 1, &SerializationOptions::standard()).value;
        assert_eq!(record.name, "Addition");
        assert_eq!(record.properties.get("nickName"), Some(&json!("Sum")));
        // Defaults are pruned
        assert_eq!(record.properties.get("hidden"), None);
        assert_eq!(record.component_state.locked, Some(true));
        assert_eq!(record.input_settings.len(), 2);
        assert_eq!(record.input_settings[0].properties.get("dataMapping"), Some(&json!("Graft")));
        assert_eq!(
            record.input_settings[1].properties.get("persistentData"),
            Some(&json!({"{0}": {"{0}(0)": 1.0, "{0}(1)": 2.0}}))
        );
        assert!(record.output_settings.is_empty());

        let factory = |kind: &ComponentKind, _guid: Option<uuid::Uuid>| -> Option<Box<dyn CanvasObject>> {
            Some(
                CanvasNodeBuilder::new(kind.clone())
                    .input("A", |p| p)
                    .input("B", |p| p)
                    .output("Result", |p| p)
                    .boxed(),
            )
        };
        let rebuilt = engine.deserialize_node(&record, &factory).unwrap();
        assert!(rebuilt.is_clean(), "{:?}", rebuilt.warnings);
        let again = engine
            .serialize_node(rebuilt.value.as_ref(), 1, &SerializationOptions::standard())
            .value;
        assert_eq!(again, record);
    }

    #[test]
    fn test_lite_keeps_persistent_data_only() {
        let engine = Engine::new();
        let node = addition().nick_name("Sum").locked(true).selected(true).build();
        let record = engine.serialize_node(&node, 1, &SerializationOptions::lite()).value;

        assert_eq!(record.properties.get("locked"), None);
        assert_eq!(record.input_settings.len(), 1);
        assert_eq!(record.input_settings[0].parameter_name, "B");
        assert!(record.input_settings[0].properties.contains_key("persistentData"));
    }

    #[test]
    fn test_custom_rule_with_related_properties() {
        let engine = Engine::new();
        let slider = CanvasNodeBuilder::number_slider(1.0, 0.0, 4.0, 0).build();
        let options = SerializationOptions::standard()
            .with_rule(PropertyRule::new(PropertyCategories::empty()).include(["currentValue"]))
            .with_component_state(false);
        let record = engine.serialize_node(&slider, 1, &options).value;

        let keys: Vec<&str> = record.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["currentValue", "minimum", "maximum", "decimalPlaces"]);
        assert!(record.component_state.is_empty());
    }

    #[test]
    fn test_bad_property_does_not_abort_node() {
        let engine = Engine::new();
        let mut record = NodeRecord::new(1, &ComponentKind::named("Panel"));
        record.properties.insert("color".into(), json!("argb:nope"));
        record.properties.insert("text".into(), json!("still applied"));
        record.properties.insert("radius".into(), json!(4));

        let rebuilt = engine.deserialize_node(&record, &create_node).unwrap();
        assert_eq!(rebuilt.warnings.len(), 2);
        assert!(rebuilt.warnings.iter().all(|w| w.code == ErrorCode::HandlerFailure));
        assert_eq!(
            rebuilt.value.properties().get_property("text"),
            Some(HostValue::Text("still applied".into()))
        );
    }

    #[test]
    fn test_record_identity_is_enforced() {
        let engine = Engine::new();
        let anonymous = NodeRecord::default();
        assert!(matches!(
            engine.deserialize_node(&anonymous, &create_node),
            Err(RecordError::MissingKindIdentity { id: 0 })
        ));

        let record = NodeRecord::new(2, &ComponentKind::named("Panel"));
        let mut slider: CanvasNode = CanvasNodeBuilder::number_slider(0.0, 0.0, 1.0, 0).build();
        assert!(matches!(
            engine.apply_record(&record, &mut slider),
            Err(RecordError::KindMismatch { id: 2, .. })
        ));

        let refuse = |_: &ComponentKind, _: Option<uuid::Uuid>| -> Option<Box<dyn CanvasObject>> { None };
        assert!(matches!(
            engine.deserialize_node(&record, &refuse),
            Err(RecordError::UnknownKind { .. })
        ));
    }

    /// Extension handler contributing a namespace for panels.
    struct Annotator;

    impl ObjectHandler for Annotator {
        fn name(&self) -> &str {
            "vendor.notes"
        }

        fn priority(&self) -> i32 {
            50
        }

        fn can_handle(&self, _kind: &ComponentKind, family: NodeFamily) -> bool {
            family == NodeFamily::Panel
        }

        fn owned_fields(&self) -> Vec<StateField> {
            vec![StateField::Extension("vendor.notes".into()), StateField::Value]
        }

        fn extract(&self, _ctx: &HandlerContext<'_>, _node: &dyn CanvasObject) -> Result<ComponentState, HandlerError> {
            let mut state = ComponentState {
                value: Some(json!("from annotator")),
                ..Default::default()
            };
            state.extensions.insert_raw("vendor.notes", json!({"pinned": true}));
            Ok(state)
        }

        fn apply(
            &self,
            _ctx: &HandlerContext<'_>,
            _node: &mut dyn CanvasObject,
            _state: &ComponentState,
        ) -> Result<(), HandlerError> {
            Ok(())
        }
    }

    #[test]
    fn test_registered_extension_never_overrides_specific_handler() {
        let engine = Engine::new();
        engine.register_object_handler(Arc::new(Annotator)).unwrap();
        let panel = CanvasNodeBuilder::panel("real text").build();

        let record = engine.serialize_node(&panel, 1, &SerializationOptions::standard()).value;
        assert_eq!(record.component_state.value, Some(json!("real text")));
        assert_eq!(
            record.component_state.extensions.get_raw("vendor.notes"),
            Some(&json!({"pinned": true}))
        );
        assert!(record.component_state.extensions.contains("gh.panel"));

        engine.unregister_object_handler("vendor.notes").unwrap();
        let record = engine.serialize_node(&panel, 1, &SerializationOptions::standard()).value;
        assert!(!record.component_state.extensions.contains("vendor.notes"));
    }

    #[test]
    fn test_custom_codec_through_engine() {
        let engine = Engine::new();
        engine
            .register_value_fn(
                ValueKind::Custom("percent".into()),
                "percent",
                |value| match value {
                    TypedValue::Custom(c) => Ok(c.payload.to_string()),
                    other => Err(CodecError::UnsupportedType {
                        kind: other.kind().to_string(),
                    }),
                },
                |payload| {
                    let n: f64 = payload
                        .parse()
                        .map_err(|_| CodecError::malformed("percent", payload, "expected a number"))?;
                    Ok(TypedValue::Custom(crate::model::CustomValue {
                        kind: "percent".into(),
                        payload: json!(n),
                    }))
                },
            )
            .unwrap();
        let decoded = engine.decode_value("PERCENT:12.5").unwrap();
        assert_eq!(engine.encode_value(&decoded).unwrap(), "percent:12.5");
        assert!(matches!(
            engine.register_value_fn(ValueKind::Custom("other".into()), "argb", |_| Ok(String::new()), |_| {
                Ok(TypedValue::Boolean(true))
            }),
            Err(CodecError::Conflict { .. })
        ));
    }

    #[test]
    fn test_document_round_trip() {
        let engine = Engine::new();
        let panel = CanvasNodeBuilder::panel("note")
            .property("color", TypedValue::Color(Color::argb(255, 10, 20, 30)))
            .build();
        let toggle = CanvasNodeBuilder::boolean_toggle(true).build();
        let nodes: Vec<(NodeId, &dyn CanvasObject)> = vec![(1, &panel), (2, &toggle)];

        let document = engine.serialize_document(nodes, &SerializationOptions::standard());
        assert!(document.is_clean());
        let text = document.value.to_json().unwrap();
        let parsed = Document::from_json(&text).unwrap();
        assert_eq!(parsed, document.value);

        let rebuilt = engine.deserialize_document(&parsed, &create_node).unwrap();
        assert!(rebuilt.is_clean());
        assert_eq!(rebuilt.value.len(), 2);
        assert_eq!(
            rebuilt.value[0].1.properties().get_property("color"),
            Some(HostValue::Value(TypedValue::Color(Color::argb(255, 10, 20, 30))))
        );
        assert_eq!(rebuilt.value[1].1.properties().get_property("value"), Some(HostValue::Bool(true)));
    }
}
