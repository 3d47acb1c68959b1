//! Whole-node state handlers and the orchestrator that merges them.
//!
//! Every [`ObjectHandler`] whose `can_handle` matches a node contributes a
//! partial [`ComponentState`]. On serialization the contributions are merged
//! highest priority first, field by field, first writer wins. On
//! application each field goes to the highest-priority matching handler
//! that owns it, and handlers run lowest priority first, each seeing only
//! the fields it won. Either way the most specific handler decides a field.
//!
//! A failing handler becomes a [`ConversionWarning`]; the remaining handlers
//! still run. Within one handler, each failed property is its own warning
//! and the handler's other properties are still applied.

pub mod default;
pub mod families;

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde_json::Value as Json;

pub use default::DefaultObjectHandler;
pub use families::{
    PanelHandler, ScribbleHandler, ScriptHandler, SliderHandler, SwatchHandler, ToggleHandler, ValueListHandler,
};

use crate::codec::registry::CodecRegistry;
use crate::error::{ConversionWarning, HandlerError, RegistryError};
use crate::model::{CanvasObject, ComponentKind, ComponentState, HostValue, KindKey, NodeFamily, NodeId};
use crate::property::{PropertyContext, PropertyRegistry};
use crate::util::{PriorityList, Ranked};

/// One field of [`ComponentState`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StateField {
    Selected,
    Locked,
    Hidden,
    Value,
    /// One extension namespace.
    Extension(String),
}

impl StateField {
    /// Fields present (non-absent) in `state`.
    pub fn present_in(state: &ComponentState) -> Vec<StateField> {
        let mut fields = Vec::new();
        if state.selected.is_some() {
            fields.push(StateField::Selected);
        }
        if state.locked.is_some() {
            fields.push(StateField::Locked);
        }
        if state.hidden.is_some() {
            fields.push(StateField::Hidden);
        }
        if state.value.as_ref().is_some_and(|v| !v.is_null()) {
            fields.push(StateField::Value);
        }
        for namespace in state.extensions.namespaces() {
            fields.push(StateField::Extension(namespace.to_string()));
        }
        fields
    }

    /// Copies this field from `from` into `to`.
    fn copy(&self, from: &ComponentState, to: &mut ComponentState) {
        match self {
            StateField::Selected => to.selected = from.selected,
            StateField::Locked => to.locked = from.locked,
            StateField::Hidden => to.hidden = from.hidden,
            StateField::Value => to.value = from.value.clone(),
            StateField::Extension(namespace) => {
                if let Some(payload) = from.extensions.get_raw(namespace) {
                    to.extensions.insert_raw(namespace.clone(), payload.clone());
                }
            }
        }
    }
}

impl fmt::Display for StateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateField::Selected => f.write_str("selected"),
            StateField::Locked => f.write_str("locked"),
            StateField::Hidden => f.write_str("hidden"),
            StateField::Value => f.write_str("value"),
            StateField::Extension(namespace) => write!(f, "extensions.{namespace}"),
        }
    }
}

/// Services an object handler may use.
#[derive(Clone, Copy)]
pub struct HandlerContext<'a> {
    pub codecs: &'a CodecRegistry,
    pub properties: &'a PropertyRegistry,
    pub node_id: NodeId,
}

impl<'a> HandlerContext<'a> {
    pub fn new(codecs: &'a CodecRegistry, properties: &'a PropertyRegistry, node_id: NodeId) -> Self {
        Self {
            codecs,
            properties,
            node_id,
        }
    }

    /// Extracts a node property through the property handlers.
    pub fn read(&self, node: &dyn CanvasObject, property: &str) -> Result<Option<Json>, HandlerError> {
        let ctx = PropertyContext::new(self.codecs, node.family());
        self.properties.extract(&ctx, node.properties(), property)
    }

    /// Applies a node property through the property handlers.
    pub fn write(&self, node: &mut dyn CanvasObject, property: &str, value: &Json) -> Result<(), HandlerError> {
        let ctx = PropertyContext::new(self.codecs, node.family());
        self.properties.apply(&ctx, node.properties_mut(), property, value)
    }

    /// Reads the raw host value of a property.
    pub fn host(&self, node: &dyn CanvasObject, property: &str) -> Result<HostValue, HandlerError> {
        node.properties()
            .get_property(property)
            .ok_or_else(|| HandlerError::UnknownProperty {
                property: property.to_string(),
            })
    }
}

/// Serialization of one node kind's state.
pub trait ObjectHandler: Send + Sync {
    /// Unique handler name.
    fn name(&self) -> &str;

    /// Higher is more specific.
    fn priority(&self) -> i32;

    /// Returns true if this handler serves nodes of `kind`.
    fn can_handle(&self, kind: &ComponentKind, family: NodeFamily) -> bool;

    /// Fields this handler applies.
    fn owned_fields(&self) -> Vec<StateField>;

    /// Reads this handler's view of the node's state.
    fn extract(&self, ctx: &HandlerContext<'_>, node: &dyn CanvasObject) -> Result<ComponentState, HandlerError>;

    /// Applies `state`, which holds only fields this handler owns.
    ///
    /// A property that fails must not stop the others; report every failure
    /// through [`HandlerError::collect`].
    fn apply(
        &self,
        ctx: &HandlerContext<'_>,
        node: &mut dyn CanvasObject,
        state: &ComponentState,
    ) -> Result<(), HandlerError>;
}

impl Ranked for dyn ObjectHandler {
    fn rank_name(&self) -> &str {
        self.name()
    }

    fn rank(&self) -> i32 {
        self.priority()
    }
}

type HandlerList = Arc<[Arc<dyn ObjectHandler>]>;

// =============================================================================
// ORCHESTRATOR
// =============================================================================

/// Thread-safe registry and orchestrator of object handlers.
///
/// Matching handler sets are cached per kind and family. Locks are always
/// taken handlers first, cache second.
pub struct HandlerRegistry {
    handlers: RwLock<PriorityList<dyn ObjectHandler>>,
    cache: RwLock<FxHashMap<(KindKey, NodeFamily), HandlerList>>,
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handler_names())
            .finish()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerRegistry {
    /// Creates a registry holding only the default handler.
    pub fn new() -> Self {
        let mut handlers = PriorityList::new();
        handlers.push(Arc::new(DefaultObjectHandler) as Arc<dyn ObjectHandler>);
        Self {
            handlers: RwLock::new(handlers),
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    /// Creates a registry holding every built-in handler.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        {
            let mut handlers = registry.handlers.write();
            handlers.push(Arc::new(SliderHandler));
            handlers.push(Arc::new(ToggleHandler));
            handlers.push(Arc::new(SwatchHandler));
            handlers.push(Arc::new(PanelHandler));
            handlers.push(Arc::new(ValueListHandler));
            handlers.push(Arc::new(ScriptHandler));
            handlers.push(Arc::new(ScribbleHandler));
        }
        registry
    }

    /// Registers a handler. Names must be unique.
    pub fn register(&self, handler: Arc<dyn ObjectHandler>) -> Result<(), RegistryError> {
        let mut handlers = self.handlers.write();
        if handlers.contains(handler.name()) {
            return Err(RegistryError::DuplicateHandler {
                name: handler.name().to_string(),
            });
        }
        log::debug!("registered object handler {} (priority {})", handler.name(), handler.priority());
        handlers.push(handler);
        self.cache.write().clear();
        Ok(())
    }

    /// Removes a handler by name. The default handler is protected.
    pub fn unregister(&self, name: &str) -> Result<Option<Arc<dyn ObjectHandler>>, RegistryError> {
        if name == DefaultObjectHandler::NAME {
            return Err(RegistryError::Protected { name: name.to_string() });
        }
        let mut handlers = self.handlers.write();
        let removed = handlers.remove(name);
        if removed.is_some() {
            self.cache.write().clear();
        }
        Ok(removed)
    }

    pub fn handler_names(&self) -> Vec<String> {
        self.handlers
            .read()
            .snapshot()
            .iter()
            .map(|h| h.name().to_string())
            .collect()
    }

    /// Handlers matching a node kind, highest priority first.
    pub fn matching(&self, kind: &ComponentKind, family: NodeFamily) -> HandlerList {
        let key = (kind.key(), family);
        if let Some(hit) = self.cache.read().get(&key) {
            return hit.clone();
        }
        let handlers = self.handlers.read();
        let matched: HandlerList = handlers
            .snapshot()
            .iter()
            .filter(|h| h.can_handle(kind, family))
            .cloned()
            .collect();
        log::debug!(
            "resolved {} object handlers for {} ({})",
            matched.len(),
            kind,
            family
        );
        self.cache.write().insert(key, matched.clone());
        matched
    }

    /// Extracts and merges the state of `node`.
    ///
    /// Extension namespaces held by the node's own store are merged last, at
    /// the lowest precedence.
    pub fn serialize_state(
        &self,
        ctx: &HandlerContext<'_>,
        node: &dyn CanvasObject,
    ) -> (ComponentState, Vec<ConversionWarning>) {
        let mut merged = ComponentState::default();
        let mut warnings = Vec::new();
        for handler in self.matching(&node.kind(), node.family()).iter() {
            match handler.extract(ctx, node) {
                Ok(partial) => {
                    log::trace!("object handler {} contributed {:?}", handler.name(), StateField::present_in(&partial));
                    merged = merged.merge(partial);
                }
                Err(err) => warnings.push(ConversionWarning::from_handler(ctx.node_id, handler.name(), &err)),
            }
        }
        if let Some(store) = node.extension_store() {
            merged.extensions = merged.extensions.merge(store.clone());
        }
        (merged, warnings)
    }

    /// Applies `state` to `node`.
    ///
    /// Extension namespaces no matching handler owns are kept in the node's
    /// extension store so they are written back out unchanged.
    pub fn apply_state(
        &self,
        ctx: &HandlerContext<'_>,
        node: &mut dyn CanvasObject,
        state: &ComponentState,
    ) -> Vec<ConversionWarning> {
        let handlers = self.matching(&node.kind(), node.family());
        let owned: Vec<Vec<StateField>> = handlers.iter().map(|h| h.owned_fields()).collect();

        // Highest-priority owner takes each field
        let mut assigned: Vec<ComponentState> = vec![ComponentState::default(); handlers.len()];
        let mut unowned = Vec::new();
        for field in StateField::present_in(state) {
            match owned.iter().position(|fields| fields.contains(&field)) {
                Some(i) => field.copy(state, &mut assigned[i]),
                None => unowned.push(field),
            }
        }

        let mut warnings = Vec::new();
        for (handler, part) in handlers.iter().zip(&assigned).rev() {
            if part.is_empty() {
                continue;
            }
            if let Err(err) = handler.apply(ctx, node, part) {
                for err in err.into_errors() {
                    warnings.push(ConversionWarning::from_handler(ctx.node_id, handler.name(), &err));
                }
            }
        }

        for field in unowned {
            match (&field, node.extension_store_mut()) {
                (StateField::Extension(namespace), Some(store)) => {
                    if let Some(payload) = state.extensions.get_raw(namespace) {
                        store.insert_raw(namespace.clone(), payload.clone());
                    }
                }
                _ => log::debug!("node {}: no object handler owns {}, dropped", ctx.node_id, field),
            }
        }
        warnings
    }
}
