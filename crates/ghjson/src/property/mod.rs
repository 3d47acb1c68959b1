//! Per-property extraction and application.
//!
//! Each property is served by exactly one [`PropertyHandler`]: the first in
//! descending priority order whose `can_handle` accepts it. The
//! [`DefaultPropertyHandler`] sits at `i32::MIN`, accepts everything, and can
//! not be removed, so every property resolves to some handler.

pub mod convert;
pub mod default;
pub mod handlers;

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value as Json;

pub use convert::{host_to_json, json_to_host, typed_to_json};
pub use default::DefaultPropertyHandler;
pub use handlers::{ColorHandler, DataTreeHandler, DisplayModeHandler, FontHandler, SliderValueHandler};

use crate::codec::registry::CodecRegistry;
use crate::error::{HandlerError, RegistryError};
use crate::model::{NodeFamily, PropertyAccess};
use crate::util::{PriorityList, Ranked};

/// What a property handler sees besides the target itself.
#[derive(Clone, Copy)]
pub struct PropertyContext<'a> {
    pub codecs: &'a CodecRegistry,
    /// Family of the node owning the target (`Parameter` for parameters).
    pub family: NodeFamily,
}

impl<'a> PropertyContext<'a> {
    pub fn new(codecs: &'a CodecRegistry, family: NodeFamily) -> Self {
        Self { codecs, family }
    }
}

/// Extraction/application logic for one property or property family.
pub trait PropertyHandler: Send + Sync {
    /// Unique handler name.
    fn name(&self) -> &str;

    /// Higher runs first.
    fn priority(&self) -> i32;

    /// Returns true if this handler serves `property` on `target`.
    fn can_handle(&self, ctx: &PropertyContext<'_>, target: &dyn PropertyAccess, property: &str) -> bool;

    /// Reads the property as JSON; `None` if the target has no value.
    fn extract(
        &self,
        ctx: &PropertyContext<'_>,
        target: &dyn PropertyAccess,
        property: &str,
    ) -> Result<Option<Json>, HandlerError>;

    /// Writes the property from JSON.
    fn apply(
        &self,
        ctx: &PropertyContext<'_>,
        target: &mut dyn PropertyAccess,
        property: &str,
        value: &Json,
    ) -> Result<(), HandlerError>;

    /// Properties that should be extracted alongside `property`.
    fn related_properties(&self, _ctx: &PropertyContext<'_>, _property: &str) -> Vec<String> {
        Vec::new()
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

type HandlerList = Arc<[Arc<dyn PropertyHandler>]>;

impl Ranked for dyn PropertyHandler {
    fn rank_name(&self) -> &str {
        self.name()
    }

    fn rank(&self) -> i32 {
        self.priority()
    }
}

/// Thread-safe, priority-ordered set of property handlers.
pub struct PropertyRegistry {
    table: RwLock<PriorityList<dyn PropertyHandler>>,
}

impl fmt::Debug for PropertyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("handlers", &self.handler_names())
            .finish()
    }
}

impl Default for PropertyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyRegistry {
    /// Creates a registry holding only the default handler.
    pub fn new() -> Self {
        let mut table = PriorityList::new();
        table.push(Arc::new(DefaultPropertyHandler) as Arc<dyn PropertyHandler>);
        Self {
            table: RwLock::new(table),
        }
    }

    /// Creates a registry holding every built-in handler.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        {
            let mut table = registry.table.write();
            table.push(Arc::new(SliderValueHandler));
            table.push(Arc::new(DataTreeHandler));
            table.push(Arc::new(ColorHandler));
            table.push(Arc::new(FontHandler));
            table.push(Arc::new(DisplayModeHandler));
        }
        registry
    }

    /// Registers a handler. Names must be unique.
    pub fn register(&self, handler: Arc<dyn PropertyHandler>) -> Result<(), RegistryError> {
        let mut table = self.table.write();
        if table.contains(handler.name()) {
            return Err(RegistryError::DuplicateHandler {
                name: handler.name().to_string(),
            });
        }
        log::debug!(
            "registered property handler {} (priority {})",
            handler.name(),
            handler.priority()
        );
        table.push(handler);
        Ok(())
    }

    /// Removes a handler by name. The default handler is protected.
    pub fn unregister(&self, name: &str) -> Result<Option<Arc<dyn PropertyHandler>>, RegistryError> {
        if name == DefaultPropertyHandler::NAME {
            return Err(RegistryError::Protected { name: name.to_string() });
        }
        Ok(self.table.write().remove(name))
    }

    /// Snapshot of the handlers in resolution order.
    pub fn handlers(&self) -> HandlerList {
        self.table.read().snapshot()
    }

    pub fn handler_names(&self) -> Vec<String> {
        self.handlers().iter().map(|h| h.name().to_string()).collect()
    }

    /// Returns the handler that serves `property` on `target`.
    pub fn resolve(
        &self,
        ctx: &PropertyContext<'_>,
        target: &dyn PropertyAccess,
        property: &str,
    ) -> Option<Arc<dyn PropertyHandler>> {
        let handlers = self.handlers();
        let handler = handlers.iter().find(|h| h.can_handle(ctx, target, property)).cloned();
        if let Some(handler) = &handler {
            log::trace!("property {} resolved to handler {}", property, handler.name());
        }
        handler
    }

    /// Extracts one property through its handler.
    pub fn extract(
        &self,
        ctx: &PropertyContext<'_>,
        target: &dyn PropertyAccess,
        property: &str,
    ) -> Result<Option<Json>, HandlerError> {
        match self.resolve(ctx, target, property) {
            Some(handler) => handler.extract(ctx, target, property),
            None => Ok(None),
        }
    }

    /// Applies one property through its handler.
    pub fn apply(
        &self,
        ctx: &PropertyContext<'_>,
        target: &mut dyn PropertyAccess,
        property: &str,
        value: &Json,
    ) -> Result<(), HandlerError> {
        match self.resolve(ctx, &*target, property) {
            Some(handler) => handler.apply(ctx, target, property, value),
            None => Err(HandlerError::UnknownProperty {
                property: property.to_string(),
            }),
        }
    }

    /// Related properties of `property`, as declared by its handler.
    pub fn related_properties(
        &self,
        ctx: &PropertyContext<'_>,
        target: &dyn PropertyAccess,
        property: &str,
    ) -> Vec<String> {
        self.resolve(ctx, target, property)
            .map(|handler| handler.related_properties(ctx, property))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::{CanvasNodeBuilder, CanvasObject, HostValue};

    struct Upper {
        name: &'static str,
        priority: i32,
    }

    impl PropertyHandler for Upper {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn can_handle(&self, _ctx: &PropertyContext<'_>, _target: &dyn PropertyAccess, property: &str) -> bool {
            property == "nickName"
        }

        fn extract(
            &self,
            _ctx: &PropertyContext<'_>,
            target: &dyn PropertyAccess,
            property: &str,
        ) -> Result<Option<Json>, HandlerError> {
            Ok(target
                .get_property(property)
                .and_then(|v| v.as_text().map(|s| json!(format!("{}:{}", self.name, s.to_uppercase())))))
        }

        fn apply(
            &self,
            _ctx: &PropertyContext<'_>,
            target: &mut dyn PropertyAccess,
            property: &str,
            value: &Json,
        ) -> Result<(), HandlerError> {
            let text = value.as_str().unwrap_or_default().to_lowercase();
            Ok(target.set_property(property, HostValue::Text(text))?)
        }
    }

    fn node() -> crate::model::CanvasNode {
        CanvasNodeBuilder::new(crate::model::ComponentKind::named("Addition"))
            .nick_name("sum")
            .build()
    }

    #[test]
    fn test_default_handler_always_present() {
        let registry = PropertyRegistry::new();
        let codecs = CodecRegistry::with_builtins();
        let ctx = PropertyContext::new(&codecs, NodeFamily::Generic);
        let node = node();

        assert_eq!(registry.handler_names(), vec!["default"]);
        assert_eq!(registry.extract(&ctx, node.properties(), "nickName").unwrap(), Some(json!("sum")));
        assert_eq!(registry.extract(&ctx, node.properties(), "radius").unwrap(), None);
        assert!(matches!(
            registry.unregister("default"),
            Err(RegistryError::Protected { .. })
        ));
    }

    #[test]
    fn test_first_matching_handler_wins() {
        let registry = PropertyRegistry::new();
        registry.register(Arc::new(Upper { name: "low", priority: 10 })).unwrap();
        registry.register(Arc::new(Upper { name: "high", priority: 20 })).unwrap();
        registry.register(Arc::new(Upper { name: "tie", priority: 20 })).unwrap();
        let codecs = CodecRegistry::with_builtins();
        let ctx = PropertyContext::new(&codecs, NodeFamily::Generic);
        let node = node();

        assert_eq!(registry.handler_names(), vec!["high", "tie", "low", "default"]);
        assert_eq!(
            registry.extract(&ctx, node.properties(), "nickName").unwrap(),
            Some(json!("high:SUM"))
        );

        registry.unregister("high").unwrap();
        assert_eq!(
            registry.extract(&ctx, node.properties(), "nickName").unwrap(),
            Some(json!("tie:SUM"))
        );
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let registry = PropertyRegistry::with_builtins();
        let err = registry
            .register(Arc::new(Upper {
                name: "color",
                priority: 1,
            }))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateHandler { name: "color".into() });
        assert_eq!(registry.unregister("missing").unwrap().map(|h| h.name().to_string()), None);
    }

    #[test]
    fn test_apply_routes_through_handler() {
        let registry = PropertyRegistry::new();
        registry.register(Arc::new(Upper { name: "up", priority: 5 })).unwrap();
        let codecs = CodecRegistry::with_builtins();
        let ctx = PropertyContext::new(&codecs, NodeFamily::Generic);
        let mut node = node();

        registry
            .apply(&ctx, node.properties_mut(), "nickName", &json!("TOTAL"))
            .unwrap();
        assert_eq!(node.properties().get_property("nickName"), Some(HostValue::Text("total".into())));
        assert!(matches!(
            registry.apply(&ctx, node.properties_mut(), "radius", &json!(1)),
            Err(HandlerError::UnknownProperty { .. })
        ));
    }
}
