//! Fallback property handler: reads and writes any property by name.

use serde_json::Value as Json;

use crate::error::HandlerError;
use crate::model::PropertyAccess;
use crate::property::convert::{host_to_json, json_to_host};
use crate::property::{PropertyContext, PropertyHandler};

/// Direct get/set by name through [`PropertyAccess`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPropertyHandler;

impl DefaultPropertyHandler {
    pub const NAME: &'static str = "default";
}

impl PropertyHandler for DefaultPropertyHandler {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> i32 {
        i32::MIN
    }

    fn can_handle(&self, _ctx: &PropertyContext<'_>, _target: &dyn PropertyAccess, _property: &str) -> bool {
        true
    }

    fn extract(
        &self,
        ctx: &PropertyContext<'_>,
        target: &dyn PropertyAccess,
        property: &str,
    ) -> Result<Option<Json>, HandlerError> {
        Ok(target.get_property(property).map(|value| host_to_json(ctx.codecs, &value)))
    }

    fn apply(
        &self,
        ctx: &PropertyContext<'_>,
        target: &mut dyn PropertyAccess,
        property: &str,
        value: &Json,
    ) -> Result<(), HandlerError> {
        let current = target.get_property(property).ok_or_else(|| HandlerError::UnknownProperty {
            property: property.to_string(),
        })?;
        let value = json_to_host(ctx.codecs, property, value, Some(&current))?;
        target.set_property(property, value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::codec::registry::CodecRegistry;
    use crate::model::{CanvasNodeBuilder, CanvasObject, ComponentKind, HostValue, NodeFamily};

    #[test]
    fn test_round_trip_through_current_shape() {
        let codecs = CodecRegistry::with_builtins();
        let ctx = PropertyContext::new(&codecs, NodeFamily::Generic);
        let mut node = CanvasNodeBuilder::new(ComponentKind::named("Addition"))
            .property("iconDisplayMode", 2i64)
            .build();

        let handler = DefaultPropertyHandler;
        assert_eq!(handler.extract(&ctx, node.properties(), "locked").unwrap(), Some(json!(false)));

        handler.apply(&ctx, node.properties_mut(), "locked", &json!("true")).unwrap();
        assert_eq!(node.properties().get_property("locked"), Some(HostValue::Bool(true)));

        let err = handler
            .apply(&ctx, node.properties_mut(), "iconDisplayMode", &json!("loud"))
            .unwrap_err();
        assert!(matches!(err, HandlerError::InvalidValue { .. }));
        assert_eq!(node.properties().get_property("iconDisplayMode"), Some(HostValue::Integer(2)));
    }

    #[test]
    fn test_missing_property() {
        let codecs = CodecRegistry::with_builtins();
        let ctx = PropertyContext::new(&codecs, NodeFamily::Generic);
        let mut node = CanvasNodeBuilder::bare(ComponentKind::named("Addition")).build();
        let handler = DefaultPropertyHandler;

        assert_eq!(handler.extract(&ctx, node.properties(), "locked").unwrap(), None);
        assert!(matches!(
            handler.apply(&ctx, node.properties_mut(), "locked", &json!(true)),
            Err(HandlerError::UnknownProperty { .. })
        ));
    }
}
