//! Fallback object handler for the flags every node carries.

use serde_json::Value as Json;

use crate::error::HandlerError;
use crate::handler::{HandlerContext, ObjectHandler, StateField};
use crate::model::{CanvasObject, ComponentKind, ComponentState, NodeFamily};

/// Generic UI flags every node has.
///
/// Flags are emitted only when set, so typical records carry no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultObjectHandler;

impl DefaultObjectHandler {
    pub const NAME: &'static str = "default";

    fn flag(ctx: &HandlerContext<'_>, node: &dyn CanvasObject, property: &str) -> Option<bool> {
        ctx.host(node, property)
            .ok()
            .and_then(|v| v.as_bool())
            .filter(|set| *set)
    }
}

impl ObjectHandler for DefaultObjectHandler {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> i32 {
        i32::MIN
    }

    fn can_handle(&self, _kind: &ComponentKind, _family: NodeFamily) -> bool {
        true
    }

    fn owned_fields(&self) -> Vec<StateField> {
        vec![StateField::Selected, StateField::Locked, StateField::Hidden]
    }

    fn extract(&self, ctx: &HandlerContext<'_>, node: &dyn CanvasObject) -> Result<ComponentState, HandlerError> {
        Ok(ComponentState {
            selected: Self::flag(ctx, node, "selected"),
            locked: Self::flag(ctx, node, "locked"),
            hidden: Self::flag(ctx, node, "hidden"),
            ..Default::default()
        })
    }

    fn apply(
        &self,
        ctx: &HandlerContext<'_>,
        node: &mut dyn CanvasObject,
        state: &ComponentState,
    ) -> Result<(), HandlerError> {
        let mut errors = Vec::new();
        for (property, flag) in [
            ("selected", state.selected),
            ("locked", state.locked),
            ("hidden", state.hidden),
        ] {
            if let Some(flag) = flag {
                if let Err(err) = ctx.write(node, property, &Json::Bool(flag)) {
                    errors.push(err);
                }
            }
        }
        HandlerError::collect(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::registry::CodecRegistry;
    use crate::handler::HandlerRegistry;
    use crate::model::{CanvasNodeBuilder, HostValue};
    use crate::property::PropertyRegistry;

    #[test]
    fn test_flags_emitted_only_when_set() {
        let codecs = CodecRegistry::with_builtins();
        let properties = PropertyRegistry::with_builtins();
        let ctx = HandlerContext::new(&codecs, &properties, 1);
        let node = CanvasNodeBuilder::new(ComponentKind::named("Addition")).locked(true).build();

        let state = DefaultObjectHandler.extract(&ctx, &node).unwrap();
        assert_eq!(state.locked, Some(true));
        assert_eq!(state.hidden, None);
        assert_eq!(state.selected, None);
    }

    #[test]
    fn test_missing_flag_does_not_block_the_rest() {
        let codecs = CodecRegistry::with_builtins();
        let properties = PropertyRegistry::with_builtins();
        let ctx = HandlerContext::new(&codecs, &properties, 3);
        // Only `hidden` is declared, so `selected` and `locked` fail first
        let mut node = CanvasNodeBuilder::bare(ComponentKind::named("Addition"))
            .property("hidden", false)
            .build();
        let state = ComponentState {
            selected: Some(true),
            locked: Some(true),
            hidden: Some(true),
            ..Default::default()
        };

        let err = DefaultObjectHandler.apply(&ctx, &mut node, &state).unwrap_err();
        let errors = err.into_errors();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| matches!(e, HandlerError::UnknownProperty { .. })));
        assert_eq!(node.properties.get("hidden"), Some(&HostValue::Bool(true)));

        node.properties.declare("hidden", false);
        let warnings = HandlerRegistry::new().apply_state(&ctx, &mut node, &state);
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.subject == "default" && w.node == 3));
        assert_eq!(node.properties.get("hidden"), Some(&HostValue::Bool(true)));
    }
}
