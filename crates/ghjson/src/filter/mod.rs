//! Context-based property selection.
//!
//! A [`PropertyRule`] is a category set plus explicit include and exclude
//! lists. The three [`SerializationContext`]s are just three such rules, and
//! a caller-supplied rule behaves exactly like them.
//!
//! Exclude always wins over include, and include wins over categories.

pub mod catalog;
pub mod prune;

use rustc_hash::FxHashSet;

pub use catalog::{categories_of, PropertyCategories, CATALOG};
pub use prune::{is_default, should_prune, PRUNE_EXCEPTIONS};

use crate::model::{CanvasObject, NodeFamily};

/// Named serialization profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SerializationContext {
    /// Everything the catalog knows.
    #[default]
    Standard,
    /// Drops state that is redundant with other fields.
    Optimized,
    /// Minimal documents for previews and prompts.
    Lite,
}

impl SerializationContext {
    /// The rule this context stands for.
    pub fn rule(&self) -> PropertyRule {
        match self {
            SerializationContext::Standard => PropertyRule::new(PropertyCategories::all()),
            SerializationContext::Optimized => PropertyRule::new(PropertyCategories::all()).exclude([
                "selected",
                "minimum",
                "maximum",
                "decimalPlaces",
                "iconDisplayMode",
            ]),
            SerializationContext::Lite => PropertyRule::new(PropertyCategories::CORE | PropertyCategories::FAMILIES)
                .exclude([
                    "selected",
                    "locked",
                    "hidden",
                    "iconDisplayMode",
                    "font",
                    "drawIndices",
                    "drawPaths",
                ])
                .include(["persistentData"]),
        }
    }
}

/// Declarative property selection rule.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropertyRule {
    pub categories: PropertyCategories,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl PropertyRule {
    pub fn new(categories: PropertyCategories) -> Self {
        Self {
            categories,
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Adds names that are allowed regardless of category.
    pub fn include<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(names.into_iter().map(Into::into));
        self
    }

    /// Adds names that are never allowed.
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }
}

/// Compiled [`PropertyRule`].
#[derive(Debug, Clone)]
pub struct PropertyFilter {
    rule: PropertyRule,
    include: FxHashSet<String>,
    exclude: FxHashSet<String>,
}

impl PropertyFilter {
    pub fn new(rule: PropertyRule) -> Self {
        let include = rule.include.iter().cloned().collect();
        let exclude = rule.exclude.iter().cloned().collect();
        Self { rule, include, exclude }
    }

    pub fn for_context(context: SerializationContext) -> Self {
        Self::new(context.rule())
    }

    pub fn rule(&self) -> &PropertyRule {
        &self.rule
    }

    pub fn is_excluded(&self, property: &str) -> bool {
        self.exclude.contains(property)
    }

    /// Returns true if `property` participates for nodes of `family`.
    pub fn is_allowed(&self, family: NodeFamily, property: &str) -> bool {
        if self.exclude.contains(property) {
            return false;
        }
        if self.include.contains(property) {
            return true;
        }
        match categories_of(property) {
            Some(categories) => categories
                .intersection(self.rule.categories)
                .intersects(PropertyCategories::for_family(family)),
            None => false,
        }
    }

    /// Allowed properties for `family`, catalog entries first, then
    /// non-catalog includes in include-list order.
    pub fn allowed_properties(&self, family: NodeFamily) -> Vec<String> {
        let mut out: Vec<String> = CATALOG
            .iter()
            .map(|(name, _)| *name)
            .filter(|name| self.is_allowed(family, name))
            .map(str::to_string)
            .collect();
        for name in &self.rule.include {
            if categories_of(name).is_none() && !self.exclude.contains(name) && !out.contains(name) {
                out.push(name.clone());
            }
        }
        out
    }

    /// Allowed properties for a live node.
    pub fn allowed_for(&self, node: &dyn CanvasObject) -> Vec<String> {
        self.allowed_properties(node.family())
    }
}

impl Default for PropertyFilter {
    fn default() -> Self {
        Self::for_context(SerializationContext::Standard)
    }
}

impl From<SerializationContext> for PropertyFilter {
    fn from(context: SerializationContext) -> Self {
        Self::for_context(context)
    }
}
