//! Static property catalog.
//!
//! Maps every known property name to the categories it belongs to, and every
//! node family to the categories it exposes. Adding a family means adding a
//! row here; the filter logic never changes.

use bitflags::bitflags;
use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use crate::model::NodeFamily;

bitflags! {
    /// Property categories a rule can select.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PropertyCategories: u32 {
        /// Identity and UI flags every node has.
        const CORE = 1 << 0;
        /// Per-parameter settings and persistent data.
        const PARAMETER = 1 << 1;
        const SLIDER = 1 << 2;
        const PANEL = 1 << 3;
        const VALUE_LIST = 1 << 4;
        const SCRIPT = 1 << 5;
        const TOGGLE = 1 << 6;
        const SWATCH = 1 << 7;
        const SCRIBBLE = 1 << 8;

        /// Every family-specific category.
        const FAMILIES = Self::SLIDER.bits()
            | Self::PANEL.bits()
            | Self::VALUE_LIST.bits()
            | Self::SCRIPT.bits()
            | Self::TOGGLE.bits()
            | Self::SWATCH.bits()
            | Self::SCRIBBLE.bits();
    }
}

impl PropertyCategories {
    /// Categories exposed by nodes of `family`.
    pub fn for_family(family: NodeFamily) -> PropertyCategories {
        let specific = match family {
            NodeFamily::Generic => PropertyCategories::empty(),
            NodeFamily::Parameter => PropertyCategories::PARAMETER,
            NodeFamily::NumberSlider => PropertyCategories::SLIDER,
            NodeFamily::Panel => PropertyCategories::PANEL,
            NodeFamily::ValueList => PropertyCategories::VALUE_LIST,
            NodeFamily::Script => PropertyCategories::SCRIPT,
            NodeFamily::BooleanToggle => PropertyCategories::TOGGLE,
            NodeFamily::ColourSwatch => PropertyCategories::SWATCH,
            NodeFamily::Scribble => PropertyCategories::SCRIBBLE,
        };
        PropertyCategories::CORE | specific
    }
}

/// Known properties in serialization order.
pub const CATALOG: &[(&str, PropertyCategories)] = &[
    ("nickName", PropertyCategories::CORE),
    ("locked", PropertyCategories::CORE),
    ("hidden", PropertyCategories::CORE),
    ("selected", PropertyCategories::CORE),
    ("iconDisplayMode", PropertyCategories::CORE),
    ("dataMapping", PropertyCategories::PARAMETER),
    ("reverse", PropertyCategories::PARAMETER),
    ("simplify", PropertyCategories::PARAMETER),
    ("optional", PropertyCategories::PARAMETER),
    ("expression", PropertyCategories::PARAMETER),
    ("persistentData", PropertyCategories::PARAMETER),
    ("currentValue", PropertyCategories::SLIDER),
    ("minimum", PropertyCategories::SLIDER),
    ("maximum", PropertyCategories::SLIDER),
    ("decimalPlaces", PropertyCategories::SLIDER),
    ("text", PropertyCategories::PANEL.union(PropertyCategories::SCRIBBLE)),
    ("font", PropertyCategories::PANEL.union(PropertyCategories::SCRIBBLE)),
    ("multiline", PropertyCategories::PANEL),
    ("wrap", PropertyCategories::PANEL),
    ("drawIndices", PropertyCategories::PANEL),
    ("drawPaths", PropertyCategories::PANEL),
    ("alignment", PropertyCategories::PANEL),
    ("color", PropertyCategories::PANEL.union(PropertyCategories::SWATCH)),
    ("listMode", PropertyCategories::VALUE_LIST),
    ("listItems", PropertyCategories::VALUE_LIST),
    ("script", PropertyCategories::SCRIPT),
    ("scriptLanguage", PropertyCategories::SCRIPT),
    ("standardOutput", PropertyCategories::SCRIPT),
    ("value", PropertyCategories::TOGGLE),
];

lazy_static! {
    static ref CATALOG_INDEX: FxHashMap<&'static str, PropertyCategories> =
        CATALOG.iter().copied().collect();
}

/// Categories of a catalog property, or `None` if it is not in the catalog.
pub fn categories_of(property: &str) -> Option<PropertyCategories> {
    CATALOG_INDEX.get(property).copied()
}
