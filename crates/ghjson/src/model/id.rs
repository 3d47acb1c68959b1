//! Node and component-kind identifiers.
//!
//! Component kinds are identified by a GUID and/or a display name. Node
//! instances carry a numeric document id and, optionally, an instance GUID.

use std::fmt;

use uuid::Uuid;

/// Numeric node id, unique within a document.
///
/// When a record carries both an id and an instance GUID, the id is the one
/// used by every intra-document reference.
pub type NodeId = u32;

/// Declared kind of a canvas node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ComponentKind {
    /// Display name, e.g. "Number Slider".
    pub name: String,
    /// Stable component GUID.
    pub guid: Option<Uuid>,
}

impl ComponentKind {
    pub fn new(name: impl Into<String>, guid: Option<Uuid>) -> Self {
        Self {
            name: name.into(),
            guid,
        }
    }

    /// Kind identified only by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, None)
    }

    /// Returns true if neither a name nor a GUID is present.
    pub fn is_anonymous(&self) -> bool {
        self.name.trim().is_empty() && self.guid.is_none()
    }

    /// Cache key for this kind; the GUID wins over the name.
    pub fn key(&self) -> KindKey {
        match self.guid {
            Some(guid) => KindKey::Guid(guid),
            None => KindKey::Name(self.name.trim().to_ascii_lowercase()),
        }
    }

    /// Returns true if `other` names the same kind.
    ///
    /// GUIDs are compared when both sides carry one, names otherwise.
    pub fn matches(&self, other: &ComponentKind) -> bool {
        match (self.guid, other.guid) {
            (Some(a), Some(b)) => a == b,
            _ => self.name.trim().eq_ignore_ascii_case(other.name.trim()),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.guid, self.name.is_empty()) {
            (Some(guid), false) => write!(f, "{} ({})", self.name, format_guid(guid)),
            (Some(guid), true) => f.write_str(&format_guid(guid)),
            (None, _) => f.write_str(&self.name),
        }
    }
}

/// Hashable identity of a component kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KindKey {
    Guid(Uuid),
    Name(String),
}

/// Formats a GUID as lowercase hyphenated text.
pub fn format_guid(guid: &Uuid) -> String {
    guid.hyphenated().to_string()
}

/// Parses a GUID with or without hyphens or braces.
pub fn parse_guid(s: &str) -> Option<Uuid> {
    let trimmed = s.trim().trim_start_matches('{').trim_end_matches('}');
    Uuid::parse_str(trimmed).ok()
}

/// Generates a fresh random instance GUID.
pub fn new_instance_guid() -> Uuid {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_guid_forms() {
        let plain = "57da07bd-ecab-415d-9d86-af36d7073abc";
        let braced = "{57DA07BD-ECAB-415D-9D86-AF36D7073ABC}";
        let compact = "57da07bdecab415d9d86af36d7073abc";

        let a = parse_guid(plain).unwrap();
        assert_eq!(parse_guid(braced), Some(a));
        assert_eq!(parse_guid(compact), Some(a));
        assert_eq!(format_guid(&a), plain);
        assert_eq!(parse_guid("not-a-guid"), None);
    }

    #[test]
    fn test_kind_key_prefers_guid() {
        let guid = parse_guid("57da07bd-ecab-415d-9d86-af36d7073abc").unwrap();
        let kind = ComponentKind::new("Number Slider", Some(guid));
        assert_eq!(kind.key(), KindKey::Guid(guid));
        assert_eq!(
            ComponentKind::named(" Panel ").key(),
            KindKey::Name("panel".to_string())
        );
    }

    #[test]
    fn test_kind_matches() {
        let guid = new_instance_guid();
        let a = ComponentKind::new("Panel", Some(guid));
        let b = ComponentKind::new("Renamed", Some(guid));
        assert!(a.matches(&b));
        assert!(ComponentKind::named("panel").matches(&a));
        assert!(!ComponentKind::named("Slider").matches(&a));
        assert!(ComponentKind::default().is_anonymous());
    }
}
