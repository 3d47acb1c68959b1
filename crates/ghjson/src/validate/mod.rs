//! Structural validation for GhJSON documents.
//!
//! Decoding a document only checks that it is well-formed JSON of the right
//! shape. The checks here need the whole document in view: node ids must be
//! unique, every wire must land on a known node, and so on.
//!
//! Validation is optional. The engine tolerates documents that fail it where
//! it can (a missing parameter becomes a warning), but a producer should run
//! it before handing a document on.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::ValidationError;
use crate::model::{Connection, ConnectionEndpoint, Document, Extensions, NodeId, NodeRecord, ParameterSettings};

/// Validates a whole document. Returns the first problem found.
///
/// Checks, in order:
/// - every record passes [`validate_record`]
/// - node ids are unique
/// - every connection endpoint names a known node and a parameter
pub fn validate_document(doc: &Document) -> Result<(), ValidationError> {
    let mut ids = FxHashSet::default();
    for record in &doc.components {
        validate_record(record)?;
        if !ids.insert(record.id) {
            return Err(ValidationError::DuplicateId { id: record.id });
        }
    }

    for (index, connection) in doc.connections.iter().enumerate() {
        validate_connection(index, connection, &ids)?;
    }

    Ok(())
}

/// Collects every problem in a document instead of stopping at the first.
pub fn document_errors(doc: &Document) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut ids = FxHashSet::default();
    for record in &doc.components {
        errors.extend(record_errors(record));
        if !ids.insert(record.id) {
            errors.push(ValidationError::DuplicateId { id: record.id });
        }
    }
    for (index, connection) in doc.connections.iter().enumerate() {
        if let Err(err) = validate_connection(index, connection, &ids) {
            errors.push(err);
        }
    }
    errors
}

/// Validates a single record in isolation.
pub fn validate_record(record: &NodeRecord) -> Result<(), ValidationError> {
    match record_errors(record).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn record_errors(record: &NodeRecord) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if record.kind().is_anonymous() {
        errors.push(ValidationError::MissingKindIdentity { id: record.id });
    }

    for namespace in record.component_state.extensions.namespaces() {
        if !Extensions::is_valid_namespace(namespace) {
            errors.push(ValidationError::InvalidNamespace {
                id: record.id,
                namespace: namespace.to_string(),
            });
        }
    }

    for settings in [&record.input_settings, &record.output_settings] {
        errors.extend(duplicate_settings(record.id, settings));
    }

    errors
}

fn duplicate_settings(id: NodeId, settings: &[ParameterSettings]) -> Vec<ValidationError> {
    let mut counts: FxHashMap<&str, usize> = FxHashMap::default();
    let mut order = Vec::new();
    for s in settings {
        let count = counts.entry(s.parameter_name.as_str()).or_insert(0);
        if *count == 0 {
            order.push(s.parameter_name.as_str());
        }
        *count += 1;
    }

    order
        .into_iter()
        .filter_map(|name| {
            let count = counts.get(name).copied().unwrap_or(0);
            (count > 1).then(|| ValidationError::DuplicateParameter {
                id,
                name: name.to_string(),
                count,
            })
        })
        .collect()
}

fn validate_connection(
    index: usize,
    connection: &Connection,
    ids: &FxHashSet<NodeId>,
) -> Result<(), ValidationError> {
    for endpoint in [&connection.from, &connection.to] {
        validate_endpoint(index, endpoint, ids)?;
    }
    Ok(())
}

fn validate_endpoint(
    index: usize,
    endpoint: &ConnectionEndpoint,
    ids: &FxHashSet<NodeId>,
) -> Result<(), ValidationError> {
    if !ids.contains(&endpoint.id) {
        return Err(ValidationError::DanglingConnection { index, id: endpoint.id });
    }
    let named = endpoint.param_name.as_deref().is_some_and(|n| !n.is_empty());
    if !named && endpoint.param_index.is_none() {
        return Err(ValidationError::MissingEndpointParameter { index, id: endpoint.id });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map};

    use super::*;
    use crate::model::ComponentKind;

    fn record(id: NodeId, name: &str) -> NodeRecord {
        NodeRecord::new(id, &ComponentKind::named(name))
    }

    fn wire(from: NodeId, to: NodeId) -> Connection {
        Connection {
            from: ConnectionEndpoint::by_name(from, "Result"),
            to: ConnectionEndpoint::by_index(to, 0),
        }
    }

    fn settings(name: &str) -> ParameterSettings {
        ParameterSettings {
            parameter_name: name.to_string(),
            properties: Map::new(),
        }
    }

    #[test]
    fn test_valid_document() {
        let doc = Document {
            schema_version: Some("1.0".into()),
            components: vec![record(1, "Number Slider"), record(2, "Addition")],
            connections: vec![wire(1, 2)],
        };
        assert_eq!(validate_document(&doc), Ok(()));
        assert!(document_errors(&doc).is_empty());
    }

    #[test]
    fn test_duplicate_id() {
        let doc = Document {
            components: vec![record(1, "Panel"), record(1, "Addition")],
            ..Default::default()
        };
        assert_eq!(validate_document(&doc), Err(ValidationError::DuplicateId { id: 1 }));
    }

    #[test]
    fn test_anonymous_record() {
        let doc = Document {
            components: vec![record(4, "  ")],
            ..Default::default()
        };
        assert_eq!(
            validate_document(&doc),
            Err(ValidationError::MissingKindIdentity { id: 4 })
        );
    }

    #[test]
    fn test_connection_endpoints() {
        let mut doc = Document {
            components: vec![record(1, "Panel"), record(2, "Addition")],
            connections: vec![wire(1, 3)],
            ..Default::default()
        };
        assert_eq!(
            validate_document(&doc),
            Err(ValidationError::DanglingConnection { index: 0, id: 3 })
        );

        doc.connections = vec![
            wire(1, 2),
            Connection {
                from: ConnectionEndpoint {
                    id: 1,
                    param_name: Some(String::new()),
                    param_index: None,
                },
                to: ConnectionEndpoint::by_name(2, "A"),
            },
        ];
        assert_eq!(
            validate_document(&doc),
            Err(ValidationError::MissingEndpointParameter { index: 1, id: 1 })
        );
    }

    #[test]
    fn test_record_namespaces_and_settings() {
        let mut rec = record(7, "Panel");
        rec.component_state.extensions.insert_raw("gh.panel", json!({}));
        rec.component_state.extensions.insert_raw("Vendor", json!(1));
        rec.input_settings = vec![settings("A"), settings("B"), settings("A")];
        rec.output_settings = vec![settings("A")];

        assert_eq!(
            validate_record(&rec),
            Err(ValidationError::InvalidNamespace {
                id: 7,
                namespace: "Vendor".into()
            })
        );

        let doc = Document {
            components: vec![rec],
            ..Default::default()
        };
        let errors = document_errors(&doc);
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[1],
            ValidationError::DuplicateParameter {
                id: 7,
                name: "A".into(),
                count: 2
            }
        );
    }
}
