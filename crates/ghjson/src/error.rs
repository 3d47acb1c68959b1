//! Error types for value encoding, data-tree conversion, handlers and records.

use thiserror::Error;

use crate::model::NodeId;

/// Stable error codes, shared by hard errors and collected warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// C001: No codec registered for a value kind
    UnsupportedType,
    /// C002: Prefix not registered
    UnknownPrefix,
    /// C003: Payload does not match the kind's grammar
    MalformedPayload,
    /// C004: Prefix or kind already registered
    RegistrationConflict,
    /// T001: Data tree has the wrong JSON shape or a corrupt leaf
    MalformedTree,
    /// T002: Data-tree path could not be parsed
    PathParse,
    /// H001: A handler failed during extraction or application
    HandlerFailure,
    /// H002: Handler registration or removal was refused
    HandlerRegistration,
    /// R001: Record violates the structural identity contract
    InvalidRecord,
}

impl ErrorCode {
    /// Returns the error code string (e.g., "C002").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::UnsupportedType => "C001",
            ErrorCode::UnknownPrefix => "C002",
            ErrorCode::MalformedPayload => "C003",
            ErrorCode::RegistrationConflict => "C004",
            ErrorCode::MalformedTree => "T001",
            ErrorCode::PathParse => "T002",
            ErrorCode::HandlerFailure => "H001",
            ErrorCode::HandlerRegistration => "H002",
            ErrorCode::InvalidRecord => "R001",
        }
    }
}

/// Error from the prefixed value codec.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("[C001] no codec registered for value kind {kind}")]
    UnsupportedType { kind: String },

    #[error("[C002] unknown value prefix {prefix:?}")]
    UnknownPrefix { prefix: String },

    #[error("[C003] malformed {kind} payload {payload:?}: {reason}")]
    MalformedPayload {
        kind: String,
        payload: String,
        reason: &'static str,
    },

    #[error("[C004] prefix {prefix:?} conflicts with the codec registered for kind {kind}")]
    Conflict { prefix: String, kind: String },
}

impl CodecError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CodecError::UnsupportedType { .. } => ErrorCode::UnsupportedType,
            CodecError::UnknownPrefix { .. } => ErrorCode::UnknownPrefix,
            CodecError::MalformedPayload { .. } => ErrorCode::MalformedPayload,
            CodecError::Conflict { .. } => ErrorCode::RegistrationConflict,
        }
    }

    pub(crate) fn malformed(kind: impl Into<String>, payload: &str, reason: &'static str) -> Self {
        CodecError::MalformedPayload {
            kind: kind.into(),
            payload: payload.to_string(),
            reason,
        }
    }
}

/// Error while converting a data tree to or from JSON.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    #[error("[T001] expected an object or array for a data tree, found {found}")]
    InvalidShape { found: &'static str },

    #[error("[T001] branch {path} must be an object or array")]
    InvalidBranch { path: String },

    #[error("[T001] item {key}: {source}")]
    Item {
        key: String,
        #[source]
        source: CodecError,
    },

    #[error("[T001] item {key} could not be constructed: {message}")]
    Construct { key: String, message: String },
}

impl TreeError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        ErrorCode::MalformedTree
    }
}

/// A path string that does not follow the `{a;b;c}` grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[T002] invalid data-tree path {input:?}: {reason}")]
pub struct PathParseError {
    pub input: String,
    pub reason: &'static str,
}

/// Error returned by a host node when a property cannot be set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("unknown property {0}")]
    UnknownProperty(String),

    #[error("{property}: {message}")]
    Rejected { property: String, message: String },
}

/// Error raised by a property or object handler.
///
/// These never abort a conversion: the engine turns them into
/// [`ConversionWarning`]s and moves on to the next field or handler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HandlerError {
    #[error("[H001] property {property} is not defined on this node")]
    UnknownProperty { property: String },

    #[error("[H001] property {property} rejected value: {reason}")]
    InvalidValue { property: String, reason: String },

    #[error("[H001] host rejected {property}: {message}")]
    Host { property: String, message: String },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Several properties of one handler failed; the others were applied.
    #[error("[H001] {} properties failed: {}", .0.len(), join_errors(.0))]
    Several(Vec<HandlerError>),
}

fn join_errors(errors: &[HandlerError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

impl From<HostError> for HandlerError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::UnknownProperty(property) => HandlerError::UnknownProperty { property },
            HostError::Rejected { property, message } => HandlerError::Host { property, message },
        }
    }
}

impl HandlerError {
    /// Folds per-property failures into one result.
    pub fn collect(mut errors: Vec<HandlerError>) -> Result<(), HandlerError> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(HandlerError::Several(errors)),
        }
    }

    /// The individual failures behind this error.
    pub fn into_errors(self) -> Vec<HandlerError> {
        match self {
            HandlerError::Several(errors) => errors.into_iter().flat_map(HandlerError::into_errors).collect(),
            err => vec![err],
        }
    }

    pub(crate) fn invalid(property: &str, reason: impl Into<String>) -> Self {
        HandlerError::InvalidValue {
            property: property.to_string(),
            reason: reason.into(),
        }
    }
}

/// Refused handler registry mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("[H002] a handler named {name} is already registered")]
    DuplicateHandler { name: String },

    #[error("[H002] handler {name} is built in and cannot be unregistered")]
    Protected { name: String },
}

impl RegistryError {
    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        ErrorCode::HandlerRegistration
    }
}

/// Hard failure of a record conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("[R001] node {id} has neither a name nor a componentGuid")]
    MissingKindIdentity { id: NodeId },

    #[error("[R001] node {id} is a {record} record but the target node is a {node}")]
    KindMismatch {
        id: NodeId,
        record: String,
        node: String,
    },

    #[error("[R001] no host node can be created for kind {kind}")]
    UnknownKind { kind: String },

    #[error("[R001] invalid document JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for RecordError {
    fn from(err: serde_json::Error) -> Self {
        RecordError::Json(err.to_string())
    }
}

/// Error during structural validation of a document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("duplicate node id {id}")]
    DuplicateId { id: NodeId },

    #[error("node {id} has neither a name nor a componentGuid")]
    MissingKindIdentity { id: NodeId },

    #[error("connection {index} references unknown node {id}")]
    DanglingConnection { index: usize, id: NodeId },

    #[error("connection {index} endpoint on node {id} names no parameter")]
    MissingEndpointParameter { index: usize, id: NodeId },

    #[error("node {id} has an invalid extension namespace {namespace:?}")]
    InvalidNamespace { id: NodeId, namespace: String },

    #[error("node {id} has {count} settings for parameter {name:?}")]
    DuplicateParameter { id: NodeId, name: String, count: usize },
}

/// A non-fatal problem collected while converting one node.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionWarning {
    /// Error classification.
    pub code: ErrorCode,
    /// Node the warning belongs to.
    pub node: NodeId,
    /// Handler name, property name or field that failed.
    pub subject: String,
    /// Human-readable detail.
    pub message: String,
}

impl ConversionWarning {
    pub(crate) fn new(code: ErrorCode, node: NodeId, subject: impl Into<String>, message: impl Into<String>) -> Self {
        let warning = Self {
            code,
            node,
            subject: subject.into(),
            message: message.into(),
        };
        log::warn!(
            "[{}] node {} ({}): {}",
            warning.code.code(),
            warning.node,
            warning.subject,
            warning.message
        );
        warning
    }

    pub(crate) fn from_handler(node: NodeId, subject: impl Into<String>, err: &HandlerError) -> Self {
        Self::new(ErrorCode::HandlerFailure, node, subject, err.to_string())
    }
}

impl std::fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] node {} ({}): {}", self.code.code(), self.node, self.subject, self.message)
    }
}
