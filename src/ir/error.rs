//! Error types for building, binding and composing Dynamics.
//!
//! Every stage has its own error enum so callers can tell a malformed
//! declaration (`ModelError`) from a dangling reference (`BindError`), a
//! bad port wiring (`ConnectionError`) or a failure of the product
//! construction itself (`ComposeError`). All of them are construction-time
//! errors: a model that produces one is not usable and nothing is
//! partially applied.

use std::ops::Range;

use thiserror::Error;

/// A failure to parse an expression string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at {}..{} in '{source_text}'", .span.start, .span.end)]
pub struct ParseError {
    /// Human-readable description
    pub message: String,
    /// Byte range in `source_text` the error points at
    pub span: Range<usize>,
    /// The full text that was being parsed
    pub source_text: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Range<usize>, source_text: &str) -> Self {
        Self {
            message: message.into(),
            span,
            source_text: source_text.to_string(),
        }
    }
}

/// Errors raised while declaring or mutating a Dynamics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("duplicate name '{name}' in {scope}")]
    DuplicateName { scope: String, name: String },

    #[error("'{name}' is not a valid identifier")]
    InvalidIdentifier { name: String },

    #[error("'{name}' is a reserved identifier and cannot be declared in '{component}'")]
    ReservedName { component: String, name: String },

    #[error("cannot modify {what}: it is immutable")]
    Immutable { what: String },

    #[error("symbol '{name}' is not declared in '{component}'")]
    UnknownSymbol { component: String, name: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Bind(#[from] BindError),
}

/// Errors raised by `Dynamics::bind`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error(
        "transition in regime '{regime}' of '{component}' targets unknown regime '{target}'"
    )]
    UnresolvedRegime {
        component: String,
        regime: String,
        target: String,
    },

    #[error("{context} in '{component}' refers to '{port}', which is not {expected}")]
    UnboundPort {
        component: String,
        context: String,
        port: String,
        expected: &'static str,
    },

    #[error("{context} in '{component}' refers to undeclared state variable '{variable}'")]
    UnknownVariable {
        component: String,
        context: String,
        variable: String,
    },

    #[error("duplicate {what} '{name}' in regime '{regime}' of '{component}'")]
    DuplicateName {
        component: String,
        regime: String,
        what: &'static str,
        name: String,
    },
}

/// Errors raised while resolving a single port connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("unknown sub-component '{name}'")]
    UnknownSubComponent { name: String },

    #[error("sub-component '{component}' has no port named '{port}'")]
    UnknownPort { component: String, port: String },

    #[error("invalid port connection {sender} -> {receiver}: {reason}")]
    InvalidPortConnection {
        sender: String,
        receiver: String,
        reason: String,
    },

    #[error(
        "dimension mismatch in connection {sender} ({send_dimension}) -> {receiver} ({receive_dimension})"
    )]
    DimensionMismatch {
        sender: String,
        send_dimension: String,
        receiver: String,
        receive_dimension: String,
    },
}

/// Errors raised while composing a MultiDynamics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComposeError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error("duplicate name '{name}' in {scope} of '{component}'")]
    DuplicateName {
        component: String,
        scope: &'static str,
        name: String,
    },

    #[error("invalid port exposure '{name}': {reason}")]
    InvalidExposure { name: String, reason: String },

    #[error("invalid port connection into '{receiver}' in '{component}': {reason}")]
    InvalidPortConnection {
        component: String,
        receiver: String,
        reason: String,
    },

    #[error(
        "event cascade cycle in '{component}': port '{port}' of '{sub_component}' fires twice while resolving a transition out of regime '{regime}'"
    )]
    EventCascadeCycle {
        component: String,
        regime: String,
        sub_component: String,
        port: String,
    },

    #[error(
        "event fan-in in '{component}': port '{port}' of '{sub_component}' receives more than one event while resolving a transition out of regime '{regime}'"
    )]
    EventFanIn {
        component: String,
        regime: String,
        sub_component: String,
        port: String,
    },
}
