//! Compile error taxonomy.
//!
//! Every error here is fail-fast: it aborts the whole compile and produces
//! no partial predicate. The one deliberately-swallowed failure class is
//! literal coercion, which degrades to a null operand instead (see
//! `coerce`).

use sieveql_ir::{Arity, Operator};
use std::fmt;
use thiserror::Error;

/// Why an attribute access was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The attribute appears on the type's blacklist.
    Blacklisted,
    /// The type has a non-empty whitelist that omits the attribute.
    NotWhitelisted,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DenyReason::Blacklisted => "blacklisted",
            DenyReason::NotWhitelisted => "not whitelisted",
        };
        write!(f, "{s}")
    }
}

/// Errors raised while compiling a filter or sort specification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// A selector segment did not resolve against the current schema.
    #[error("unknown property '{property}' on entity '{entity}'")]
    UnknownProperty {
        /// Entity the segment was resolved against.
        entity: String,
        /// The unresolved segment.
        property: String,
    },

    /// Access control rejected an attribute hop.
    #[error("access to '{entity}.{property}' denied: {reason}")]
    AccessDenied {
        /// Entity owning the attribute.
        entity: String,
        /// The denied attribute.
        property: String,
        /// Whitelist or blacklist outcome.
        reason: DenyReason,
    },

    /// Wrong number of arguments for an operator.
    #[error("operator '{operator}' expects {expected} argument(s), got {got}")]
    ArityMismatch {
        /// The offending operator.
        operator: Operator,
        /// Expected argument count.
        expected: Arity,
        /// Actual argument count.
        got: usize,
    },

    /// Operator applied to a type that cannot support it.
    #[error("operator '{operator}' is not applicable to type {type_name}")]
    TypeMismatch {
        /// The offending operator.
        operator: Operator,
        /// Name of the terminal attribute type.
        type_name: String,
    },

    /// Operator with no default semantics and no registered builder.
    #[error("unsupported operator '{0}'")]
    UnsupportedOperator(Operator),

    /// Entity type absent from the schema registry.
    #[error("entity '{0}' is not managed by the schema registry")]
    NotManaged(String),

    /// Selector ends on an attribute that cannot be compared directly
    /// (an embedded object or a structured collection).
    #[error("selector '{0}' does not terminate at a comparable attribute")]
    NonTerminalSelector(String),

    /// Malformed JSON-relative key path.
    #[error("invalid json path: {0}")]
    InvalidJsonPath(String),

    /// Malformed sort specification segment.
    #[error("invalid sort specification: {0}")]
    InvalidSort(String),
}

impl CompileError {
    /// Create an unknown-property error.
    pub fn unknown_property(entity: impl Into<String>, property: impl Into<String>) -> Self {
        CompileError::UnknownProperty {
            entity: entity.into(),
            property: property.into(),
        }
    }

    /// Create an access-denied error.
    pub fn denied(
        entity: impl Into<String>,
        property: impl Into<String>,
        reason: DenyReason,
    ) -> Self {
        CompileError::AccessDenied {
            entity: entity.into(),
            property: property.into(),
            reason,
        }
    }

    /// Create an arity-mismatch error.
    pub fn arity(operator: &Operator, got: usize) -> Self {
        CompileError::ArityMismatch {
            operator: operator.clone(),
            expected: operator.arity(),
            got,
        }
    }
}
