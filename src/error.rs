//! Error types for pagedom library.

use std::io;
use thiserror::Error;

/// Result type alias for pagedom operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building or mutating a document model.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading schema descriptions.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The textual form of an identifier is not valid.
    #[error("Invalid identifier format: {0:?}")]
    InvalidIdFormat(String),

    /// The identifier is already registered in this document scope.
    #[error("Duplicate identifier: {0}")]
    DuplicateId(String),

    /// No content node carries the identifier.
    #[error("Unknown identifier: {0}")]
    UnknownId(String),

    /// A value of the wrong kind was assigned to a variable.
    #[error("Variable '{variable}' holds {expected} values, got {found}")]
    WrongVariableKind {
        /// Variable name
        variable: String,
        /// Kind the variable holds
        expected: String,
        /// Kind of the rejected value
        found: String,
    },

    /// A rejecting constraint refused a value.
    #[error("Value {value} violates constraint {constraint}")]
    ConstraintViolation {
        /// The rejected value
        value: String,
        /// Description of the constraint
        constraint: String,
    },

    /// A constraint was constructed from unusable bounds.
    #[error("Invalid constraint: {0}")]
    InvalidConstraint(String),

    /// A variable with the same name already exists in the map.
    #[error("Duplicate variable: {0}")]
    DuplicateVariable(String),

    /// No variable with the given name exists in the map.
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    /// An attribute refers to an auxiliary type that was never declared.
    #[error("Attribute '{attribute}' of '{owner}' refers to unresolved type '{aux_type}'")]
    UnresolvedSchemaReference {
        /// Owning content type
        owner: String,
        /// Attribute name
        attribute: String,
        /// Referenced auxiliary type
        aux_type: String,
    },

    /// The schema event stream is structurally broken.
    #[error("Malformed schema description: {0}")]
    MalformedSchema(String),

    /// The schema description could not be decoded.
    #[error("Schema parsing error: {0}")]
    SchemaParse(String),

    /// No format model is known for the schema version.
    #[error("Unknown schema version: {0}")]
    UnknownSchemaVersion(String),

    /// A node kind cannot contain the given child kind.
    #[error("{parent} cannot contain {child}")]
    InvalidChild {
        /// Parent kind
        parent: String,
        /// Rejected child kind
        child: String,
    },

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SchemaParse(err.to_string())
    }
}

impl Error {
    /// Check if the error is recoverable by falling back to id generation.
    pub fn is_id_error(&self) -> bool {
        matches!(self, Error::DuplicateId(_) | Error::InvalidIdFormat(_))
    }
}
