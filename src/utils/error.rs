//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while extracting tracks from a JiveXML document
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Cannot read input {path}: {source}")]
    InputUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("XML parsing failed: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Malformed input: {0}")]
    MalformedInput(#[from] MalformedInput),

    #[error("Invalid number '{token}' in <{field}> at position {index}")]
    ParseError {
        field: String,
        index: usize,
        token: String,
    },
}

/// Shape violations in a document that otherwise parsed
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MalformedInput {
    #[error("missing required attribute '{0}' on the root element")]
    MissingAttribute(&'static str),

    #[error("data inconsistency: {0}")]
    DataInconsistency(String),
}

/// Errors raised by the associative store
#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("Property '{property}' already declared on collection '{collection}'")]
    DuplicateProperty { collection: String, property: String },

    #[error("Type mismatch on {collection}.{property}: expected {expected}, found {found}")]
    TypeMismatch {
        collection: String,
        property: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Property '{property}' does not belong to collection '{collection}'")]
    ForeignProperty { collection: String, property: String },

    #[error("Unknown record {index} in collection #{collection}")]
    UnknownRecord { collection: usize, index: usize },
}

/// Errors raised while populating the store from an event
#[derive(Error, Debug, PartialEq)]
pub enum BuildError {
    #[error("Track arrays rejected: {0}")]
    MalformedInput(#[from] MalformedInput),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{collection} cannot hold a {element}")]
    ElementMismatch {
        collection: &'static str,
        element: &'static str,
    },
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),

    #[error("Invalid ig layout: {0}")]
    InvalidLayout(String),
}
