// src/error.rs
//! Defines the error types for document normalization runs.

use docprep_source::SourceError;
use docprep_types::{NodeId, TocId};
use thiserror::Error;

/// Raised by an event-bus listener.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EventError {
    #[error("Listener for '{event}' failed: {message}")]
    ListenerFailed { event: String, message: String },

    #[error("Data source error: {0}")]
    Source(#[from] SourceError),
}

impl EventError {
    pub fn listener(event: impl Into<String>, message: impl Into<String>) -> Self {
        EventError::ListenerFailed {
            event: event.into(),
            message: message.into(),
        }
    }
}

/// The main error enum for a normalization run. Every variant aborts the
/// whole document.
#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Unrecognized document structure: {0}")]
    UnrecognizedStructure(String),

    #[error("Node id '{0}' already exists")]
    DuplicateIdentifier(NodeId),

    #[error("TOC '{0}' already exists")]
    DuplicateTocIdentifier(TocId),

    #[error("Malformed '{kind}' node: {reason}")]
    MalformedNode { kind: &'static str, reason: String },

    #[error("Traversal event failed: {0}")]
    Event(EventError),

    #[error("Table data source error: {0}")]
    DataSource(#[from] SourceError),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PreprocessError {
    pub(crate) fn malformed(kind: &'static str, reason: impl Into<String>) -> Self {
        PreprocessError::MalformedNode {
            kind,
            reason: reason.into(),
        }
    }
}

// Source failures raised inside a listener surface as data-source errors.
impl From<EventError> for PreprocessError {
    fn from(e: EventError) -> Self {
        match e {
            EventError::Source(source) => PreprocessError::DataSource(source),
            other => PreprocessError::Event(other),
        }
    }
}
