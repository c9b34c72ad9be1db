//! Error types for the editor

use crate::NodeKey;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Unknown node type: {0}")]
    UnknownType(String),

    #[error("Unsupported version {version} for node type '{node_type}'")]
    UnsupportedVersion { node_type: String, version: u64 },

    #[error("Invalid placement: {0}")]
    InvalidPlacement(String),

    #[error("Node type already registered: {0}")]
    DuplicateType(String),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeKey),

    #[error("Node {0} is not a decorator node")]
    NotADecorator(NodeKey),

    #[error("Wrong node type for {key}: expected '{expected}', got '{actual}'")]
    WrongNodeType {
        key: NodeKey,
        expected: &'static str,
        actual: String,
    },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EditorError {
    /// Errors a document load can recover from by substituting an
    /// unknown-attachment node.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EditorError::UnknownType(_))
    }
}

pub type EditorResult<T> = Result<T, EditorError>;
