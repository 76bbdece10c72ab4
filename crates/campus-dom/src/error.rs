//! Error types for document operations.

use thiserror::Error;

use crate::node::NodeId;

/// Errors produced by the document model.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomError {
    #[error("Invalid selector `{selector}` at offset {offset}: {message}")]
    InvalidSelector {
        selector: String,
        offset: usize,
        message: String,
    },

    #[error("Unknown node {0:?}")]
    UnknownNode(NodeId),

    #[error("Cannot append {child:?} to {parent:?}: would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("Invalid page description: {0}")]
    PageParse(String),
}

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, DomError>;

impl DomError {
    pub(crate) fn selector(selector: &str, offset: usize, message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            offset,
            message: message.into(),
        }
    }
}
