//! Network-subsystem error type.

use thiserror::Error;

use rv_core::{AttrError, NodeId};

/// Errors produced by `rv-network`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("link {link:?} references unknown node {node:?}")]
    UnknownNode { link: String, node: String },

    #[error("duplicate {kind} id {id:?}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("link {link:?} has invalid length {length}")]
    InvalidLength { link: String, length: f64 },

    #[error(transparent)]
    InvalidAttribute(#[from] AttrError),

    #[error("unsupported character encoding {0:?}")]
    UnsupportedEncoding(String),

    #[error("malformed network XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
