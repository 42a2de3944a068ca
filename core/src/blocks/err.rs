use crate::blocks::NodeId;
use crate::error::{BlockwrightErrorExt, Level};
use crate::location::{Location, Span};

/// A structural edit that the tree refused (wrong role, stale id, cycle, ...).
#[derive(Debug, Clone)]
pub struct TreeError {
    level: Level,
    message: String,
    issuer: String,
    node: Option<NodeId>,
}

impl TreeError {
    pub fn with(message: String, issuer: &str, node: Option<NodeId>) -> Self {
        TreeError {
            level: Level::Error,
            message,
            issuer: issuer.to_string(),
            node,
        }
    }

    pub fn boxed(message: String, issuer: &str, node: Option<NodeId>) -> Box<dyn BlockwrightErrorExt> {
        Box::new(Self::with(message, issuer, node))
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.node {
            Some(node) => write!(f, "{} (node {})", self.message, node),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for TreeError {}

impl BlockwrightErrorExt for TreeError {
    fn level(&self) -> Level {
        self.level
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        self.issuer.clone()
    }

    fn span(&self) -> Option<Span> {
        None
    }

    fn location(&self) -> Option<Location> {
        None
    }
}

/// A persisted block record that could not be rehydrated.
#[derive(Debug, Clone)]
pub struct RecordError {
    level: Level,
    message: String,
    issuer: String,
    block_id: String,
}

impl RecordError {
    pub fn with(level: Level, message: String, issuer: &str, block_id: &str) -> Self {
        RecordError {
            level,
            message,
            issuer: issuer.to_string(),
            block_id: block_id.to_string(),
        }
    }

    pub fn boxed(message: String, issuer: &str, block_id: &str) -> Box<dyn BlockwrightErrorExt> {
        Box::new(Self::with(Level::Error, message, issuer, block_id))
    }

    pub fn block_id(&self) -> &str {
        &self.block_id
    }
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.block_id.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} (block '{}')", self.message, self.block_id)
        }
    }
}

impl std::error::Error for RecordError {}

impl BlockwrightErrorExt for RecordError {
    fn level(&self) -> Level {
        self.level
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        self.issuer.clone()
    }

    fn span(&self) -> Option<Span> {
        None
    }

    fn location(&self) -> Option<Location> {
        None
    }
}

/// Validity failure recorded on a node, surfaced to the editor.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockDiagnostic {
    pub node: NodeId,
    pub block_id: String,
    pub message: String,
}

impl std::fmt::Display for BlockDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{} #{}]", self.message, self.block_id, self.node)
    }
}

impl BlockwrightErrorExt for BlockDiagnostic {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        "blockwright.blocks.validate".to_string()
    }

    fn span(&self) -> Option<Span> {
        None
    }

    fn location(&self) -> Option<Location> {
        None
    }
}
