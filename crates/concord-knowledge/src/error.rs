//! Error types for the knowledge exchange

use concord_core::CoreError;
use concord_hub::HubError;

/// Result type for knowledge operations
pub type Result<T> = std::result::Result<T, KnowledgeError>;

/// Errors in knowledge storage and retrieval
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    /// Item violates a structural invariant
    #[error("Invalid knowledge item: {0}")]
    InvalidItem(String),

    /// Filter references an unknown category or an out-of-range bound
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Source agent is not in the registry
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    /// The hub (or the exchange itself) is not ready
    #[error("Dependency not ready: {0}")]
    DependencyNotReady(String),

    /// Storage backend failure
    #[error("Store error: {0}")]
    Store(String),

    /// Propagation through the hub failed
    #[error(transparent)]
    Hub(#[from] HubError),

    /// Generic error from concord-core
    #[error(transparent)]
    CoreError(#[from] CoreError),
}

impl KnowledgeError {
    /// Create an invalid-item error
    pub fn invalid_item<S: Into<String>>(msg: S) -> Self {
        Self::InvalidItem(msg.into())
    }

    /// Create an invalid-filter error
    pub fn invalid_filter<S: Into<String>>(msg: S) -> Self {
        Self::InvalidFilter(msg.into())
    }

    /// Create a dependency-not-ready error
    pub fn not_ready<S: Into<String>>(component: S) -> Self {
        Self::DependencyNotReady(component.into())
    }

    /// Create a store error
    pub fn store<S: Into<String>>(msg: S) -> Self {
        Self::Store(msg.into())
    }
}
