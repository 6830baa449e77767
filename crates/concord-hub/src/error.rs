//! Error types for the communication hub

use concord_core::CoreError;

/// Result type for hub operations
pub type Result<T> = std::result::Result<T, HubError>;

/// Errors in message routing and hub lifecycle
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// Sender or recipient is not in the registry
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    /// Message violates a structural invariant
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Response correlation id matches no pending request
    #[error("Dangling correlation id: {0}")]
    DanglingCorrelation(String),

    /// A concurrent initialize call is already in flight
    #[error("Hub initialization already in progress")]
    AlreadyInitialized,

    /// Operation requires a component that is not ready yet
    #[error("Dependency not ready: {0}")]
    DependencyNotReady(String),

    /// Message could not be enqueued for a recipient
    #[error("Message delivery failed: {0}")]
    DeliveryFailed(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),

    /// Generic error from concord-core
    #[error(transparent)]
    CoreError(#[from] CoreError),
}

impl HubError {
    /// Create an invalid-message error
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::InvalidMessage(msg.into())
    }

    /// Create a dependency-not-ready error
    pub fn not_ready<S: Into<String>>(component: S) -> Self {
        Self::DependencyNotReady(component.into())
    }

    /// Create a delivery-failed error
    pub fn delivery_failed<S: Into<String>>(msg: S) -> Self {
        Self::DeliveryFailed(msg.into())
    }

    /// Create a generic other error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }
}
