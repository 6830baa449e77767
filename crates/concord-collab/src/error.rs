//! Error types for the collaboration engine

use concord_core::CoreError;
use concord_hub::HubError;
use concord_knowledge::KnowledgeError;

/// Result type for collaboration operations
pub type Result<T> = std::result::Result<T, CollabError>;

/// Errors in session brokering and team formation
#[derive(Debug, thiserror::Error)]
pub enum CollabError {
    /// Initiator, participant, or member is not in the registry
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    /// Participant list contains a duplicate or the initiator itself
    #[error("Duplicate participant: {0}")]
    DuplicateParticipant(String),

    /// Proposal or formation violates a structural invariant
    #[error("Invalid proposal: {0}")]
    InvalidProposal(String),

    /// Team deadline is not in the future
    #[error("Invalid deadline: {0}")]
    InvalidDeadline(String),

    /// A resource budget field is negative or not a number
    #[error("Invalid budget: {0}")]
    InvalidBudget(String),

    /// State machine rejected the transition
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// No session with that id
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// No team with that id
    #[error("Team not found: {0}")]
    TeamNotFound(String),

    /// Cancellation attempted by someone other than the initiator
    #[error("Only the initiator may cancel: {0}")]
    NotInitiator(String),

    /// Agent is not part of the session or team it tried to acknowledge
    #[error("Not a participant: {0}")]
    NotParticipant(String),

    /// The hub or knowledge exchange is not ready
    #[error("Dependency not ready: {0}")]
    DependencyNotReady(String),

    /// Messaging through the hub failed
    #[error(transparent)]
    Hub(#[from] HubError),

    /// Knowledge exchange failure
    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),

    /// Generic error from concord-core
    #[error(transparent)]
    CoreError(#[from] CoreError),
}

impl CollabError {
    /// Create an invalid-proposal error
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::InvalidProposal(msg.into())
    }

    /// Create an invalid-transition error
    pub fn transition<S: Into<String>>(msg: S) -> Self {
        Self::InvalidTransition(msg.into())
    }

    /// Create a dependency-not-ready error
    pub fn not_ready<S: Into<String>>(component: S) -> Self {
        Self::DependencyNotReady(component.into())
    }
}
