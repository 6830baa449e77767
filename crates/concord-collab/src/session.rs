//! Collaboration sessions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Session lifecycle state
///
/// Transitions are monotonic: `Proposed` → `Active` → `Resolved` or
/// `Abandoned`. Terminal states reject every further transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Proposed,
    Active,
    Resolved,
    Abandoned,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Abandoned)
    }
}

/// A multi-party collaboration negotiation with a shared goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaborationSession {
    /// Unique id assigned at proposal
    pub id: String,

    pub initiator: String,

    /// Distinct participants, initiator excluded
    pub participants: Vec<String>,

    pub goal: String,
    pub context: Value,
    pub status: SessionStatus,

    /// Participants that have acknowledged the proposal
    #[serde(default)]
    pub acknowledged: Vec<String>,

    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,

    /// Outcome summary recorded at resolution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

impl CollaborationSession {
    pub(crate) fn propose(
        initiator: String,
        participants: Vec<String>,
        goal: String,
        context: Value,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            initiator,
            participants,
            goal,
            context,
            status: SessionStatus::Proposed,
            acknowledged: Vec::new(),
            created_at: Utc::now(),
            resolved_at: None,
            outcome: None,
        }
    }

    pub fn has_participant(&self, agent: &str) -> bool {
        self.participants.iter().any(|p| p == agent)
    }

    pub fn has_acknowledged(&self, agent: &str) -> bool {
        self.acknowledged.iter().any(|a| a == agent)
    }

    /// Time since the proposal was created
    ///
    /// The engine enforces no timeout itself; a scheduler polls this and
    /// abandons sessions that have idled too long.
    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now() - self.created_at
    }
}
