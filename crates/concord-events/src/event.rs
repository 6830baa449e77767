//! Coordination event types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events emitted by the coordination core
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoordEvent {
    /// Registry events
    AgentRegistered {
        name: String,
        timestamp: DateTime<Utc>,
    },

    AgentDeregistered {
        name: String,
        timestamp: DateTime<Utc>,
    },

    /// Messaging events
    MessageSent {
        message_id: String,
        sender: String,
        recipients: Vec<String>,
        message_type: String,
        timestamp: DateTime<Utc>,
    },

    DeliveryFailed {
        message_id: String,
        recipient: String,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    ResponseMatched {
        request_id: String,
        response_id: String,
        timestamp: DateTime<Utc>,
    },

    /// Knowledge events
    KnowledgeShared {
        knowledge_id: String,
        source: String,
        category: String,
        timestamp: DateTime<Utc>,
    },

    /// Session events
    SessionProposed {
        session_id: String,
        initiator: String,
        timestamp: DateTime<Utc>,
    },

    SessionActivated {
        session_id: String,
        acknowledged_by: String,
        timestamp: DateTime<Utc>,
    },

    SessionResolved {
        session_id: String,
        outcome: String,
        timestamp: DateTime<Utc>,
    },

    SessionAbandoned {
        session_id: String,
        timestamp: DateTime<Utc>,
    },

    /// Team events
    TeamFormed {
        team_id: String,
        purpose: String,
        member_count: usize,
        timestamp: DateTime<Utc>,
    },

    TeamActivated {
        team_id: String,
        timestamp: DateTime<Utc>,
    },

    TeamCompleted {
        team_id: String,
        timestamp: DateTime<Utc>,
    },

    TeamDissolved {
        team_id: String,
        timestamp: DateTime<Utc>,
    },
}

impl CoordEvent {
    /// Identifier of the entity this event is about
    pub fn entity_id(&self) -> &str {
        match self {
            Self::AgentRegistered { name, .. } => name,
            Self::AgentDeregistered { name, .. } => name,
            Self::MessageSent { message_id, .. } => message_id,
            Self::DeliveryFailed { message_id, .. } => message_id,
            Self::ResponseMatched { request_id, .. } => request_id,
            Self::KnowledgeShared { knowledge_id, .. } => knowledge_id,
            Self::SessionProposed { session_id, .. } => session_id,
            Self::SessionActivated { session_id, .. } => session_id,
            Self::SessionResolved { session_id, .. } => session_id,
            Self::SessionAbandoned { session_id, .. } => session_id,
            Self::TeamFormed { team_id, .. } => team_id,
            Self::TeamActivated { team_id, .. } => team_id,
            Self::TeamCompleted { team_id, .. } => team_id,
            Self::TeamDissolved { team_id, .. } => team_id,
        }
    }

    /// When the event happened
    pub fn timestamp(&self) -> &DateTime<Utc> {
        match self {
            Self::AgentRegistered { timestamp, .. } => timestamp,
            Self::AgentDeregistered { timestamp, .. } => timestamp,
            Self::MessageSent { timestamp, .. } => timestamp,
            Self::DeliveryFailed { timestamp, .. } => timestamp,
            Self::ResponseMatched { timestamp, .. } => timestamp,
            Self::KnowledgeShared { timestamp, .. } => timestamp,
            Self::SessionProposed { timestamp, .. } => timestamp,
            Self::SessionActivated { timestamp, .. } => timestamp,
            Self::SessionResolved { timestamp, .. } => timestamp,
            Self::SessionAbandoned { timestamp, .. } => timestamp,
            Self::TeamFormed { timestamp, .. } => timestamp,
            Self::TeamActivated { timestamp, .. } => timestamp,
            Self::TeamCompleted { timestamp, .. } => timestamp,
            Self::TeamDissolved { timestamp, .. } => timestamp,
        }
    }

    // Convenience constructors for the high-traffic events

    pub fn agent_registered(name: impl Into<String>) -> Self {
        Self::AgentRegistered {
            name: name.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn agent_deregistered(name: impl Into<String>) -> Self {
        Self::AgentDeregistered {
            name: name.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn message_sent(
        message_id: impl Into<String>,
        sender: impl Into<String>,
        recipients: Vec<String>,
        message_type: impl Into<String>,
    ) -> Self {
        Self::MessageSent {
            message_id: message_id.into(),
            sender: sender.into(),
            recipients,
            message_type: message_type.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn delivery_failed(
        message_id: impl Into<String>,
        recipient: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::DeliveryFailed {
            message_id: message_id.into(),
            recipient: recipient.into(),
            reason: reason.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn response_matched(
        request_id: impl Into<String>,
        response_id: impl Into<String>,
    ) -> Self {
        Self::ResponseMatched {
            request_id: request_id.into(),
            response_id: response_id.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn knowledge_shared(
        knowledge_id: impl Into<String>,
        source: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self::KnowledgeShared {
            knowledge_id: knowledge_id.into(),
            source: source.into(),
            category: category.into(),
            timestamp: Utc::now(),
        }
    }
}
