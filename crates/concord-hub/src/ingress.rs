//! Unified-ingress delegation traits
//!
//! The hub is built before the knowledge exchange and the collaboration
//! engine, so it cannot depend on their crates. Instead the orchestrator
//! wires their implementations of these traits into the hub, and the hub's
//! `share_knowledge`/`request_collaboration` conveniences delegate through
//! them.

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

/// A knowledge share as it arrives at the hub's ingress surface
#[derive(Debug, Clone)]
pub struct KnowledgeShare {
    pub source: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub data: Value,
    pub confidence: f64,
    pub applicability: Vec<String>,
    pub related: Vec<String>,
}

impl KnowledgeShare {
    pub fn new(
        source: impl Into<String>,
        category: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            category: category.into(),
            title: title.into(),
            description: String::new(),
            data: Value::Null,
            confidence: 1.0,
            applicability: vec!["*".to_string()],
            related: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn applicable_to(mut self, tags: Vec<String>) -> Self {
        self.applicability = tags;
        self
    }

    pub fn related_to(mut self, ids: Vec<String>) -> Self {
        self.related = ids;
        self
    }
}

/// A collaboration proposal as it arrives at the hub's ingress surface
#[derive(Debug, Clone)]
pub struct CollaborationRequest {
    pub initiator: String,
    pub participants: Vec<String>,
    pub goal: String,
    pub context: Value,
}

impl CollaborationRequest {
    pub fn new(
        initiator: impl Into<String>,
        participants: Vec<String>,
        goal: impl Into<String>,
    ) -> Self {
        Self {
            initiator: initiator.into(),
            participants,
            goal: goal.into(),
            context: Value::Null,
        }
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }
}

/// Downstream handler for knowledge shares
#[async_trait]
pub trait KnowledgeIngress: Send + Sync {
    /// Store the share and propagate notifications; returns the new item id
    async fn ingest_knowledge(&self, share: KnowledgeShare) -> Result<String>;
}

/// Downstream handler for collaboration proposals
#[async_trait]
pub trait CollabIngress: Send + Sync {
    /// Create the session and invite participants; returns the session id
    async fn ingest_collaboration(&self, request: CollaborationRequest) -> Result<String>;
}
