//! Knowledge items
//!
//! Items are append-only: corrections are new items referencing the old one
//! through `related`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A knowledge item as submitted by a source agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeDraft {
    pub source: String,
    pub category: String,
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub data: Value,

    /// Clamped to [0, 1] on share
    pub confidence: f64,

    /// Agent names or capability tags; `"*"` means globally relevant
    pub applicability: Vec<String>,

    /// Ids of related items (prior findings, corrected items)
    #[serde(default)]
    pub related: Vec<String>,
}

impl KnowledgeDraft {
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

/// A stored knowledge item, immutable after creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeItem {
    /// Unique id assigned on share
    pub id: String,

    /// Agent that shared the item
    pub source: String,

    pub category: String,
    pub title: String,
    pub description: String,
    pub data: Value,

    /// Always within [0, 1]
    pub confidence: f64,

    pub applicability: Vec<String>,
    pub related: Vec<String>,

    pub created_at: DateTime<Utc>,
}

impl KnowledgeItem {
    /// Seal a draft: assign id and timestamp, clamp confidence
    pub(crate) fn seal(draft: KnowledgeDraft) -> Self {
        let confidence = if draft.confidence.is_nan() {
            0.0
        } else {
            draft.confidence.clamp(0.0, 1.0)
        };

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source: draft.source,
            category: draft.category,
            title: draft.title,
            description: draft.description,
            data: draft.data,
            confidence,
            applicability: draft.applicability,
            related: draft.related,
            created_at: Utc::now(),
        }
    }

    /// True when the item is relevant to every agent
    pub fn is_global(&self) -> bool {
        self.applicability.iter().any(|t| t == "*")
    }
}
