//! Agent identity and availability

use serde::{Deserialize, Serialize};

/// Availability state of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    /// Ready to receive and act
    Available,

    /// Registered but occupied; deliveries still enqueue
    Busy,

    /// Not consuming messages; broadcasts skip this agent
    Offline,
}

/// A named autonomous participant in the coordination system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Unique name, e.g. `infrastructure`, `quality`, `ux`, `security`
    pub name: String,

    /// Capability tags used for discovery and knowledge relevance
    #[serde(default)]
    pub capabilities: Vec<String>,

    /// Current availability state
    pub availability: Availability,
}

impl Agent {
    /// Create an agent with no capability tags, available by default
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            capabilities: Vec::new(),
            availability: Availability::Available,
        }
    }

    /// Add a capability tag
    pub fn with_capability<S: Into<String>>(mut self, tag: S) -> Self {
        self.capabilities.push(tag.into());
        self
    }

    /// Replace the capability tag set
    pub fn with_capabilities(mut self, tags: Vec<String>) -> Self {
        self.capabilities = tags;
        self
    }

    /// Set the initial availability state
    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    /// Check a capability tag
    pub fn has_capability(&self, tag: &str) -> bool {
        self.capabilities.iter().any(|c| c == tag)
    }
}
