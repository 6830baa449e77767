//! Message model
//!
//! A [`MessageDraft`] is what a caller hands to the hub; the hub assigns the
//! id and timestamp on send and the sealed [`Message`] is immutable from
//! then on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type of message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Asks the recipient to act; usually paired with `requires_response`
    Request,

    /// Answers a prior request via `correlation_id`
    Response,

    /// One-way informational message
    Notification,

    /// Fan-out announcement to a recipient group
    Broadcast,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Response => "response",
            Self::Notification => "notification",
            Self::Broadcast => "broadcast",
        }
    }
}

/// Message priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

/// Target of a message: a single agent or a recipient group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipient {
    Agent(String),
    Group(Vec<String>),
}

impl Recipient {
    /// Recipient names in declaration order
    pub fn names(&self) -> Vec<String> {
        match self {
            Self::Agent(name) => vec![name.clone()],
            Self::Group(names) => names.clone(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        match self {
            Self::Agent(n) => n == name,
            Self::Group(names) => names.iter().any(|n| n == name),
        }
    }
}

/// Subject line plus structured payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageContent {
    pub subject: String,

    #[serde(default)]
    pub data: Value,
}

impl MessageContent {
    pub fn new<S: Into<String>>(subject: S) -> Self {
        Self {
            subject: subject.into(),
            data: Value::Null,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// A message as submitted to the hub, before id/timestamp assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDraft {
    pub sender: String,
    pub recipient: Recipient,
    pub msg_type: MessageType,
    pub priority: Priority,
    pub content: MessageContent,
    pub requires_response: bool,
    pub correlation_id: Option<String>,
}

impl MessageDraft {
    /// A request expecting a response
    pub fn request<S: Into<String>>(sender: S, recipient: S, content: MessageContent) -> Self {
        Self {
            sender: sender.into(),
            recipient: Recipient::Agent(recipient.into()),
            msg_type: MessageType::Request,
            priority: Priority::default(),
            content,
            requires_response: true,
            correlation_id: None,
        }
    }

    /// A response answering `correlation_id`
    pub fn response<S: Into<String>>(
        sender: S,
        recipient: S,
        content: MessageContent,
        correlation_id: S,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: Recipient::Agent(recipient.into()),
            msg_type: MessageType::Response,
            priority: Priority::default(),
            content,
            requires_response: false,
            correlation_id: Some(correlation_id.into()),
        }
    }

    /// A one-way notification
    pub fn notification<S: Into<String>>(sender: S, recipient: S, content: MessageContent) -> Self {
        Self {
            sender: sender.into(),
            recipient: Recipient::Agent(recipient.into()),
            msg_type: MessageType::Notification,
            priority: Priority::default(),
            content,
            requires_response: false,
            correlation_id: None,
        }
    }

    /// A fan-out broadcast to a recipient group
    pub fn broadcast<S: Into<String>>(
        sender: S,
        recipients: Vec<String>,
        content: MessageContent,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: Recipient::Group(recipients),
            msg_type: MessageType::Broadcast,
            priority: Priority::default(),
            content,
            requires_response: false,
            correlation_id: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn require_response(mut self, required: bool) -> Self {
        self.requires_response = required;
        self
    }
}

/// A routed message, immutable once delivered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique id assigned on send
    pub id: String,

    pub sender: String,
    pub recipient: Recipient,
    pub msg_type: MessageType,
    pub priority: Priority,
    pub content: MessageContent,
    pub requires_response: bool,

    /// Links a response to the request it answers
    pub correlation_id: Option<String>,

    /// Assigned on send
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Seal a draft: assign id and timestamp
    pub(crate) fn seal(draft: MessageDraft) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender: draft.sender,
            recipient: draft.recipient,
            msg_type: draft.msg_type,
            priority: draft.priority,
            content: draft.content,
            requires_response: draft.requires_response,
            correlation_id: draft.correlation_id,
            timestamp: Utc::now(),
        }
    }
}
