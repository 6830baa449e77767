//! Communication Hub
//!
//! Routes typed messages between named agents with priority and
//! response-correlation semantics. The hub is the unified ingress point for
//! all cross-agent traffic: knowledge shares and collaboration requests
//! delegate through it once those components are wired in.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use concord_core::config::HubConfig;
//! use concord_events::EventBus;
//! use concord_hub::{Agent, AgentRegistry, CommunicationHub, MessageContent, MessageDraft};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(AgentRegistry::new());
//!     registry.register(Agent::new("infra"));
//!     registry.register(Agent::new("quality"));
//!
//!     let hub = CommunicationHub::new(registry, EventBus::default(), HubConfig::default());
//!     hub.initialize()?;
//!
//!     let draft = MessageDraft::request("infra", "quality", MessageContent::new("perf review"));
//!     let id = hub.send_message(draft)?;
//!     println!("sent {id}");
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod delivery;
pub mod error;
pub mod hub;
pub mod ingress;
pub mod message;
pub mod registry;

// Re-exports
pub use agent::{Agent, Availability};
pub use delivery::{DeliveryLog, DeliveryRecord, DeliveryStatus};
pub use error::{HubError, Result};
pub use hub::CommunicationHub;
pub use ingress::{CollabIngress, CollaborationRequest, KnowledgeIngress, KnowledgeShare};
pub use message::{Message, MessageContent, MessageDraft, MessageType, Priority, Recipient};
pub use registry::AgentRegistry;
