//! Master Orchestrator
//!
//! Constructs and owns the registry, event bus, hub, knowledge exchange,
//! and collaboration engine, wiring them together with explicit references
//! instead of globals. `initialize` cascades through the components in
//! dependency order; every boundary operation reports `NotReady` until the
//! cascade has completed.
//!
//! # Example
//!
//! ```no_run
//! use concord_core::CoordConfig;
//! use concord_hub::{Agent, MessageContent, MessageDraft};
//! use concord_orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = Orchestrator::new(CoordConfig::default());
//!     orchestrator.register_agent(Agent::new("infrastructure"));
//!     orchestrator.register_agent(Agent::new("quality"));
//!     orchestrator.initialize()?;
//!
//!     let id = orchestrator.send_message(MessageDraft::request(
//!         "infrastructure",
//!         "quality",
//!         MessageContent::new("perf review"),
//!     ))?;
//!     println!("sent {id}");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod orchestrator;

// Re-exports
pub use error::{InitStage, OrchestratorError, Result};
pub use orchestrator::Orchestrator;
