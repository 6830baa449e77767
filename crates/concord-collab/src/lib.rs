//! Collaboration Engine
//!
//! Brokers multi-agent collaboration sessions (a shared goal plus structured
//! context) and forms task-scoped teams bound to a problem definition,
//! deadline, and resource budget. Proposals and formations return
//! immediately; activation happens when participants acknowledge.

pub mod engine;
pub mod error;
pub mod session;
pub mod team;

// Re-exports
pub use engine::CollaborationEngine;
pub use error::{CollabError, Result};
pub use session::{CollaborationSession, SessionStatus};
pub use team::{Complexity, ProblemDefinition, ResourceBudget, Team, TeamStatus};
