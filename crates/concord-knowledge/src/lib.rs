//! Knowledge Exchange
//!
//! Append-only store of knowledge items tagged by source, category,
//! confidence, and applicability. Shares propagate as hub notifications to
//! every agent whose name or capability tags intersect the item's
//! applicability; queries come back ordered by confidence, then recency.

pub mod error;
pub mod exchange;
pub mod filter;
pub mod item;
pub mod store;

// Re-exports
pub use error::{KnowledgeError, Result};
pub use exchange::KnowledgeExchange;
pub use filter::KnowledgeFilter;
pub use item::{KnowledgeDraft, KnowledgeItem};
pub use store::{InMemoryKnowledgeStore, KnowledgeStore};
