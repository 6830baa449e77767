//! Coordination events
//!
//! Every asynchronous effect in the core (delivery, knowledge propagation,
//! session and team transitions) is announced on the [`EventBus`]. Callers
//! that want completion signals subscribe here instead of polling.

pub mod bus;
pub mod event;

pub use bus::EventBus;
pub use event::CoordEvent;
