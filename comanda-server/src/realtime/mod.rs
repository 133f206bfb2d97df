//! Real-time fan-out
//!
//! - [`registry`] - live connections keyed by restaurant, heartbeat GC
//! - [`broadcaster`] - fire-and-forget event delivery into per-connection
//!   queues

pub mod broadcaster;
pub mod registry;

pub use broadcaster::EventBroadcaster;
pub use registry::{Connection, ConnectionRegistry};
