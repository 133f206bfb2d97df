//! Shared types for the Comanda order platform
//!
//! Common types used by the order service and its clients: the order model,
//! lifecycle events, role-projected views and the live-connection protocol.

pub mod actor;
pub mod live;
pub mod order;
pub mod util;

// Re-exports
pub use actor::{Actor, Role, ViewerScope};
pub use live::{LiveCommand, LiveMessage, ProjectedEvent};
pub use order::{Order, OrderEvent, OrderItem, OrderStatus, PaymentStatus};
