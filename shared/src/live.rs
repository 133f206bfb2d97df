//! Live-connection protocol
//!
//! Server → client: an initial `Ready` snapshot, then one message per applied
//! transition, projected for the connection's role. Clients track `sequence`
//! and send `Resync` when they detect a gap; the server answers with a fresh
//! `Ready`. Polling `GET /api/orders` reads the same store, so both paths
//! converge on the same state by construction.

use crate::order::{EventPayload, OrderEventType, RoleView};
use serde::{Deserialize, Serialize};

/// Server → client message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LiveMessage {
    /// Full snapshot of every order the connection may currently see
    ///
    /// `server_sequence` is the restaurant sequence the snapshot reflects;
    /// events with `sequence <= server_sequence` are already included.
    Ready {
        orders: Vec<RoleView>,
        server_sequence: u64,
    },

    /// One applied transition, projected for this connection
    Event(ProjectedEvent),
}

/// A transition event shaped for one connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectedEvent {
    pub event_id: String,
    pub sequence: u64,
    pub order_id: String,
    pub event_type: OrderEventType,
    pub payload: EventPayload,
    /// Updated view, or None when the order just left this role's scope
    /// (the client removes it from display)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<RoleView>,
}

/// Client → server command
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LiveCommand {
    /// Client detected a sequence gap or dropped delivery - resend `Ready`
    Resync,
}
