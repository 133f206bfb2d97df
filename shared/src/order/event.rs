//! Order events - immutable facts emitted after each applied transition
//!
//! Events carry the full updated order, not a diff: a consumer that receives
//! an event can trust its content immediately without a follow-up read. The
//! per-restaurant `sequence` is the authoritative ordering mechanism.

use super::model::Order;
use super::types::{ItemStatus, OrderStatus, PaymentSource, PaymentStatus};
use crate::actor::{Actor, Role};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Event type enumeration - observers filter on this tag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventType {
    /// Fulfillment transition (order-level or item-level)
    StatusChanged,
    /// Payment reconciliation transition
    PaymentChanged,
}

impl fmt::Display for OrderEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderEventType::StatusChanged => write!(f, "STATUS_CHANGED"),
            OrderEventType::PaymentChanged => write!(f, "PAYMENT_CHANGED"),
        }
    }
}

/// Event payload variants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    /// Order-level fulfillment change; `previous` is None on placement
    StatusChanged {
        #[serde(skip_serializing_if = "Option::is_none")]
        previous: Option<OrderStatus>,
        current: OrderStatus,
    },

    /// Item-level fulfillment change
    ItemStatusChanged {
        item_index: usize,
        previous: ItemStatus,
        current: ItemStatus,
    },

    /// Payment axis change
    PaymentChanged {
        previous: PaymentStatus,
        current: PaymentStatus,
        source: PaymentSource,
    },
}

impl EventPayload {
    /// Tag used by observers to filter fulfillment vs payment events
    pub fn event_type(&self) -> OrderEventType {
        match self {
            EventPayload::StatusChanged { .. } | EventPayload::ItemStatusChanged { .. } => {
                OrderEventType::StatusChanged
            }
            EventPayload::PaymentChanged { .. } => OrderEventType::PaymentChanged,
        }
    }
}

/// Order event - one fully-applied transition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderEvent {
    /// Event unique ID
    pub event_id: String,
    /// Per-restaurant sequence number - authoritative ordering
    pub sequence: u64,
    pub restaurant_id: String,
    pub order_id: String,
    /// Server timestamp (Unix milliseconds)
    pub timestamp: i64,
    /// Actor who triggered the transition (snapshot for audit)
    pub actor_id: String,
    pub actor_role: Role,
    /// Event type
    pub event_type: OrderEventType,
    /// Event payload
    pub payload: EventPayload,
    /// Full updated order - state, not a diff
    pub order: Order,
}

impl OrderEvent {
    /// Create an event for an applied transition
    ///
    /// Timestamp is always set by the server when the event is created.
    pub fn new(sequence: u64, actor: &Actor, payload: EventPayload, order: Order) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            restaurant_id: order.restaurant_id.clone(),
            order_id: order.id.clone(),
            timestamp: crate::util::now_millis(),
            actor_id: actor.user_id.clone(),
            actor_role: actor.role,
            event_type: payload.event_type(),
            payload,
            order,
        }
    }
}
