//! Real-time event broadcaster
//!
//! Delivery is fire-and-forget: the order store is the system of record and
//! the push channel is an optimization. A full queue drops the event for
//! that connection only - the next snapshot sync heals it - and never blocks
//! other connections or fails the originating transition.

use std::sync::Arc;

use shared::order::OrderEvent;
use tokio::sync::mpsc;

use super::registry::ConnectionRegistry;

/// Fan-out of applied transitions to live connections
#[derive(Debug)]
pub struct EventBroadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl EventBroadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Deliver one fully-applied transition to every live connection of the
    /// event's restaurant
    ///
    /// Synchronous and non-blocking, so the engine may call it while still
    /// holding the shard lock - which is exactly what guarantees publish
    /// order equals apply order per restaurant.
    pub fn publish(&self, event: &OrderEvent) {
        let event = Arc::new(event.clone());
        for conn in self.registry.connections(&event.restaurant_id) {
            match conn.tx.try_send(Arc::clone(&event)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(
                        connection_id = %conn.id,
                        order_id = %event.order_id,
                        sequence = event.sequence,
                        "Connection queue full, event dropped"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::debug!(
                        connection_id = %conn.id,
                        "Connection closed, event dropped"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{
        EventPayload, Order, OrderStatus, PaymentStatus, PlacedBy,
    };
    use shared::{Actor, Role, ViewerScope};

    fn make_event(restaurant_id: &str, sequence: u64) -> OrderEvent {
        let actor = Actor::new("w-1", Role::Waiter, restaurant_id);
        let order = Order {
            id: "o-1".to_string(),
            order_number: "ORD20250101-10001".to_string(),
            restaurant_id: restaurant_id.to_string(),
            table_id: "t-1".to_string(),
            placed_by: PlacedBy::Guest {
                name: "Mesa 1".to_string(),
            },
            items: vec![],
            status: OrderStatus::Accepted,
            payment_status: PaymentStatus::Pending,
            rejection_reason: None,
            order_notes: None,
            total: 0.0,
            version: 2,
            created_at: 1,
            updated_at: 2,
        };
        OrderEvent::new(
            sequence,
            &actor,
            EventPayload::StatusChanged {
                previous: Some(OrderStatus::Pending),
                current: OrderStatus::Accepted,
            },
            order,
        )
    }

    #[tokio::test]
    async fn test_publish_reaches_all_restaurant_connections() {
        let registry = Arc::new(ConnectionRegistry::new(90_000));
        let broadcaster = EventBroadcaster::new(registry.clone());

        let mut rx_a = registry.register("c-a", "r-1", Role::Waiter, ViewerScope::default());
        let mut rx_b = registry.register("c-b", "r-1", Role::Kitchen, ViewerScope::default());
        let mut rx_other =
            registry.register("c-x", "r-2", Role::Waiter, ViewerScope::default());

        broadcaster.publish(&make_event("r-1", 1));

        assert_eq!(rx_a.recv().await.unwrap().sequence, 1);
        assert_eq!(rx_b.recv().await.unwrap().sequence, 1);
        // Other restaurant sees nothing
        assert!(rx_other.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_overflow_drops_without_blocking() {
        let registry = Arc::new(ConnectionRegistry::new(90_000));
        let broadcaster = EventBroadcaster::new(registry.clone());

        let mut rx = registry.register("c-1", "r-1", Role::Waiter, ViewerScope::default());

        // Publish past the per-connection queue capacity without a consumer;
        // publish must never block or fail the transition
        for seq in 1..=300 {
            broadcaster.publish(&make_event("r-1", seq));
        }

        // Everything up to the queue capacity arrives in publish order,
        // the overflow was dropped
        let capacity = super::super::registry::CONNECTION_QUEUE_CAPACITY as u64;
        for expected in 1..=capacity {
            assert_eq!(rx.recv().await.unwrap().sequence, expected);
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_to_empty_restaurant_is_noop() {
        let registry = Arc::new(ConnectionRegistry::new(90_000));
        let broadcaster = EventBroadcaster::new(registry);
        // No panic, no error surfaced to the caller
        broadcaster.publish(&make_event("r-nobody", 1));
    }
}
