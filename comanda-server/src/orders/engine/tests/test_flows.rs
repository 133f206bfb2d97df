//! End-to-end lifecycles observed through live connections

use super::*;
use crate::orders::projection;
use shared::ViewerScope;
use shared::order::{EventPayload, OrderEvent, RoleView};
use tokio::sync::mpsc::Receiver;

fn drain(rx: &mut Receiver<std::sync::Arc<OrderEvent>>) -> Vec<OrderEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push((*event).clone());
    }
    events
}

#[tokio::test]
async fn test_full_lifecycle_event_stream() {
    let h = harness();
    let mut rx = h
        .registry
        .register("waiter-conn", RESTAURANT, Role::Waiter, ViewerScope::default());

    place_and_drive(&h, OrderStatus::Completed);

    let events = drain(&mut rx);

    // Sequences are contiguous from 1 with no reordering
    for (i, event) in events.iter().enumerate() {
        assert_eq!(event.sequence, i as u64 + 1);
    }

    // The stream ends with the completion, and each event carries the full
    // order state it claims
    let last = events.last().unwrap();
    assert_eq!(last.order.status, OrderStatus::Completed);
    for event in &events {
        if let EventPayload::StatusChanged { current, .. } = &event.payload {
            assert_eq!(event.order.status, *current);
        }
    }
}

#[tokio::test]
async fn test_kitchen_auto_advance_emits_item_then_order_event() {
    let h = harness();
    let order = place_and_drive(&h, OrderStatus::Preparing);
    for idx in 0..2 {
        h.engine
            .apply_item_transition(&kitchen(), &order.id, idx, ItemStatus::Preparing)
            .unwrap();
    }
    h.engine
        .apply_item_transition(&kitchen(), &order.id, 0, ItemStatus::Ready)
        .unwrap();

    // A waiter connection watches the last item go ready
    let mut rx = h
        .registry
        .register("waiter-conn", RESTAURANT, Role::Waiter, ViewerScope::default());
    h.engine
        .apply_item_transition(&kitchen(), &order.id, 1, ItemStatus::Ready)
        .unwrap();

    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);

    // Item event first, then the order's own auto-advance event
    assert!(matches!(
        events[0].payload,
        EventPayload::ItemStatusChanged {
            item_index: 1,
            current: ItemStatus::Ready,
            ..
        }
    ));
    assert!(matches!(
        events[1].payload,
        EventPayload::StatusChanged {
            previous: Some(OrderStatus::Preparing),
            current: OrderStatus::Ready,
        }
    ));
    assert_eq!(events[1].sequence, events[0].sequence + 1);
}

#[tokio::test]
async fn test_late_connection_snapshot_then_tail() {
    let h = harness();

    // N transitions happen before the connection exists
    let order = h.engine.place_order(&customer(), two_item_input()).unwrap();
    h.engine
        .apply_order_transition(&waiter(), &order.id, OrderStatus::Accepted, None)
        .unwrap();

    // Register, then snapshot - the session filters queued duplicates by
    // sequence, exactly like the live WebSocket loop
    let mut rx = h
        .registry
        .register("late-conn", RESTAURANT, Role::Admin, ViewerScope::default());
    let (orders, snapshot_seq) = h.store.snapshot(RESTAURANT);
    assert_eq!(snapshot_seq, 2);
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, OrderStatus::Accepted);

    // New transitions arrive after the snapshot
    h.engine
        .apply_order_transition(&kitchen(), &order.id, OrderStatus::Preparing, None)
        .unwrap();

    let tail: Vec<OrderEvent> = drain(&mut rx)
        .into_iter()
        .filter(|e| e.sequence > snapshot_seq)
        .collect();

    // No duplicate delivery, no gap: exactly the one post-snapshot event
    assert_eq!(tail.len(), 1);
    assert_eq!(tail[0].sequence, snapshot_seq + 1);
    assert!(matches!(
        tail[0].payload,
        EventPayload::StatusChanged {
            current: OrderStatus::Preparing,
            ..
        }
    ));
}

#[tokio::test]
async fn test_role_scoped_delivery() {
    let h = harness();
    let mut rx = h
        .registry
        .register("conn", RESTAURANT, Role::Kitchen, ViewerScope::default());

    let order = h.engine.place_order(&customer(), two_item_input()).unwrap();
    h.engine
        .apply_order_transition(&waiter(), &order.id, OrderStatus::Accepted, None)
        .unwrap();

    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);

    // Placement is outside kitchen scope - projection suppresses it
    assert!(projection::project_event(&events[0], Role::Kitchen, &ViewerScope::default()).is_none());

    // Acceptance enters kitchen scope with a ticket view
    let accepted =
        projection::project_event(&events[1], Role::Kitchen, &ViewerScope::default()).unwrap();
    assert!(matches!(accepted.view, Some(RoleView::Kitchen(_))));

    // The customer at the right table sees both; a stranger sees neither
    let own_scope = ViewerScope::for_table("t-4");
    let foreign_scope = ViewerScope::for_table("t-9");
    for event in &events {
        assert!(projection::project_event(event, Role::Customer, &own_scope).is_some());
        assert!(projection::project_event(event, Role::Customer, &foreign_scope).is_none());
    }
}

#[tokio::test]
async fn test_payment_events_are_tagged_distinctly() {
    let h = harness();
    let order = h.engine.place_order(&customer(), two_item_input()).unwrap();

    let mut rx = h
        .registry
        .register("conn", RESTAURANT, Role::Admin, ViewerScope::default());
    h.engine
        .apply_payment_event(
            &waiter(),
            &order.id,
            shared::order::PaymentStatus::PendingCash,
            PaymentSource::ManualCash,
        )
        .unwrap();

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].event_type,
        shared::order::OrderEventType::PaymentChanged
    );
    assert!(matches!(
        events[0].payload,
        EventPayload::PaymentChanged {
            previous: PaymentStatus::Pending,
            current: PaymentStatus::PendingCash,
            source: PaymentSource::ManualCash,
        }
    ));
}

#[tokio::test]
async fn test_failed_transition_emits_nothing() {
    let h = harness();
    let order = h.engine.place_order(&customer(), two_item_input()).unwrap();

    let mut rx = h
        .registry
        .register("conn", RESTAURANT, Role::Admin, ViewerScope::default());

    // Illegal jump: no write, no event
    let result =
        h.engine
            .apply_order_transition(&waiter(), &order.id, OrderStatus::Served, None);
    assert!(result.is_err());

    assert!(drain(&mut rx).is_empty());
    assert_eq!(
        h.store.get(RESTAURANT, &order.id).unwrap().status,
        OrderStatus::Pending
    );
}
