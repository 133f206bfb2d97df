//! Transition engine test suite
//!
//! Split by concern:
//! - [`test_transitions`] - order-level legality, authorization, conflicts
//! - [`test_items`] - item sub-machines and auto-advancement
//! - [`test_payment`] - payment reconciliation and the completion gate
//! - [`test_flows`] - end-to-end lifecycles observed through live connections

mod test_flows;

use std::sync::Arc;

use shared::order::{
    CreateOrderInput, ItemStatus, ModifierSelection, Order, OrderItemInput, OrderStatus,
    PaymentSource, PaymentStatus, PlacedBy,
};
use shared::{Actor, Role};

use crate::orders::{OrderStore, TransitionEngine};
use crate::realtime::{ConnectionRegistry, EventBroadcaster};

pub const RESTAURANT: &str = "r-test";

pub struct TestHarness {
    pub engine: TransitionEngine,
    pub store: Arc<OrderStore>,
    pub registry: Arc<ConnectionRegistry>,
}

pub fn harness() -> TestHarness {
    let store = Arc::new(OrderStore::new());
    let registry = Arc::new(ConnectionRegistry::new(90_000));
    let broadcaster = Arc::new(EventBroadcaster::new(registry.clone()));
    let engine = TransitionEngine::new(store.clone(), broadcaster);
    TestHarness {
        engine,
        store,
        registry,
    }
}

pub fn customer() -> Actor {
    Actor::new("user-7", Role::Customer, RESTAURANT)
}

pub fn waiter() -> Actor {
    Actor::new("w-1", Role::Waiter, RESTAURANT)
}

pub fn kitchen() -> Actor {
    Actor::new("k-1", Role::Kitchen, RESTAURANT)
}

pub fn admin() -> Actor {
    Actor::new("a-1", Role::Admin, RESTAURANT)
}

/// Two items: qty 1 @ $10, qty 2 @ $5 with a +$2 modifier
pub fn two_item_input() -> CreateOrderInput {
    CreateOrderInput {
        table_id: "t-4".to_string(),
        placed_by: PlacedBy::Customer {
            user_id: "user-7".to_string(),
        },
        items: vec![
            OrderItemInput {
                menu_item_id: "m-1".to_string(),
                name: "Paella".to_string(),
                unit_price: 10.0,
                quantity: 1,
                modifiers: vec![],
                special_instructions: None,
            },
            OrderItemInput {
                menu_item_id: "m-2".to_string(),
                name: "Sangría".to_string(),
                unit_price: 5.0,
                quantity: 2,
                modifiers: vec![ModifierSelection {
                    group: "Size".to_string(),
                    option: "Large".to_string(),
                    price_delta: 2.0,
                }],
                special_instructions: None,
            },
        ],
        order_notes: None,
    }
}

/// Place an order and drive it to the given status through the legal path
pub fn place_and_drive(h: &TestHarness, target: OrderStatus) -> Order {
    let order = h.engine.place_order(&customer(), two_item_input()).unwrap();
    drive_to(h, &order.id, target)
}

/// Drive an existing pending order forward along the happy path
pub fn drive_to(h: &TestHarness, order_id: &str, target: OrderStatus) -> Order {
    let item_count = h
        .store
        .get(RESTAURANT, order_id)
        .expect("order exists")
        .items
        .len();
    let mut order = h.store.get(RESTAURANT, order_id).unwrap();

    let steps = [
        OrderStatus::Accepted,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Served,
        OrderStatus::Completed,
    ];
    for step in steps {
        if order.status == target {
            break;
        }
        order = match step {
            OrderStatus::Accepted => h
                .engine
                .apply_order_transition(&waiter(), order_id, step, None)
                .unwrap(),
            OrderStatus::Preparing => h
                .engine
                .apply_order_transition(&kitchen(), order_id, step, None)
                .unwrap(),
            OrderStatus::Ready => {
                // Kitchen walks every item through preparing → ready;
                // the last item auto-advances the order
                for idx in 0..item_count {
                    h.engine
                        .apply_item_transition(&kitchen(), order_id, idx, ItemStatus::Preparing)
                        .unwrap();
                }
                let mut last = order;
                for idx in 0..item_count {
                    last = h
                        .engine
                        .apply_item_transition(&kitchen(), order_id, idx, ItemStatus::Ready)
                        .unwrap();
                }
                last
            }
            OrderStatus::Served => {
                let mut last = order;
                for idx in 0..item_count {
                    last = h
                        .engine
                        .apply_item_transition(&waiter(), order_id, idx, ItemStatus::Served)
                        .unwrap();
                }
                last
            }
            OrderStatus::Completed => {
                h.engine
                    .apply_payment_event(
                        &waiter(),
                        order_id,
                        PaymentStatus::Paid,
                        PaymentSource::ManualCash,
                    )
                    .unwrap();
                h.engine
                    .apply_order_transition(&waiter(), order_id, step, None)
                    .unwrap()
            }
            _ => unreachable!(),
        };
        if order.status == target {
            break;
        }
    }
    order
}
