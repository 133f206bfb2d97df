//! Status transition engine - the only writer of order state
//!
//! # Transition Flow
//!
//! ```text
//! apply_order_transition(actor, order_id, requested)
//!     ├─ 1. Lock the restaurant shard (single-writer authority)
//!     ├─ 2. Read current state as stored
//!     ├─ 3. Check role authorization
//!     ├─ 4. Check table legality + cross-constraints
//!     ├─ 5. Version-checked commit
//!     ├─ 6. Publish the event while still holding the lock
//!     └─ 7. Return the updated order
//! ```
//!
//! Publishing under the shard lock guarantees that per-restaurant event
//! order equals apply order, and that the write is visible before the event
//! claiming it happened. Publish is non-blocking (per-connection `try_send`),
//! so the critical section stays short.
//!
//! Item-level transitions run through the same flow and then evaluate
//! order-level auto-advancement: advancing is itself a transition through
//! the same legality path and emits its own event. Only the role check is
//! skipped there - the engine is the actor, the event records the
//! triggering user.

use std::sync::Arc;

use shared::order::{
    CreateOrderInput, EventPayload, ItemStatus, Order, OrderEvent, OrderItem, OrderStatus,
};
use shared::util::now_millis;
use shared::{Actor, Role};

use super::error::OrderError;
use super::money;
use super::store::{OrderStore, ShardState};
use crate::realtime::EventBroadcaster;

/// 状态流转引擎
pub struct TransitionEngine {
    pub(super) store: Arc<OrderStore>,
    pub(super) broadcaster: Arc<EventBroadcaster>,
}

// ============================================================================
// Legality Tables
// ============================================================================

/// Forward-only order transition table
///
/// 禁止跳级；Rejected 只能从 Pending / Accepted 到达。
fn order_transition_allowed(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
        (from, to),
        (Pending, Accepted)
            | (Accepted, Preparing)
            | (Preparing, Ready)
            | (Ready, Served)
            | (Served, Completed)
            | (Pending, Rejected)
            | (Accepted, Rejected)
    )
}

/// Roles authorized to request an order-level status
fn order_transition_roles(to: OrderStatus) -> &'static [Role] {
    use OrderStatus::*;
    match to {
        Accepted | Served | Completed | Rejected => &[Role::Waiter],
        Preparing | Ready => &[Role::Kitchen],
        // Pending is set at placement, never requested
        Pending => &[],
    }
}

/// Item transition table - independent sub-state machine per item
fn item_transition_allowed(from: ItemStatus, to: ItemStatus) -> bool {
    use ItemStatus::*;
    matches!(
        (from, to),
        (Pending, Preparing)
            | (Preparing, Ready)
            | (Ready, Served)
            | (Pending, Rejected)
            | (Preparing, Rejected)
    )
}

/// Roles authorized to request an item-level status
fn item_transition_roles(to: ItemStatus) -> &'static [Role] {
    use ItemStatus::*;
    match to {
        Preparing | Ready => &[Role::Kitchen],
        Served => &[Role::Waiter],
        // 前厅与后厨都可能发现菜品无法供应
        Rejected => &[Role::Waiter, Role::Kitchen],
        Pending => &[],
    }
}

fn check_role(allowed: &[Role], actor: &Actor, requested: impl ToString) -> Result<(), OrderError> {
    if allowed.contains(&actor.role) {
        Ok(())
    } else {
        Err(OrderError::Unauthorized {
            role: actor.role,
            requested: requested.to_string(),
        })
    }
}

impl TransitionEngine {
    pub fn new(store: Arc<OrderStore>, broadcaster: Arc<EventBroadcaster>) -> Self {
        Self { store, broadcaster }
    }

    /// Place an order - enters the store in `Pending` with fully
    /// materialized items
    ///
    /// Item snapshots arrive from the catalog collaborator; prices and
    /// modifiers are frozen here and never re-read.
    pub fn place_order(&self, actor: &Actor, input: CreateOrderInput) -> Result<Order, OrderError> {
        // 1. Authorization: customers order for themselves, waiters on behalf
        check_role(&[Role::Customer, Role::Waiter], actor, "PLACE_ORDER")?;

        // 2. Validate input
        if input.items.is_empty() {
            return Err(OrderError::InvalidOperation(
                "order must contain at least one item".to_string(),
            ));
        }
        for item in &input.items {
            if item.quantity <= 0 {
                return Err(OrderError::InvalidOperation(format!(
                    "item {} has non-positive quantity",
                    item.menu_item_id
                )));
            }
            if item.unit_price < 0.0 {
                return Err(OrderError::InvalidOperation(format!(
                    "item {} has negative unit price",
                    item.menu_item_id
                )));
            }
        }

        // 3. Materialize item snapshots with computed subtotals
        let items: Vec<OrderItem> = input
            .items
            .into_iter()
            .map(|i| {
                let subtotal = money::item_subtotal(i.unit_price, &i.modifiers, i.quantity);
                OrderItem {
                    menu_item_id: i.menu_item_id,
                    name: i.name,
                    unit_price: i.unit_price,
                    quantity: i.quantity,
                    modifiers: i.modifiers,
                    special_instructions: i.special_instructions,
                    status: ItemStatus::Pending,
                    subtotal,
                }
            })
            .collect();
        let total = money::order_total(items.iter().map(|i| i.subtotal));

        // 4. Insert under the shard lock and publish the placement event
        let shard = self.store.shard(&actor.restaurant_id);
        let mut state = shard.lock();
        let now = now_millis();
        let order = Order {
            id: uuid::Uuid::new_v4().to_string(),
            order_number: state.next_order_number(),
            restaurant_id: actor.restaurant_id.clone(),
            table_id: input.table_id,
            placed_by: input.placed_by,
            items,
            status: OrderStatus::Pending,
            payment_status: shared::order::PaymentStatus::Pending,
            rejection_reason: None,
            order_notes: input.order_notes,
            total,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        state.insert(order.clone());

        let seq = state.next_sequence();
        let event = OrderEvent::new(
            seq,
            actor,
            EventPayload::StatusChanged {
                previous: None,
                current: OrderStatus::Pending,
            },
            order.clone(),
        );
        self.broadcaster.publish(&event);

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            restaurant_id = %order.restaurant_id,
            total = order.total,
            "Order placed"
        );
        Ok(order)
    }

    /// Apply an order-level fulfillment transition
    pub fn apply_order_transition(
        &self,
        actor: &Actor,
        order_id: &str,
        requested: OrderStatus,
        reason: Option<String>,
    ) -> Result<Order, OrderError> {
        let shard = self.store.shard(&actor.restaurant_id);
        let mut state = shard.lock();

        let current = state.get(order_id)?.clone();
        check_role(order_transition_roles(requested), actor, requested)?;
        self.advance_order_locked(&mut state, current, requested, reason, actor)
    }

    /// Apply an item-level transition, then evaluate auto-advancement
    pub fn apply_item_transition(
        &self,
        actor: &Actor,
        order_id: &str,
        item_index: usize,
        requested: ItemStatus,
    ) -> Result<Order, OrderError> {
        let shard = self.store.shard(&actor.restaurant_id);
        let mut state = shard.lock();

        // 1. Read current state
        let current = state.get(order_id)?.clone();

        // 2. Authorization + legality
        check_role(item_transition_roles(requested), actor, requested)?;
        if current.is_terminal() {
            return Err(OrderError::InvalidOperation(format!(
                "order {} is {} and can no longer change",
                order_id, current.status
            )));
        }
        let item = current
            .items
            .get(item_index)
            .ok_or_else(|| OrderError::ItemNotFound {
                order_id: order_id.to_string(),
                index: item_index,
            })?;
        let previous = item.status;
        if requested == previous {
            // Someone already applied it - caller refetches and retries
            return Err(OrderError::Conflict {
                order_id: order_id.to_string(),
                detail: format!("item {} is already {}", item_index, previous),
            });
        }
        if !item_transition_allowed(previous, requested) {
            return Err(OrderError::InvalidItemTransition {
                current: previous,
                requested,
            });
        }

        // 3. Commit the item write
        let mut updated = current.clone();
        updated.items[item_index].status = requested;
        let committed = state.commit(current.version, updated)?;

        // 4. Publish the item event
        let seq = state.next_sequence();
        let event = OrderEvent::new(
            seq,
            actor,
            EventPayload::ItemStatusChanged {
                item_index,
                previous,
                current: requested,
            },
            committed.clone(),
        );
        self.broadcaster.publish(&event);

        // 5. Auto-advance the parent order if the item unblocked it
        self.auto_advance_locked(&mut state, committed, actor)
    }

    /// Validate and apply one order-level transition on a locked shard
    ///
    /// Re-entrant path shared by direct requests and auto-advancement;
    /// role authorization is the caller's concern.
    fn advance_order_locked(
        &self,
        state: &mut ShardState,
        current: Order,
        requested: OrderStatus,
        reason: Option<String>,
        actor: &Actor,
    ) -> Result<Order, OrderError> {
        let previous = current.status;

        // Someone already applied this transition - caller refetches
        if requested == previous {
            return Err(OrderError::Conflict {
                order_id: current.id.clone(),
                detail: format!("status is already {}", previous),
            });
        }
        if !order_transition_allowed(previous, requested) {
            return Err(OrderError::InvalidTransition {
                current: previous,
                requested,
            });
        }

        // Cross-constraints against the item sub-machines and payment axis
        match requested {
            OrderStatus::Ready if !current.all_non_rejected_at_least(ItemStatus::Ready) => {
                return Err(OrderError::InvalidOperation(
                    "order cannot be READY until all non-rejected items are ready".to_string(),
                ));
            }
            OrderStatus::Served if !current.all_non_rejected_at_least(ItemStatus::Served) => {
                return Err(OrderError::InvalidOperation(
                    "order cannot be SERVED until all non-rejected items are served".to_string(),
                ));
            }
            OrderStatus::Completed if current.payment_status.blocks_completion() => {
                return Err(OrderError::PaymentNotSettled {
                    payment_status: current.payment_status,
                });
            }
            OrderStatus::Rejected if reason.as_deref().is_none_or(str::is_empty) => {
                return Err(OrderError::InvalidOperation(
                    "rejection requires a reason".to_string(),
                ));
            }
            _ => {}
        }

        // Commit
        let mut updated = current.clone();
        updated.status = requested;
        if requested == OrderStatus::Rejected {
            updated.rejection_reason = reason;
        }
        let committed = state.commit(current.version, updated)?;

        // Publish while holding the lock - write visible before the event
        let seq = state.next_sequence();
        let event = OrderEvent::new(
            seq,
            actor,
            EventPayload::StatusChanged {
                previous: Some(previous),
                current: requested,
            },
            committed.clone(),
        );
        self.broadcaster.publish(&event);

        tracing::info!(
            order_id = %committed.id,
            previous = %previous,
            current = %requested,
            actor_id = %actor.user_id,
            "Order transition applied"
        );
        Ok(committed)
    }

    /// Evaluate order-level auto-advancement after an item write
    ///
    /// Loops so that a lagging-item rejection can carry the order through
    /// Preparing → Ready → Served in one call when the rest were served
    /// already. Each step emits its own event.
    fn auto_advance_locked(
        &self,
        state: &mut ShardState,
        order: Order,
        actor: &Actor,
    ) -> Result<Order, OrderError> {
        let mut order = order;
        loop {
            let target = match order.status {
                OrderStatus::Preparing if order.all_non_rejected_at_least(ItemStatus::Ready) => {
                    OrderStatus::Ready
                }
                OrderStatus::Ready if order.all_non_rejected_at_least(ItemStatus::Served) => {
                    OrderStatus::Served
                }
                _ => break,
            };
            order = self.advance_order_locked(state, order, target, None, actor)?;
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests;
