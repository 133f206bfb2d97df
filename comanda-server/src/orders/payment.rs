//! Payment reconciliation
//!
//! Maps payment-provider callbacks, waiter cash actions and internal
//! reconciliation to the payment axis. Orthogonal to fulfillment status, but
//! cross-constrained: the engine refuses to complete an order whose payment
//! is pending or failed (see `advance_order_locked`).
//!
//! Unlike the fulfillment axis, payment transitions stay legal on terminal
//! orders - a completed or rejected order may still be refunded.

use shared::order::{EventPayload, Order, OrderEvent, PaymentSource, PaymentStatus};
use shared::{Actor, Role};

use super::engine::TransitionEngine;
use super::error::OrderError;

/// Legal payment transition table
///
/// `Failed` 只能从 `Pending` 到达；退款需要资金已确认或已结算。
fn payment_transition_allowed(from: PaymentStatus, to: PaymentStatus) -> bool {
    use PaymentStatus::*;
    matches!(
        (from, to),
        (Pending, PendingCash)
            | (Pending, Paid)
            | (Pending, Failed)
            | (PendingCash, Paid)
            | (Paid, Completed)
            | (Paid, Refunded)
            | (Completed, Refunded)
    )
}

/// Which statuses a source may report
fn source_allowed(to: PaymentStatus, source: PaymentSource) -> bool {
    use PaymentStatus::*;
    match source {
        // 服务员只登记现金流程
        PaymentSource::ManualCash => matches!(to, PendingCash | Paid),
        PaymentSource::ProviderCallback => matches!(to, Paid | Completed | Failed | Refunded),
        PaymentSource::System => true,
    }
}

impl TransitionEngine {
    /// Apply a payment event to an order
    ///
    /// Customers and kitchen never touch the payment axis; the manual cash
    /// source is a waiter action. Provider callbacks arrive through the
    /// adapter's dedicated entry point, authenticated upstream.
    pub fn apply_payment_event(
        &self,
        actor: &Actor,
        order_id: &str,
        requested: PaymentStatus,
        source: PaymentSource,
    ) -> Result<Order, OrderError> {
        if matches!(actor.role, Role::Customer | Role::Kitchen) {
            return Err(OrderError::Unauthorized {
                role: actor.role,
                requested: requested.to_string(),
            });
        }
        if source == PaymentSource::ManualCash && actor.role != Role::Waiter {
            return Err(OrderError::Unauthorized {
                role: actor.role,
                requested: requested.to_string(),
            });
        }

        let shard = self.store.shard(&actor.restaurant_id);
        let mut state = shard.lock();

        // 1. Read current state
        let current = state.get(order_id)?.clone();
        let previous = current.payment_status;

        // 2. Legality
        if requested == previous {
            return Err(OrderError::Conflict {
                order_id: order_id.to_string(),
                detail: format!("payment status is already {}", previous),
            });
        }
        if !payment_transition_allowed(previous, requested) || !source_allowed(requested, source) {
            return Err(OrderError::InvalidPaymentTransition {
                current: previous,
                requested,
                payment_source: source,
            });
        }

        // 3. Commit
        let mut updated = current.clone();
        updated.payment_status = requested;
        let committed = state.commit(current.version, updated)?;

        // 4. Publish while holding the lock
        let seq = state.next_sequence();
        let event = OrderEvent::new(
            seq,
            actor,
            EventPayload::PaymentChanged {
                previous,
                current: requested,
                source,
            },
            committed.clone(),
        );
        self.broadcaster.publish(&event);

        tracing::info!(
            order_id = %committed.id,
            previous = %previous,
            current = %requested,
            source = ?source,
            "Payment event applied"
        );
        Ok(committed)
    }
}
