//! Role view projector
//!
//! Pure functions - no store access, no locking. Projection runs at delivery
//! time, per connection, so a connection always sees a view consistent with
//! its current role and scope.

use shared::live::ProjectedEvent;
use shared::order::{
    AdminOrderView, CustomerItemView, CustomerOrderView, EventPayload, KitchenItemView,
    KitchenTicketView, ItemStatus, Order, OrderEvent, OrderStatus, PaymentStatus, RoleView,
    WaiterOrderView,
};
use shared::{Role, ViewerScope};

/// Project one order for one role
///
/// Returns None when the order is outside the role's scope (customer: not
/// their order/table; kitchen: not accepted/preparing).
pub fn project(order: &Order, role: Role, scope: &ViewerScope) -> Option<RoleView> {
    match role {
        Role::Customer => scope
            .matches(&order.id, &order.table_id)
            .then(|| RoleView::Customer(customer_view(order))),
        Role::Waiter => Some(RoleView::Waiter(WaiterOrderView {
            order: order.clone(),
            actionable: waiter_actionable(order),
        })),
        Role::Kitchen => {
            in_kitchen_scope(order.status).then(|| RoleView::Kitchen(kitchen_ticket(order)))
        }
        Role::Admin => Some(RoleView::Admin(AdminOrderView {
            order: order.clone(),
        })),
    }
}

/// Project one event for one connection
///
/// A kitchen connection also receives an event with `view: None` when the
/// order just left its scope (e.g. preparing → ready), so the display can
/// drop the ticket without waiting for a resync. Customers outside their
/// scope never see the event at all.
pub fn project_event(event: &OrderEvent, role: Role, scope: &ViewerScope) -> Option<ProjectedEvent> {
    let view = project(&event.order, role, scope);
    match role {
        Role::Customer => view.map(|v| projected(event, Some(v))),
        Role::Kitchen => {
            if view.is_some() {
                Some(projected(event, view))
            } else if kitchen_saw_previous(event) {
                Some(projected(event, None))
            } else {
                None
            }
        }
        Role::Waiter | Role::Admin => Some(projected(event, view)),
    }
}

fn projected(event: &OrderEvent, view: Option<RoleView>) -> ProjectedEvent {
    ProjectedEvent {
        event_id: event.event_id.clone(),
        sequence: event.sequence,
        order_id: event.order_id.clone(),
        event_type: event.event_type,
        payload: event.payload.clone(),
        view,
    }
}

/// Kitchen sees accepted and preparing orders only
fn in_kitchen_scope(status: OrderStatus) -> bool {
    matches!(status, OrderStatus::Accepted | OrderStatus::Preparing)
}

/// Whether the order was inside kitchen scope before this event
fn kitchen_saw_previous(event: &OrderEvent) -> bool {
    matches!(
        &event.payload,
        EventPayload::StatusChanged {
            previous: Some(p),
            ..
        } if in_kitchen_scope(*p)
    )
}

/// Waiter may act on: pending (accept/reject), ready (serve), served with
/// unsettled payment (cash / completion)
fn waiter_actionable(order: &Order) -> bool {
    match order.status {
        OrderStatus::Pending | OrderStatus::Ready => true,
        OrderStatus::Served => matches!(
            order.payment_status,
            PaymentStatus::Pending | PaymentStatus::PendingCash | PaymentStatus::Failed
        ),
        _ => false,
    }
}

/// "Track my order" shape - internal fields stripped
fn customer_view(order: &Order) -> CustomerOrderView {
    CustomerOrderView {
        order_id: order.id.clone(),
        order_number: order.order_number.clone(),
        table_id: order.table_id.clone(),
        status: order.status,
        payment_status: order.payment_status,
        items: order
            .items
            .iter()
            .map(|i| CustomerItemView {
                name: i.name.clone(),
                quantity: i.quantity,
                modifiers: i.modifiers.clone(),
                status: i.status,
                subtotal: i.subtotal,
            })
            .collect(),
        total: order.total,
        order_notes: order.order_notes.clone(),
        rejection_reason: order.rejection_reason.clone(),
        created_at: order.created_at,
        updated_at: order.updated_at,
    }
}

/// Kitchen ticket - items in creation order, rejected items struck
fn kitchen_ticket(order: &Order) -> KitchenTicketView {
    KitchenTicketView {
        order_id: order.id.clone(),
        order_number: order.order_number.clone(),
        table_id: order.table_id.clone(),
        status: order.status,
        items: order
            .items
            .iter()
            .map(|i| KitchenItemView {
                name: i.name.clone(),
                quantity: i.quantity,
                modifiers: i.modifiers.clone(),
                special_instructions: i.special_instructions.clone(),
                status: i.status,
                struck: i.status == ItemStatus::Rejected,
            })
            .collect(),
        order_notes: order.order_notes.clone(),
        placed_at: order.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Actor;
    use shared::order::{OrderItem, PlacedBy};

    fn make_item(name: &str, status: ItemStatus) -> OrderItem {
        OrderItem {
            menu_item_id: format!("m-{}", name),
            name: name.to_string(),
            unit_price: 10.0,
            quantity: 1,
            modifiers: vec![],
            special_instructions: None,
            status,
            subtotal: 10.0,
        }
    }

    fn make_order(status: OrderStatus) -> Order {
        Order {
            id: "o-1".to_string(),
            order_number: "ORD20250101-10001".to_string(),
            restaurant_id: "r-1".to_string(),
            table_id: "t-4".to_string(),
            placed_by: PlacedBy::Customer {
                user_id: "user-7".to_string(),
            },
            items: vec![
                make_item("Gazpacho", ItemStatus::Pending),
                make_item("Tortilla", ItemStatus::Rejected),
            ],
            status,
            payment_status: PaymentStatus::Pending,
            rejection_reason: None,
            order_notes: None,
            total: 20.0,
            version: 1,
            created_at: 1,
            updated_at: 1,
        }
    }

    #[test]
    fn test_customer_scope_filtering() {
        let order = make_order(OrderStatus::Pending);

        let own = project(&order, Role::Customer, &ViewerScope::for_table("t-4"));
        assert!(matches!(own, Some(RoleView::Customer(_))));

        let other = project(&order, Role::Customer, &ViewerScope::for_table("t-9"));
        assert!(other.is_none());

        let by_order = project(&order, Role::Customer, &ViewerScope::for_order("o-1"));
        assert!(by_order.is_some());
    }

    #[test]
    fn test_customer_view_strips_internals() {
        let order = make_order(OrderStatus::Pending);
        let Some(RoleView::Customer(view)) =
            project(&order, Role::Customer, &ViewerScope::for_order("o-1"))
        else {
            panic!("expected customer view");
        };
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.total, 20.0);
        // No placed_by / version in the customer shape - enforced by the type
    }

    #[test]
    fn test_waiter_actionable_flag() {
        let pending = make_order(OrderStatus::Pending);
        let Some(RoleView::Waiter(view)) = project(&pending, Role::Waiter, &ViewerScope::default())
        else {
            panic!("expected waiter view");
        };
        assert!(view.actionable);

        let mut served = make_order(OrderStatus::Served);
        served.payment_status = PaymentStatus::PendingCash;
        let Some(RoleView::Waiter(view)) = project(&served, Role::Waiter, &ViewerScope::default())
        else {
            panic!("expected waiter view");
        };
        assert!(view.actionable);

        served.payment_status = PaymentStatus::Paid;
        let Some(RoleView::Waiter(view)) = project(&served, Role::Waiter, &ViewerScope::default())
        else {
            panic!("expected waiter view");
        };
        assert!(!view.actionable);

        let preparing = make_order(OrderStatus::Preparing);
        let Some(RoleView::Waiter(view)) =
            project(&preparing, Role::Waiter, &ViewerScope::default())
        else {
            panic!("expected waiter view");
        };
        assert!(!view.actionable);
    }

    #[test]
    fn test_kitchen_scope_and_struck_items() {
        let pending = make_order(OrderStatus::Pending);
        assert!(project(&pending, Role::Kitchen, &ViewerScope::default()).is_none());

        let preparing = make_order(OrderStatus::Preparing);
        let Some(RoleView::Kitchen(ticket)) =
            project(&preparing, Role::Kitchen, &ViewerScope::default())
        else {
            panic!("expected kitchen ticket");
        };
        // Rejected items struck through, not hidden
        assert_eq!(ticket.items.len(), 2);
        assert!(!ticket.items[0].struck);
        assert!(ticket.items[1].struck);
    }

    #[test]
    fn test_admin_sees_everything() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Completed,
            OrderStatus::Rejected,
        ] {
            let order = make_order(status);
            assert!(project(&order, Role::Admin, &ViewerScope::default()).is_some());
        }
    }

    #[test]
    fn test_kitchen_event_on_scope_exit() {
        let kitchen_actor = Actor::new("cook-1", Role::Kitchen, "r-1");
        let order = make_order(OrderStatus::Ready);
        let event = OrderEvent::new(
            5,
            &kitchen_actor,
            EventPayload::StatusChanged {
                previous: Some(OrderStatus::Preparing),
                current: OrderStatus::Ready,
            },
            order,
        );

        let projected = project_event(&event, Role::Kitchen, &ViewerScope::default())
            .expect("kitchen should see the scope exit");
        assert!(projected.view.is_none());

        // A customer outside scope sees nothing
        assert!(project_event(&event, Role::Customer, &ViewerScope::for_table("t-9")).is_none());

        // The waiter always gets the projected order
        let waiter = project_event(&event, Role::Waiter, &ViewerScope::default()).unwrap();
        assert!(waiter.view.is_some());
    }
}
