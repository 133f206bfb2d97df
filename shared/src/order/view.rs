//! Role-projected order views
//!
//! Each role sees a different subset and shape of an order. The projection
//! itself lives server-side and runs at delivery time, per connection; these
//! are the wire shapes it produces.

use super::model::Order;
use super::types::{ItemStatus, ModifierSelection, OrderStatus, PaymentStatus};
use serde::{Deserialize, Serialize};

/// One order as seen by one role
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleView {
    Customer(CustomerOrderView),
    Waiter(WaiterOrderView),
    Kitchen(KitchenTicketView),
    Admin(AdminOrderView),
}

impl RoleView {
    /// ID of the projected order
    pub fn order_id(&self) -> &str {
        match self {
            RoleView::Customer(v) => &v.order_id,
            RoleView::Waiter(v) => &v.order.id,
            RoleView::Kitchen(v) => &v.order_id,
            RoleView::Admin(v) => &v.order.id,
        }
    }
}

// ============================================================================
// Customer
// ============================================================================

/// "Track my order" view - internal fields stripped
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerOrderView {
    pub order_id: String,
    pub order_number: String,
    pub table_id: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub items: Vec<CustomerItemView>,
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Live item status for the customer's tracking UI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerItemView {
    pub name: String,
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<ModifierSelection>,
    pub status: ItemStatus,
    pub subtotal: f64,
}

// ============================================================================
// Waiter
// ============================================================================

/// Waiter view - the full order plus a derived actionable flag
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaiterOrderView {
    pub order: Order,
    /// True when the order is in a state the waiter may act on
    pub actionable: bool,
}

// ============================================================================
// Kitchen
// ============================================================================

/// Kitchen display ticket - accepted/preparing orders only
///
/// 被拒菜品以划线方式保留（`struck`），后厨一眼看到修正后的单子。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KitchenTicketView {
    pub order_id: String,
    pub order_number: String,
    pub table_id: String,
    pub status: OrderStatus,
    /// Items in creation order for ticket printing
    pub items: Vec<KitchenItemView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_notes: Option<String>,
    pub placed_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KitchenItemView {
    pub name: String,
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<ModifierSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    pub status: ItemStatus,
    /// Rejected items are shown struck through, not hidden
    pub struck: bool,
}

// ============================================================================
// Admin
// ============================================================================

/// Full read-only projection, including payment and rejection metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminOrderView {
    pub order: Order,
}
