//! Order record - the authoritative entity owned by the order store
//!
//! Status fields are only ever written by the transition engine. A terminal
//! order (`Completed` / `Rejected`) is immutable on the fulfillment axis;
//! the payment axis stays reconcilable (refunds).

use super::types::{ItemStatus, OrderItem, OrderStatus, PaymentStatus};
use serde::{Deserialize, Serialize};

/// Who placed the order - registered customer or anonymous guest
///
/// 注册顾客与匿名客人二选一，由类型保证。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlacedBy {
    Customer { user_id: String },
    Guest { name: String },
}

/// Authoritative order record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Opaque ID assigned by the server
    pub id: String,
    /// Human-readable number, unique per restaurant
    pub order_number: String,
    pub restaurant_id: String,
    pub table_id: String,
    pub placed_by: PlacedBy,
    /// Line items - insertion order is kitchen ticket order
    pub items: Vec<OrderItem>,
    /// Fulfillment status
    pub status: OrderStatus,
    /// Payment status - independent axis
    pub payment_status: PaymentStatus,
    /// Present only when status is Rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_notes: Option<String>,
    /// Sum of item subtotals, computed at placement - never edited directly
    pub total: f64,
    /// Write version - incremented on every committed mutation
    #[serde(default)]
    pub version: u64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Whether the fulfillment axis admits further transitions
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Items that still count toward order-level readiness
    pub fn non_rejected_items(&self) -> impl Iterator<Item = &OrderItem> {
        self.items
            .iter()
            .filter(|i| i.status != ItemStatus::Rejected)
    }

    /// True when every non-rejected item has the given status
    ///
    /// 所有菜品都被拒时返回 false，避免空集合触发自动推进。
    pub fn all_non_rejected(&self, status: ItemStatus) -> bool {
        let mut any = false;
        for item in self.non_rejected_items() {
            any = true;
            if item.status != status {
                return false;
            }
        }
        any
    }

    /// True when every non-rejected item has reached at least the given
    /// status on the item happy path
    pub fn all_non_rejected_at_least(&self, status: ItemStatus) -> bool {
        let Some(min) = status.progress() else {
            return false;
        };
        let mut any = false;
        for item in self.non_rejected_items() {
            any = true;
            match item.status.progress() {
                Some(p) if p >= min => {}
                _ => return false,
            }
        }
        any
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(status: ItemStatus) -> OrderItem {
        OrderItem {
            menu_item_id: "m-1".to_string(),
            name: "Paella".to_string(),
            unit_price: 12.0,
            quantity: 1,
            modifiers: vec![],
            special_instructions: None,
            status,
            subtotal: 12.0,
        }
    }

    fn order_with_items(items: Vec<OrderItem>) -> Order {
        Order {
            id: "o-1".to_string(),
            order_number: "ORD20250101-1".to_string(),
            restaurant_id: "r-1".to_string(),
            table_id: "t-1".to_string(),
            placed_by: PlacedBy::Guest {
                name: "Mesa 4".to_string(),
            },
            items,
            status: OrderStatus::Preparing,
            payment_status: PaymentStatus::Pending,
            rejection_reason: None,
            order_notes: None,
            total: 12.0,
            version: 1,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_all_non_rejected() {
        let order = order_with_items(vec![
            item(ItemStatus::Ready),
            item(ItemStatus::Rejected),
            item(ItemStatus::Ready),
        ]);
        assert!(order.all_non_rejected(ItemStatus::Ready));
        assert!(!order.all_non_rejected(ItemStatus::Served));
    }

    #[test]
    fn test_all_rejected_is_not_vacuously_ready() {
        let order = order_with_items(vec![item(ItemStatus::Rejected)]);
        assert!(!order.all_non_rejected(ItemStatus::Ready));
    }
}
