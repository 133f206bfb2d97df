//! Shared types for the order lifecycle
//!
//! Status enums are serialized SCREAMING_SNAKE_CASE on the wire. Item
//! snapshots are immutable after placement: names, prices and modifiers are
//! copied from the catalog at order time and never re-read.

use super::model::PlacedBy;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Status Axes
// ============================================================================

/// Order fulfillment status
///
/// 正向流转: Pending → Accepted → Preparing → Ready → Served → Completed。
/// Rejected 只能从 Pending 或 Accepted 到达。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Accepted,
    Preparing,
    Ready,
    Served,
    Completed,
    Rejected,
}

impl OrderStatus {
    /// Terminal states admit no further fulfillment transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Rejected)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Accepted => write!(f, "ACCEPTED"),
            OrderStatus::Preparing => write!(f, "PREPARING"),
            OrderStatus::Ready => write!(f, "READY"),
            OrderStatus::Served => write!(f, "SERVED"),
            OrderStatus::Completed => write!(f, "COMPLETED"),
            OrderStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// Line item status - independent sub-state machine per item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Served,
    Rejected,
}

impl ItemStatus {
    /// Position on the item happy path; None for Rejected
    pub fn progress(&self) -> Option<u8> {
        match self {
            ItemStatus::Pending => Some(0),
            ItemStatus::Preparing => Some(1),
            ItemStatus::Ready => Some(2),
            ItemStatus::Served => Some(3),
            ItemStatus::Rejected => None,
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemStatus::Pending => write!(f, "PENDING"),
            ItemStatus::Preparing => write!(f, "PREPARING"),
            ItemStatus::Ready => write!(f, "READY"),
            ItemStatus::Served => write!(f, "SERVED"),
            ItemStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// Payment status - independent axis from fulfillment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    /// 服务员已登记现金待收
    PendingCash,
    /// 支付渠道已确认
    Paid,
    /// 资金已结算
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Payment states that block order completion
    pub fn blocks_completion(&self) -> bool {
        matches!(self, PaymentStatus::Pending | PaymentStatus::Failed)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "PENDING"),
            PaymentStatus::PendingCash => write!(f, "PENDING_CASH"),
            PaymentStatus::Paid => write!(f, "PAID"),
            PaymentStatus::Completed => write!(f, "COMPLETED"),
            PaymentStatus::Failed => write!(f, "FAILED"),
            PaymentStatus::Refunded => write!(f, "REFUNDED"),
        }
    }
}

/// Where a payment event came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentSource {
    /// 支付渠道回调
    ProviderCallback,
    /// 服务员现金操作
    ManualCash,
    /// 内部对账
    System,
}

// ============================================================================
// Items
// ============================================================================

/// One selected modifier option - snapshot at order time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModifierSelection {
    /// Modifier group name (e.g. "Size")
    pub group: String,
    /// Selected option name (e.g. "Large")
    pub option: String,
    /// Per-option price delta applied to the unit price
    #[serde(default)]
    pub price_delta: f64,
}

/// Line item snapshot - immutable after placement except for `status`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Catalog product ID
    pub menu_item_id: String,
    /// Product name snapshot
    pub name: String,
    /// Unit price at order time - never re-read from the catalog
    pub unit_price: f64,
    /// Quantity
    pub quantity: i32,
    /// Selected modifiers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<ModifierSelection>,
    /// Free-text kitchen note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    /// Item status
    pub status: ItemStatus,
    /// (unit_price + Σ modifier deltas) × quantity, computed at placement
    pub subtotal: f64,
}

/// Item input for order placement - without the computed/server fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub menu_item_id: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i32,
    #[serde(default)]
    pub modifiers: Vec<ModifierSelection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
}

/// Order placement input
///
/// Items arrive fully materialized from the catalog collaborator; the core
/// only snapshots them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderInput {
    pub table_id: String,
    pub placed_by: PlacedBy,
    pub items: Vec<OrderItemInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_notes: Option<String>,
}
