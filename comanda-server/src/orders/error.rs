//! Transition engine errors
//!
//! Every error leaves the order untouched: either the write and its event
//! both happen, or neither does.

use shared::Role;
use shared::order::{ItemStatus, OrderStatus, PaymentSource, PaymentStatus};
use thiserror::Error;

use super::store::StoreError;
use crate::utils::AppError;

/// Engine errors, surfaced synchronously to the mutating caller
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    /// Requested status not reachable from the current status
    #[error("invalid transition: {current} -> {requested}")]
    InvalidTransition {
        current: OrderStatus,
        requested: OrderStatus,
    },

    #[error("invalid item transition: {current} -> {requested}")]
    InvalidItemTransition {
        current: ItemStatus,
        requested: ItemStatus,
    },

    #[error("invalid payment transition: {current} -> {requested} (source {payment_source:?})")]
    InvalidPaymentTransition {
        current: PaymentStatus,
        requested: PaymentStatus,
        payment_source: PaymentSource,
    },

    /// 并发写冲突 - 调用方应拉取最新状态后重试
    #[error("conflicting update on order {order_id}: {detail}")]
    Conflict { order_id: String, detail: String },

    #[error("role {role} may not request {requested}")]
    Unauthorized { role: Role, requested: String },

    /// Fulfillment completion blocked by the payment axis
    #[error("payment not settled: {payment_status}")]
    PaymentNotSettled { payment_status: PaymentStatus },

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("item {index} not found on order {order_id}")]
    ItemNotFound { order_id: String, index: usize },

    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl From<StoreError> for OrderError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::OrderNotFound(id) => OrderError::OrderNotFound(id),
            StoreError::VersionConflict {
                order_id,
                expected,
                actual,
            } => OrderError::Conflict {
                order_id,
                detail: format!("version moved from {} to {}", expected, actual),
            },
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match &err {
            OrderError::OrderNotFound(_) | OrderError::ItemNotFound { .. } => {
                AppError::NotFound(err.to_string())
            }
            OrderError::Conflict { .. } => AppError::Conflict(err.to_string()),
            OrderError::Unauthorized { .. } => AppError::Forbidden(err.to_string()),
            OrderError::InvalidTransition { .. }
            | OrderError::InvalidItemTransition { .. }
            | OrderError::InvalidPaymentTransition { .. }
            | OrderError::PaymentNotSettled { .. } => AppError::BusinessRule(err.to_string()),
            OrderError::InvalidOperation(_) => AppError::Validation(err.to_string()),
        }
    }
}
