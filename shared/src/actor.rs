//! Actor identity supplied by the authentication collaborator
//!
//! 核心从不读取全局用户状态：每次调用都显式携带
//! `(user_id, role, restaurant_id)` 三元组。

use serde::{Deserialize, Serialize};
use std::fmt;

/// Request / connection role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 顾客 - 只能看到自己的订单
    Customer,
    /// 服务员 - 接单/上菜/收现金
    Waiter,
    /// 后厨 - 备餐
    Kitchen,
    /// 管理员 - 只读监控
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::Waiter => write!(f, "waiter"),
            Role::Kitchen => write!(f, "kitchen"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Identity tuple attached to every core call
///
/// The core trusts this tuple as given; issuing it is the auth
/// collaborator's job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
    pub restaurant_id: String,
}

impl Actor {
    pub fn new(
        user_id: impl Into<String>,
        role: Role,
        restaurant_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            restaurant_id: restaurant_id.into(),
        }
    }
}

/// What a customer connection may observe
///
/// Staff roles carry an empty scope. For customers at least one field is set
/// by the session collaborator (table session or a specific order).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewerScope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
}

impl ViewerScope {
    /// Scope limited to a single order
    pub fn for_order(order_id: impl Into<String>) -> Self {
        Self {
            order_id: Some(order_id.into()),
            table_id: None,
        }
    }

    /// Scope limited to a table session
    pub fn for_table(table_id: impl Into<String>) -> Self {
        Self {
            order_id: None,
            table_id: Some(table_id.into()),
        }
    }

    /// Whether an order identified by `(order_id, table_id)` falls inside
    /// this scope
    pub fn matches(&self, order_id: &str, table_id: &str) -> bool {
        if let Some(oid) = &self.order_id
            && oid == order_id
        {
            return true;
        }
        if let Some(tid) = &self.table_id
            && tid == table_id
        {
            return true;
        }
        false
    }
}
