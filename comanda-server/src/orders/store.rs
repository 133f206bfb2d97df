//! Order record store - per-restaurant single-writer authority
//!
//! # 架构
//!
//! ```text
//! OrderStore
//!   └── shards: DashMap<restaurant_id, Arc<RestaurantShard>>
//!         └── Mutex<ShardState>          ◄── 每家餐厅的唯一写入者
//!               ├── orders: HashMap<order_id, Order>
//!               ├── event_seq  (事件序号, 权威排序)
//!               └── order_count (单号计数)
//! ```
//!
//! The shard mutex serializes every read-verify-write sequence for one
//! restaurant; different restaurants proceed fully in parallel. All status
//! mutation goes through [`ShardState::commit`], which checks the stored
//! version so a lost update can never be silent.

use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};
use shared::order::{Order, OrderStatus};
use shared::util::now_millis;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Store errors
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("version conflict on order {order_id}: expected {expected}, stored {actual}")]
    VersionConflict {
        order_id: String,
        expected: u64,
        actual: u64,
    },
}

/// Authoritative order store
#[derive(Debug, Default)]
pub struct OrderStore {
    shards: DashMap<String, Arc<RestaurantShard>>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shard for a restaurant, created on first use
    pub fn shard(&self, restaurant_id: &str) -> Arc<RestaurantShard> {
        self.shards
            .entry(restaurant_id.to_string())
            .or_default()
            .clone()
    }

    /// Point-in-time copy of all orders plus the sequence it reflects
    ///
    /// Taken under the shard lock, so the snapshot is consistent with the
    /// event stream: every event with `sequence <= returned sequence` is
    /// already folded in.
    pub fn snapshot(&self, restaurant_id: &str) -> (Vec<Order>, u64) {
        let shard = self.shard(restaurant_id);
        let state = shard.lock();
        let mut orders: Vec<Order> = state.orders.values().cloned().collect();
        orders.sort_by_key(|o| o.created_at);
        (orders, state.current_sequence())
    }

    /// Orders for a restaurant, optionally filtered by status
    pub fn list(&self, restaurant_id: &str, status: Option<OrderStatus>) -> Vec<Order> {
        let shard = self.shard(restaurant_id);
        let state = shard.lock();
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|o| status.is_none_or(|s| o.status == s))
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.created_at);
        orders
    }

    /// Single order lookup
    pub fn get(&self, restaurant_id: &str, order_id: &str) -> Option<Order> {
        let shard = self.shard(restaurant_id);
        let state = shard.lock();
        state.orders.get(order_id).cloned()
    }
}

/// One restaurant's authority
#[derive(Debug, Default)]
pub struct RestaurantShard {
    state: Mutex<ShardState>,
}

impl RestaurantShard {
    /// Lock the shard - holds the single-writer authority for the restaurant
    pub fn lock(&self) -> MutexGuard<'_, ShardState> {
        self.state.lock()
    }
}

/// Mutable per-restaurant state, guarded by the shard mutex
#[derive(Debug, Default)]
pub struct ShardState {
    orders: HashMap<String, Order>,
    event_seq: u64,
    order_count: u64,
}

impl ShardState {
    /// Current state of an order, as stored
    pub fn get(&self, order_id: &str) -> Result<&Order, StoreError> {
        self.orders
            .get(order_id)
            .ok_or_else(|| StoreError::OrderNotFound(order_id.to_string()))
    }

    /// Insert a freshly placed order
    pub fn insert(&mut self, order: Order) {
        self.orders.insert(order.id.clone(), order);
    }

    /// Version-checked write - the only mutation path for existing orders
    ///
    /// 存储版本与读取版本不一致说明发生并发写入，拒绝而不是覆盖。
    pub fn commit(&mut self, expected_version: u64, mut order: Order) -> Result<Order, StoreError> {
        let stored = self.get(&order.id)?;
        if stored.version != expected_version {
            return Err(StoreError::VersionConflict {
                order_id: order.id.clone(),
                expected: expected_version,
                actual: stored.version,
            });
        }
        order.version = expected_version + 1;
        order.updated_at = now_millis();
        self.orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    /// Allocate the next event sequence number
    pub fn next_sequence(&mut self) -> u64 {
        self.event_seq += 1;
        self.event_seq
    }

    /// Sequence of the most recently allocated event
    pub fn current_sequence(&self) -> u64 {
        self.event_seq
    }

    /// Generate the next human-readable order number
    pub fn next_order_number(&mut self) -> String {
        self.order_count += 1;
        let date_str = chrono::Local::now().format("%Y%m%d").to_string();
        format!("ORD{}-{}", date_str, 10000 + self.order_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{PaymentStatus, PlacedBy};

    fn make_order(id: &str) -> Order {
        Order {
            id: id.to_string(),
            order_number: format!("ORD-{}", id),
            restaurant_id: "r-1".to_string(),
            table_id: "t-1".to_string(),
            placed_by: PlacedBy::Guest {
                name: "Mesa 2".to_string(),
            },
            items: vec![],
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            rejection_reason: None,
            order_notes: None,
            total: 0.0,
            version: 1,
            created_at: now_millis(),
            updated_at: now_millis(),
        }
    }

    #[test]
    fn test_commit_increments_version() {
        let store = OrderStore::new();
        let shard = store.shard("r-1");
        let mut state = shard.lock();

        state.insert(make_order("o-1"));
        let mut order = state.get("o-1").unwrap().clone();
        order.status = OrderStatus::Accepted;

        let committed = state.commit(1, order).unwrap();
        assert_eq!(committed.version, 2);
        assert_eq!(state.get("o-1").unwrap().status, OrderStatus::Accepted);
    }

    #[test]
    fn test_commit_rejects_stale_version() {
        let store = OrderStore::new();
        let shard = store.shard("r-1");
        let mut state = shard.lock();

        state.insert(make_order("o-1"));
        let order = state.get("o-1").unwrap().clone();
        state.commit(1, order.clone()).unwrap();

        // Second writer still holds version 1
        let result = state.commit(1, order);
        assert!(matches!(
            result,
            Err(StoreError::VersionConflict {
                expected: 1,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_restaurants_are_isolated() {
        let store = OrderStore::new();
        {
            let shard = store.shard("r-1");
            let mut state = shard.lock();
            state.insert(make_order("o-1"));
        }

        assert!(store.get("r-1", "o-1").is_some());
        assert!(store.get("r-2", "o-1").is_none());
    }

    #[test]
    fn test_snapshot_reflects_sequence() {
        let store = OrderStore::new();
        let shard = store.shard("r-1");
        {
            let mut state = shard.lock();
            state.insert(make_order("o-1"));
            state.next_sequence();
            state.next_sequence();
        }

        let (orders, seq) = store.snapshot("r-1");
        assert_eq!(orders.len(), 1);
        assert_eq!(seq, 2);
    }

    #[test]
    fn test_order_number_is_monotonic() {
        let store = OrderStore::new();
        let shard = store.shard("r-1");
        let mut state = shard.lock();
        let a = state.next_order_number();
        let b = state.next_order_number();
        assert_ne!(a, b);
        assert!(a.ends_with("10001"));
        assert!(b.ends_with("10002"));
    }
}
