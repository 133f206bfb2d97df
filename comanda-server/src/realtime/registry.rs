//! Connection registry - live sessions keyed by restaurant
//!
//! # 架构
//!
//! ```text
//! ConnectionRegistry
//!   ├── channels: DashMap<restaurant_id, RestaurantChannel>
//!   │     └── connections: DashMap<connection_id, Arc<Connection>>
//!   │           └── tx: mpsc::Sender<Arc<OrderEvent>>  (有界队列)
//!   └── index: DashMap<connection_id, restaurant_id>
//! ```
//!
//! Registration inserts the connection *before* the caller takes its
//! snapshot, so no event can fall between snapshot and fan-out; events
//! queued before the snapshot are filtered by sequence in the session loop.
//!
//! Dead connections (closed socket or stale heartbeat) are collected by a
//! background sweep within a bounded interval so the fan-out set cannot grow
//! without bound.

use dashmap::DashMap;
use shared::order::OrderEvent;
use shared::util::now_millis;
use shared::{Role, ViewerScope};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Per-connection outbound queue capacity
///
/// 队列满说明消费端跟不上；事件被丢弃，由下一次快照同步补齐。
pub(crate) const CONNECTION_QUEUE_CAPACITY: usize = 256;

/// One live connection
#[derive(Debug)]
pub struct Connection {
    pub id: String,
    pub restaurant_id: String,
    pub role: Role,
    pub scope: ViewerScope,
    pub(crate) tx: mpsc::Sender<Arc<OrderEvent>>,
    last_seen: AtomicI64,
}

impl Connection {
    /// Record a heartbeat
    pub fn touch(&self) {
        self.last_seen.store(now_millis(), Ordering::Relaxed);
    }

    fn is_stale(&self, timeout_ms: i64) -> bool {
        now_millis() - self.last_seen.load(Ordering::Relaxed) > timeout_ms
    }
}

#[derive(Debug, Default)]
struct RestaurantChannel {
    connections: DashMap<String, Arc<Connection>>,
}

/// Registry of live connections, keyed by restaurant
#[derive(Debug)]
pub struct ConnectionRegistry {
    channels: DashMap<String, RestaurantChannel>,
    /// connection_id → restaurant_id reverse index
    index: DashMap<String, String>,
    heartbeat_timeout_ms: i64,
}

impl ConnectionRegistry {
    pub fn new(heartbeat_timeout_ms: i64) -> Self {
        Self {
            channels: DashMap::new(),
            index: DashMap::new(),
            heartbeat_timeout_ms,
        }
    }

    /// Register a live connection and return its event queue
    ///
    /// Events start queueing immediately. The caller must take its snapshot
    /// *after* this call and filter queued events by sequence.
    pub fn register(
        &self,
        connection_id: &str,
        restaurant_id: &str,
        role: Role,
        scope: ViewerScope,
    ) -> mpsc::Receiver<Arc<OrderEvent>> {
        let (tx, rx) = mpsc::channel(CONNECTION_QUEUE_CAPACITY);
        let conn = Arc::new(Connection {
            id: connection_id.to_string(),
            restaurant_id: restaurant_id.to_string(),
            role,
            scope,
            tx,
            last_seen: AtomicI64::new(now_millis()),
        });

        self.channels
            .entry(restaurant_id.to_string())
            .or_default()
            .connections
            .insert(connection_id.to_string(), conn);
        self.index
            .insert(connection_id.to_string(), restaurant_id.to_string());

        tracing::info!(
            connection_id = %connection_id,
            restaurant_id = %restaurant_id,
            role = %role,
            "Connection registered"
        );
        rx
    }

    /// Remove a connection; empty restaurant entries are cleaned up
    pub fn unregister(&self, connection_id: &str) {
        if let Some((_, restaurant_id)) = self.index.remove(connection_id) {
            if let Some(channel) = self.channels.get(&restaurant_id) {
                channel.connections.remove(connection_id);
            }
            self.channels
                .remove_if(&restaurant_id, |_, ch| ch.connections.is_empty());
            tracing::info!(connection_id = %connection_id, "Connection unregistered");
        }
    }

    /// Record a heartbeat for a connection
    pub fn heartbeat(&self, connection_id: &str) {
        if let Some(restaurant_id) = self.index.get(connection_id)
            && let Some(channel) = self.channels.get(restaurant_id.value())
            && let Some(conn) = channel.connections.get(connection_id)
        {
            conn.touch();
        }
    }

    /// Live connections for a restaurant
    pub(crate) fn connections(&self, restaurant_id: &str) -> Vec<Arc<Connection>> {
        self.channels
            .get(restaurant_id)
            .map(|ch| ch.connections.iter().map(|e| e.value().clone()).collect())
            .unwrap_or_default()
    }

    /// Number of live connections for a restaurant
    pub fn connection_count(&self, restaurant_id: &str) -> usize {
        self.channels
            .get(restaurant_id)
            .map(|ch| ch.connections.len())
            .unwrap_or(0)
    }

    /// Drop connections whose queue is closed or whose heartbeat is stale
    fn sweep(&self) {
        let mut dead: Vec<String> = Vec::new();
        for channel in self.channels.iter() {
            for conn in channel.connections.iter() {
                if conn.tx.is_closed() || conn.is_stale(self.heartbeat_timeout_ms) {
                    dead.push(conn.id.clone());
                }
            }
        }
        if !dead.is_empty() {
            tracing::debug!(count = dead.len(), "Sweeping dead connections");
            for id in dead {
                self.unregister(&id);
            }
        }
    }

    /// Run the sweep loop until shutdown
    pub async fn run_sweeper(self: Arc<Self>, interval_ms: u64, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
        ticker.tick().await; // skip immediate
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::debug!("Connection sweeper stopping");
                    break;
                }
                _ = ticker.tick() => {
                    self.sweep();
                }
            }
        }
    }
}
