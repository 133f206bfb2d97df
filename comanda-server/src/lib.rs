//! Comanda Order Service
//!
//! Single-process authority for the restaurant order lifecycle: the status
//! transition engine, payment reconciliation, role-projected views and the
//! real-time fan-out to live connections.
//!
//! ```text
//! Client action (REST)
//!        │
//!        ▼
//! TransitionEngine ──► OrderStore (per-restaurant shard, single writer)
//!        │
//!        ▼ (same lock, synchronous)
//! EventBroadcaster ──► ConnectionRegistry ──► live WebSocket sessions
//!                                              (role projection at delivery)
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod orders;
pub mod realtime;
pub mod utils;

pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResponse};

/// 设置运行环境 (dotenv, 日志)
///
/// Must run before `Config::from_env` so .env values are visible.
pub fn setup_environment() {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    utils::logger::init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
}
