//! Live connection API Module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Live WebSocket router
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/live/ws", get(handler::handle_live_ws))
}
