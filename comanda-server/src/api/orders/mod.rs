//! Order API Module
//!
//! All mutations go through the transition engine; reads return
//! role-projected views. The list endpoint doubles as the polling fallback
//! and the reconnection sync path.

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Place order / role-projected list
        .route("/", post(handler::create).get(handler::list))
        // Role-projected single order
        .route("/{id}", get(handler::get_by_id))
        // Fulfillment transitions (role-gated)
        .route("/{id}/status", patch(handler::update_status))
        .route(
            "/{id}/items/{index}/status",
            patch(handler::update_item_status),
        )
        // Payment axis
        .route("/{id}/payment", patch(handler::update_payment))
        .route("/{id}/payment/callback", post(handler::payment_callback))
}
