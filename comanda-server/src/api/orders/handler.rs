//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::order::{
    CreateOrderInput, ItemStatus, Order, OrderStatus, PaymentSource, PaymentStatus, RoleView,
};

use crate::auth::AuthContext;
use crate::core::ServerState;
use crate::orders::projection;
use crate::utils::{AppError, AppResult};

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Filter by fulfillment status
    pub status: Option<OrderStatus>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

/// Place an order (customer or waiter)
pub async fn create(
    State(state): State<ServerState>,
    ctx: AuthContext,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<Json<Order>> {
    let order = state.engine.place_order(&ctx.actor, input)?;
    Ok(Json(order))
}

/// Role-projected order list
///
/// Shared by the polling fallback and reconnection sync, so both converge on
/// the same state as the push path by construction.
pub async fn list(
    State(state): State<ServerState>,
    ctx: AuthContext,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<RoleView>>> {
    let orders = state.store.list(&ctx.actor.restaurant_id, query.status);
    let views: Vec<RoleView> = orders
        .iter()
        .filter_map(|o| projection::project(o, ctx.actor.role, &ctx.scope))
        .take(query.limit)
        .collect();
    Ok(Json(views))
}

/// Role-projected single order
pub async fn get_by_id(
    State(state): State<ServerState>,
    ctx: AuthContext,
    Path(id): Path<String>,
) -> AppResult<Json<RoleView>> {
    let order = state
        .store
        .get(&ctx.actor.restaurant_id, &id)
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;
    let view = projection::project(&order, ctx.actor.role, &ctx.scope)
        .ok_or_else(|| AppError::forbidden("Order not visible to this role"))?;
    Ok(Json(view))
}

/// Order status transition request
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    /// Required when requesting REJECTED
    #[serde(default)]
    pub reason: Option<String>,
}

/// Apply an order-level fulfillment transition (role-gated)
pub async fn update_status(
    State(state): State<ServerState>,
    ctx: AuthContext,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> AppResult<Json<Order>> {
    let order = state
        .engine
        .apply_order_transition(&ctx.actor, &id, req.status, req.reason)?;
    Ok(Json(order))
}

/// Item status transition request
#[derive(Debug, Deserialize)]
pub struct UpdateItemStatusRequest {
    pub status: ItemStatus,
}

/// Apply an item-level transition (role-gated); may auto-advance the order
pub async fn update_item_status(
    State(state): State<ServerState>,
    ctx: AuthContext,
    Path((id, index)): Path<(String, usize)>,
    Json(req): Json<UpdateItemStatusRequest>,
) -> AppResult<Json<Order>> {
    let order = state
        .engine
        .apply_item_transition(&ctx.actor, &id, index, req.status)?;
    Ok(Json(order))
}

/// Payment status request
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub payment_status: PaymentStatus,
}

/// Waiter cash path - source forced to MANUAL_CASH
pub async fn update_payment(
    State(state): State<ServerState>,
    ctx: AuthContext,
    Path(id): Path<String>,
    Json(req): Json<PaymentRequest>,
) -> AppResult<Json<Order>> {
    let order = state.engine.apply_payment_event(
        &ctx.actor,
        &id,
        req.payment_status,
        PaymentSource::ManualCash,
    )?;
    Ok(Json(order))
}

/// Payment provider adapter entry - source forced to PROVIDER_CALLBACK
///
/// The adapter authenticates upstream and delivers settlement results here;
/// the core never initiates provider calls.
pub async fn payment_callback(
    State(state): State<ServerState>,
    ctx: AuthContext,
    Path(id): Path<String>,
    Json(req): Json<PaymentRequest>,
) -> AppResult<Json<Order>> {
    let order = state.engine.apply_payment_event(
        &ctx.actor,
        &id,
        req.payment_status,
        PaymentSource::ProviderCallback,
    )?;
    Ok(Json(order))
}
