//! Orders API Endpoints
//! Mission: Order placement, admin oversight, and delivery fulfilment

use crate::{
    auth::{
        middleware::{auth_middleware, require_role, RequiredRoles},
        models::{AuthContext, Role},
    },
    error::ApiError,
    orders::models::{
        Address, Order, OrderDraft, OrderItem, OrderStatus, PaymentMethod, DEFAULT_SHIPPING,
    },
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

/// Admin-only order oversight.
pub fn admin_router(state: AppState) -> Router {
    Router::new()
        .route("/api/orders", get(list_orders))
        .route("/api/orders/:id", get(get_order))
        .route_layer(middleware::from_fn_with_state(
            RequiredRoles(&[Role::Admin]),
            require_role,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

/// Delivery-agent routes, scoped to the agent's assigned orders.
pub fn delivery_router(state: AppState) -> Router {
    Router::new()
        .route("/api/delivery/orders", get(list_assigned_orders))
        .route("/api/delivery/orders/:id", put(update_delivery_status))
        .route_layer(middleware::from_fn_with_state(
            RequiredRoles(&[Role::DeliveryAgent]),
            require_role,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

/// Customer order placement (cash-on-delivery path; card payments go
/// through the checkout-session flow instead).
pub fn customer_router(state: AppState) -> Router {
    Router::new()
        .route("/api/orders", post(place_order))
        .route_layer(middleware::from_fn_with_state(
            RequiredRoles(&[Role::Customer]),
            require_role,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

/// GET /api/orders
async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(state.orders.list()?))
}

/// GET /api/orders/:id
async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, ApiError> {
    let order = state
        .orders
        .get(&id)?
        .ok_or(ApiError::NotFound("Order not found"))?;
    Ok(Json(order))
}

/// GET /api/delivery/orders
async fn list_assigned_orders(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Value>, ApiError> {
    let orders = state.orders.list_for_agent(&ctx.user_id)?;
    Ok(Json(json!({ "orders": orders })))
}

#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    status: String,
}

/// PUT /api/delivery/orders/:id
async fn update_delivery_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, ApiError> {
    let status =
        OrderStatus::from_str(&payload.status).ok_or(ApiError::Validation("Invalid status"))?;

    let order = state
        .orders
        .update_status_for_agent(&id, &ctx.user_id, status)?
        .ok_or(ApiError::NotFound("Order not found or not assigned to you"))?;
    Ok(Json(order))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlaceOrderRequest {
    items: Vec<OrderItem>,
    address: Option<Address>,
    notes: Option<String>,
}

/// POST /api/orders
async fn place_order(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    if payload.items.is_empty() {
        return Err(ApiError::Validation("Order must contain at least one item"));
    }
    if payload.items.iter().any(|i| i.quantity == 0) {
        return Err(ApiError::Validation("Item quantity must be at least 1"));
    }

    let total: f64 = payload
        .items
        .iter()
        .map(|i| i.price * i.quantity as f64)
        .sum();

    let order = state.orders.create(OrderDraft {
        payment_intent_id: None,
        payment_method: PaymentMethod::CashOnDelivery,
        customer: ctx.user_id,
        items: payload.items,
        total,
        shipping: DEFAULT_SHIPPING,
        address: payload.address,
        delivery_agent: None,
        notes: payload.notes,
    })?;

    Ok((StatusCode::CREATED, Json(order)))
}
