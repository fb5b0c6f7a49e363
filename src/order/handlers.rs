use axum::{extract::State, middleware::from_fn_with_state, routing::post, Extension, Json, Router};
use tracing::{info, instrument};

use super::{
    dto::{CreateOrderRequest, GetOrderRequest, OrderResponse, OrdersByUserRequest, OrdersResponse},
    OrderState,
};
use crate::{
    auth::dto::UserInfo,
    guard::{guard, order_user_id, user_id_field, Interceptor, MethodGuard, Policy},
    rpc::{JsonBody, Status},
};

pub fn routes(interceptor: Interceptor) -> Router<OrderState> {
    let self_only = MethodGuard::new(interceptor.clone(), Policy::SelfOnly(order_user_id));
    let admin_only = MethodGuard::new(interceptor.clone(), Policy::AdminOnly);
    let owner_or_admin = MethodGuard::new(interceptor, Policy::OwnerOrAdmin(user_id_field));

    // route_layer only wraps routes already added, so each policy gets its
    // own router.
    let create = Router::new()
        .route("/order.OrderService/CreateOrder", post(create_order))
        .route_layer(from_fn_with_state(self_only, guard));
    let list_all = Router::new()
        .route("/order.OrderService/ListOrders", post(list_orders))
        .route_layer(from_fn_with_state(admin_only, guard));
    let by_user = Router::new()
        .route("/order.OrderService/GetOrderByUserId", post(get_orders_by_user_id))
        .route_layer(from_fn_with_state(owner_or_admin, guard));

    Router::new()
        .route("/order.OrderService/GetOrder", post(get_order))
        .merge(create)
        .merge(list_all)
        .merge(by_user)
}

#[instrument(skip(state, caller, payload), fields(caller = caller.id))]
pub async fn create_order(
    State(state): State<OrderState>,
    Extension(caller): Extension<UserInfo>,
    JsonBody(payload): JsonBody<CreateOrderRequest>,
) -> Result<Json<OrderResponse>, Status> {
    let order = payload
        .order
        .ok_or_else(|| Status::invalid_argument("order is required"))?;
    if order.item_id <= 0 {
        return Err(Status::invalid_argument("item_id is required"));
    }

    let order = state
        .orders
        .create_order(order)
        .await
        .map_err(|e| Status::from_store("create_order", e))?;
    info!(order_id = order.id, "order created");
    Ok(Json(OrderResponse { order }))
}

#[instrument(skip(state))]
pub async fn list_orders(State(state): State<OrderState>) -> Result<Json<OrdersResponse>, Status> {
    let orders = state
        .orders
        .list_orders()
        .await
        .map_err(|e| Status::from_store("list_orders", e))?;
    Ok(Json(OrdersResponse { orders }))
}

#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<OrderState>,
    JsonBody(payload): JsonBody<GetOrderRequest>,
) -> Result<Json<OrderResponse>, Status> {
    if payload.id <= 0 {
        return Err(Status::invalid_argument("id is required"));
    }
    let order = state
        .orders
        .get_order(payload.id)
        .await
        .map_err(|e| Status::from_store("get_order", e))?;
    Ok(Json(OrderResponse { order }))
}

#[instrument(skip(state))]
pub async fn get_orders_by_user_id(
    State(state): State<OrderState>,
    JsonBody(payload): JsonBody<OrdersByUserRequest>,
) -> Result<Json<OrdersResponse>, Status> {
    if payload.user_id == 0 {
        return Err(Status::invalid_argument("user_id is required"));
    }
    let orders = state
        .orders
        .orders_by_user(payload.user_id)
        .await
        .map_err(|e| Status::from_store("get_orders_by_user_id", e))?;
    Ok(Json(OrdersResponse { orders }))
}
