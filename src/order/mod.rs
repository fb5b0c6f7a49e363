//! Order service. Every write and every cross-user read is guarded by the
//! Authority; a single order lookup by id is open.
use std::sync::Arc;

use axum::Router;

use crate::guard::Interceptor;

pub mod dto;
pub mod handlers;
pub mod memory;
pub mod repo;
pub mod repo_types;
pub mod store;

#[derive(Clone)]
pub struct OrderState {
    pub orders: Arc<dyn store::OrderStore>,
}

pub fn router(orders: Arc<dyn store::OrderStore>, interceptor: Interceptor) -> Router {
    handlers::routes(interceptor).with_state(OrderState { orders })
}
