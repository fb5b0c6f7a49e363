//! Catalogue service: item listing for everyone, item creation for admins.
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
pub struct CatalogueState {
    pub items: Arc<dyn store::ItemStore>,
}

pub fn router(items: Arc<dyn store::ItemStore>, interceptor: Interceptor) -> Router {
    handlers::routes(interceptor).with_state(CatalogueState { items })
}
