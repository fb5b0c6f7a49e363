use async_trait::async_trait;

use super::repo_types::{NewOrder, Order};
use crate::store::StoreResult;

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Fails with `MissingReference` when the user or item does not exist.
    async fn create_order(&self, order: NewOrder) -> StoreResult<Order>;
    async fn list_orders(&self) -> StoreResult<Vec<Order>>;
    async fn get_order(&self, id: i32) -> StoreResult<Order>;
    async fn orders_by_user(&self, user_id: i64) -> StoreResult<Vec<Order>>;
}
