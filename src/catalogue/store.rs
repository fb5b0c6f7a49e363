use async_trait::async_trait;

use super::repo_types::{Item, NewItem};
use crate::store::StoreResult;

#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Fails with `AlreadyExists` when the name is taken.
    async fn create_item(&self, item: NewItem) -> StoreResult<Item>;
    async fn list_items(&self) -> StoreResult<Vec<Item>>;
    async fn get_item(&self, id: i32) -> StoreResult<Item>;
}
