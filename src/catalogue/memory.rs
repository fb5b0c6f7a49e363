use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    repo_types::{Item, NewItem},
    store::ItemStore,
};
use crate::store::{StoreError, StoreResult};

/// In-memory catalogue with the same unique-name rule as the items table.
#[derive(Default)]
pub struct MemoryItemStore {
    items: RwLock<BTreeMap<i32, Item>>,
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn create_item(&self, item: NewItem) -> StoreResult<Item> {
        let mut items = self.items.write().await;
        if items.values().any(|i| i.name == item.name) {
            return Err(StoreError::AlreadyExists("item"));
        }
        let id = items.keys().next_back().copied().unwrap_or(0) + 1;
        let item = item.with_id(id);
        items.insert(id, item.clone());
        Ok(item)
    }

    async fn list_items(&self) -> StoreResult<Vec<Item>> {
        Ok(self.items.read().await.values().cloned().collect())
    }

    async fn get_item(&self, id: i32) -> StoreResult<Item> {
        self.items
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("item"))
    }
}
