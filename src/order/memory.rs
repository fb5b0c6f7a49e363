use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    repo_types::{NewOrder, Order},
    store::OrderStore,
};
use crate::{
    catalogue::store::ItemStore,
    store::{StoreError, StoreResult},
};

/// In-memory orders resolving items through a catalogue store. Only the
/// listed user ids are accepted as owners, like the users foreign key.
pub struct MemoryOrderStore {
    items: Arc<dyn ItemStore>,
    users: HashSet<i64>,
    orders: RwLock<Vec<Order>>,
}

impl MemoryOrderStore {
    pub fn new(items: Arc<dyn ItemStore>, users: impl IntoIterator<Item = i64>) -> Self {
        Self {
            items,
            users: users.into_iter().collect(),
            orders: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create_order(&self, order: NewOrder) -> StoreResult<Order> {
        if !self.users.contains(&order.user_id) {
            return Err(StoreError::MissingReference("item or user"));
        }
        let item = match self.items.get_item(order.item_id).await {
            Ok(item) => item,
            Err(StoreError::NotFound(_)) => return Err(StoreError::MissingReference("item or user")),
            Err(e) => return Err(e),
        };

        let mut orders = self.orders.write().await;
        let order = Order {
            id: orders.len() as i32 + 1,
            user_id: order.user_id,
            item_id: item.id,
            item,
        };
        orders.push(order.clone());
        Ok(order)
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        Ok(self.orders.read().await.clone())
    }

    async fn get_order(&self, id: i32) -> StoreResult<Order> {
        self.orders
            .read()
            .await
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or(StoreError::NotFound("order"))
    }

    async fn orders_by_user(&self, user_id: i64) -> StoreResult<Vec<Order>> {
        Ok(self
            .orders
            .read()
            .await
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }
}
