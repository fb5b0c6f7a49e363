use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use super::{
    repo_types::{NewOrder, Order, OrderRow},
    store::OrderStore,
};
use crate::store::{classify, StoreError, StoreResult};

#[derive(Clone)]
pub struct PgOrderStore {
    db: PgPool,
}

impl PgOrderStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create_order(&self, order: NewOrder) -> StoreResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            WITH inserted AS (
                INSERT INTO orders (user_id, item_id)
                VALUES ($1, $2)
                RETURNING id, user_id, item_id
            )
            SELECT o.id, o.user_id, o.item_id,
                   i.name, i.description, i.price, i.quantity, i.image_url
            FROM inserted o
            INNER JOIN items i ON i.id = o.item_id
            "#,
        )
        .bind(order.user_id)
        .bind(order.item_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| classify(e, "item or user", "insert order"))?;
        Ok(row.into())
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT o.id, o.user_id, o.item_id,
                   i.name, i.description, i.price, i.quantity, i.image_url
            FROM orders o
            INNER JOIN items i ON i.id = o.item_id
            ORDER BY o.id
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("select orders")?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    async fn get_order(&self, id: i32) -> StoreResult<Order> {
        sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT o.id, o.user_id, o.item_id,
                   i.name, i.description, i.price, i.quantity, i.image_url
            FROM orders o
            INNER JOIN items i ON i.id = o.item_id
            WHERE o.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("select order")?
        .map(Order::from)
        .ok_or(StoreError::NotFound("order"))
    }

    async fn orders_by_user(&self, user_id: i64) -> StoreResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT o.id, o.user_id, o.item_id,
                   i.name, i.description, i.price, i.quantity, i.image_url
            FROM orders o
            INNER JOIN items i ON i.id = o.item_id
            WHERE o.user_id = $1
            ORDER BY o.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("select orders by user")?;
        Ok(rows.into_iter().map(Order::from).collect())
    }
}
