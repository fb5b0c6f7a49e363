use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use super::{
    repo_types::{Item, NewItem},
    store::ItemStore,
};
use crate::store::{classify, StoreError, StoreResult};

#[derive(Clone)]
pub struct PgItemStore {
    db: PgPool,
}

impl PgItemStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    async fn create_item(&self, item: NewItem) -> StoreResult<Item> {
        sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (name, description, price, quantity, image_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, price, quantity, image_url
            "#,
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(item.quantity)
        .bind(&item.image_url)
        .fetch_one(&self.db)
        .await
        .map_err(|e| classify(e, "item", "insert item"))
    }

    async fn list_items(&self) -> StoreResult<Vec<Item>> {
        let rows = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, price, quantity, image_url
            FROM items
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("select items")?;
        Ok(rows)
    }

    async fn get_item(&self, id: i32) -> StoreResult<Item> {
        sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, price, quantity, image_url
            FROM items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("select item")?
        .ok_or(StoreError::NotFound("item"))
    }
}
