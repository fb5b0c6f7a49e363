use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::catalogue::repo_types::Item;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewOrder {
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub item_id: i32,
}

/// An order together with the item it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i32,
    pub user_id: i64,
    pub item_id: i32,
    pub item: Item,
}

/// Flat row of `orders` joined with `items`.
#[derive(Debug, FromRow)]
pub struct OrderRow {
    pub id: i32,
    pub user_id: i64,
    pub item_id: i32,
    pub name: String,
    pub description: String,
    pub price: i32,
    pub quantity: i32,
    pub image_url: String,
}

impl From<OrderRow> for Order {
    fn from(r: OrderRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            item_id: r.item_id,
            item: Item {
                id: r.item_id,
                name: r.name,
                description: r.description,
                price: r.price,
                quantity: r.quantity,
                image_url: r.image_url,
            },
        }
    }
}
