use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: i32,
    pub quantity: i32,
    pub image_url: String,
}

/// Item as submitted by an admin; the id is assigned on insert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: i32,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub image_url: String,
}

impl NewItem {
    pub fn with_id(self, id: i32) -> Item {
        Item {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            quantity: self.quantity,
            image_url: self.image_url,
        }
    }
}
