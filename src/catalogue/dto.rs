use serde::{Deserialize, Serialize};

use super::repo_types::{Item, NewItem};

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateItemRequest {
    #[serde(default)]
    pub item: Option<NewItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemResponse {
    pub item: Item,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListItemsResponse {
    pub items: Vec<Item>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetItemRequest {
    #[serde(default)]
    pub id: i32,
}
