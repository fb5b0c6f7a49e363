use serde::{Deserialize, Serialize};

use super::repo_types::{NewOrder, Order};

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub order: Option<NewOrder>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub order: Order,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrdersResponse {
    pub orders: Vec<Order>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetOrderRequest {
    #[serde(default)]
    pub id: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrdersByUserRequest {
    #[serde(default)]
    pub user_id: i64,
}
