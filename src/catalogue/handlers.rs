use axum::{extract::State, middleware::from_fn_with_state, routing::post, Extension, Json, Router};
use tracing::{info, instrument};

use super::{
    dto::{CreateItemRequest, GetItemRequest, ItemResponse, ListItemsResponse},
    CatalogueState,
};
use crate::{
    auth::dto::UserInfo,
    guard::{guard, Interceptor, MethodGuard, Policy},
    rpc::{JsonBody, Status},
};

pub fn routes(interceptor: Interceptor) -> Router<CatalogueState> {
    Router::new()
        .route("/catalogue.CatalogueService/CreateItem", post(create_item))
        .route_layer(from_fn_with_state(
            MethodGuard::new(interceptor, Policy::AdminOnly),
            guard,
        ))
        .route("/catalogue.CatalogueService/ListItems", post(list_items))
        .route("/catalogue.CatalogueService/GetItem", post(get_item))
}

#[instrument(skip(state, caller, payload), fields(caller = caller.id))]
pub async fn create_item(
    State(state): State<CatalogueState>,
    Extension(caller): Extension<UserInfo>,
    JsonBody(payload): JsonBody<CreateItemRequest>,
) -> Result<Json<ItemResponse>, Status> {
    let mut item = payload
        .item
        .ok_or_else(|| Status::invalid_argument("item is required"))?;
    item.name = item.name.trim().to_string();

    if item.name.is_empty() {
        return Err(Status::invalid_argument("name is required"));
    }
    if item.price < 0 || item.quantity < 0 {
        return Err(Status::invalid_argument("price and quantity must not be negative"));
    }

    let item = state
        .items
        .create_item(item)
        .await
        .map_err(|e| Status::from_store("create_item", e))?;
    info!(item_id = item.id, "item created");
    Ok(Json(ItemResponse { item }))
}

#[instrument(skip(state))]
pub async fn list_items(
    State(state): State<CatalogueState>,
) -> Result<Json<ListItemsResponse>, Status> {
    let items = state
        .items
        .list_items()
        .await
        .map_err(|e| Status::from_store("list_items", e))?;
    Ok(Json(ListItemsResponse { items }))
}

#[instrument(skip(state))]
pub async fn get_item(
    State(state): State<CatalogueState>,
    JsonBody(payload): JsonBody<GetItemRequest>,
) -> Result<Json<ItemResponse>, Status> {
    if payload.id <= 0 {
        return Err(Status::invalid_argument("id is required"));
    }
    let item = state
        .items
        .get_item(payload.id)
        .await
        .map_err(|e| Status::from_store("get_item", e))?;
    Ok(Json(ItemResponse { item }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{
        auth::repo_types::Role,
        catalogue::{memory::MemoryItemStore, router},
        guard::{testing::FakeAuthority, Interceptor},
    };

    fn app() -> axum::Router {
        let fake = FakeAuthority::default()
            .with_user("tok-user", 1, Role::User)
            .with_user("tok-admin", 9, Role::Admin);
        router(
            Arc::new(MemoryItemStore::default()),
            Interceptor::new(Arc::new(fake)),
        )
    }

    async fn call(app: &axum::Router, method: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut req = Request::post(format!("/catalogue.CatalogueService/{method}"))
            .header("content-type", "application/json");
        if let Some(token) = token {
            req = req.header("authorization", token);
        }
        let res = app
            .clone()
            .oneshot(req.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn lamp() -> Value {
        json!({"item": {"name": "lamp", "description": "desk lamp", "price": 1500, "quantity": 3}})
    }

    #[tokio::test]
    async fn only_admins_create_items() {
        let app = app();
        let (status, _) = call(&app, "CreateItem", None, lamp()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = call(&app, "CreateItem", Some("tok-user"), lamp()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "permission_denied");

        let (status, body) = call(&app, "CreateItem", Some("tok-admin"), lamp()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["item"]["id"], 1);
        assert_eq!(body["item"]["image_url"], "");

        let (status, body) = call(&app, "CreateItem", Some("tok-admin"), lamp()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "already_exists");
    }

    #[tokio::test]
    async fn create_item_validates_payload() {
        let app = app();
        let (status, _) = call(&app, "CreateItem", Some("tok-admin"), json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &app,
            "CreateItem",
            Some("tok-admin"),
            json!({"item": {"name": "x", "price": -1}}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn listing_and_lookup_are_open() {
        let app = app();
        call(&app, "CreateItem", Some("tok-admin"), lamp()).await;

        let (status, body) = call(&app, "ListItems", None, json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"].as_array().unwrap().len(), 1);

        let (status, body) = call(&app, "GetItem", None, json!({"id": 1})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["item"]["name"], "lamp");

        let (status, _) = call(&app, "GetItem", None, json!({"id": 42})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&app, "GetItem", None, json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
