use axum::{extract::State, routing::post, Json, Router};
use tracing::{instrument, warn};

use super::{
    dto::{
        GetUserInfoResponse, IsAdminRequest, IsAdminResponse, IsAuthenticatedResponse,
        LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, TokenRequest,
    },
    services::{is_valid_email, AuthError},
};
use crate::{
    rpc::{JsonBody, Status},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth.Auth/Register", post(register))
        .route("/auth.Auth/Login", post(login))
        .route("/auth.Auth/IsAdmin", post(is_admin))
        .route("/auth.Auth/IsAuthenticated", post(is_authenticated))
}

pub fn user_info_routes() -> Router<AppState> {
    Router::new().route("/auth.UserInfo/GetUserInfo", post(get_user_info))
}

/// Boundary mapping from service errors to RPC status. `op` names the call
/// so internal failures are logged with context.
fn to_status(op: &'static str, e: AuthError) -> Status {
    match e {
        AuthError::InvalidCredentials => Status::invalid_argument("invalid email or password"),
        AuthError::UserExists => Status::already_exists("user already exists"),
        AuthError::UserNotFound => Status::not_found("user not found"),
        AuthError::InvalidToken => Status::unauthenticated("invalid token"),
        AuthError::Internal(e) => Status::internal_from(op, &e),
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(mut payload): JsonBody<RegisterRequest>,
) -> Result<Json<RegisterResponse>, Status> {
    payload.email = payload.email.trim().to_lowercase();

    if payload.email.is_empty() {
        return Err(Status::invalid_argument("email is required"));
    }
    if payload.password.is_empty() {
        return Err(Status::invalid_argument("password is required"));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(Status::invalid_argument("invalid email"));
    }

    let user_id = state
        .auth
        .register_new_user(&payload.email, &payload.password, &payload.username)
        .await
        .map_err(|e| to_status("register", e))?;
    Ok(Json(RegisterResponse { user_id }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(mut payload): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, Status> {
    payload.email = payload.email.trim().to_lowercase();

    if payload.email.is_empty() {
        return Err(Status::invalid_argument("email is required"));
    }
    if payload.password.is_empty() {
        return Err(Status::invalid_argument("password is required"));
    }

    let token = state
        .auth
        .login(&payload.email, &payload.password)
        .await
        .map_err(|e| to_status("login", e))?;
    Ok(Json(LoginResponse { token }))
}

#[instrument(skip(state))]
pub async fn is_admin(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<IsAdminRequest>,
) -> Result<Json<IsAdminResponse>, Status> {
    if payload.user_id == 0 {
        return Err(Status::invalid_argument("user_id is required"));
    }
    let is_admin = state
        .auth
        .is_admin(payload.user_id)
        .await
        .map_err(|e| to_status("is_admin", e))?;
    Ok(Json(IsAdminResponse { is_admin }))
}

#[instrument(skip_all)]
pub async fn is_authenticated(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<TokenRequest>,
) -> Result<Json<IsAuthenticatedResponse>, Status> {
    if payload.token.is_empty() {
        return Err(Status::invalid_argument("token is required"));
    }
    let is_authenticated = state
        .auth
        .is_authenticated(&payload.token)
        .await
        .map_err(|e| to_status("is_authenticated", e))?;
    Ok(Json(IsAuthenticatedResponse { is_authenticated }))
}

#[instrument(skip_all)]
pub async fn get_user_info(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<TokenRequest>,
) -> Result<Json<GetUserInfoResponse>, Status> {
    if payload.token.is_empty() {
        return Err(Status::invalid_argument("token is required"));
    }
    let user = state
        .auth
        .get_user_info(&payload.token)
        .await
        .map_err(|e| to_status("get_user_info", e))?;
    Ok(Json(GetUserInfoResponse { user: user.into() }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use time::Duration;
    use tower::ServiceExt;

    use crate::{
        auth::{
            memory::MemoryCredentialStore,
            repo_types::{App, Role, APP_ID},
        },
        state::AppState,
    };

    fn state() -> (AppState, Arc<MemoryCredentialStore>) {
        let app = App {
            id: APP_ID,
            name: "shop".into(),
            secret: "app-secret".into(),
        };
        let store = Arc::new(MemoryCredentialStore::new(app, Duration::hours(1)));
        (AppState::new(store.clone(), Duration::hours(1)), store)
    }

    async fn call(state: &AppState, path: &str, body: Value) -> (StatusCode, Value) {
        let router = crate::auth::router().with_state(state.clone());
        let req = Request::post(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let res: Response = router.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn empty_arguments_are_rejected_before_business_logic() {
        let (state, store) = state();
        let (status, body) = call(&state, "/auth.Auth/Register", json!({"email": "", "password": "x"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_argument");

        let (status, _) = call(&state, "/auth.Auth/Login", json!({"email": "a@x.io"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&state, "/auth.Auth/IsAdmin", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&state, "/auth.Auth/IsAuthenticated", json!({"token": ""})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&state, "/auth.UserInfo/GetUserInfo", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(store.token_count().await, 0);
    }

    #[tokio::test]
    async fn register_login_and_resolve_identity() {
        let (state, store) = state();
        let (status, body) = call(
            &state,
            "/auth.Auth/Register",
            json!({"email": " Kate@Example.com ", "password": "pw-123456", "username": "kate"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let user_id = body["user_id"].as_i64().unwrap();
        assert!(user_id > 0);

        let (status, body) = call(
            &state,
            "/auth.Auth/Register",
            json!({"email": "kate@example.com", "password": "pw-123456", "username": "kate"}),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "already_exists");

        let (status, body) = call(
            &state,
            "/auth.Auth/Login",
            json!({"email": "kate@example.com", "password": "pw-123456"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap().to_string();

        let (_, body) = call(&state, "/auth.Auth/IsAuthenticated", json!({"token": token})).await;
        assert_eq!(body["is_authenticated"], true);

        let (status, body) = call(&state, "/auth.UserInfo/GetUserInfo", json!({"token": token})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["id"], user_id);
        assert_eq!(body["user"]["role"], "user");
        assert!(body["user"].get("password_hash").is_none());

        store.set_role(user_id, Role::Admin).await.unwrap();
        let (_, body) = call(&state, "/auth.Auth/IsAdmin", json!({"user_id": user_id})).await;
        assert_eq!(body["is_admin"], true);
    }

    #[tokio::test]
    async fn mistyped_body_is_invalid_argument_json() {
        let (state, _) = state();
        let (status, body) = call(&state, "/auth.Auth/Login", json!({"email": 5, "password": "x"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_argument");
    }

    #[tokio::test]
    async fn bad_login_and_bad_token_map_to_stable_codes() {
        let (state, _) = state();
        let (status, body) = call(
            &state,
            "/auth.Auth/Login",
            json!({"email": "ghost@example.com", "password": "nope"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "invalid email or password");

        let (status, body) = call(&state, "/auth.UserInfo/GetUserInfo", json!({"token": "x.y.z"})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "unauthenticated");

        let (status, body) = call(&state, "/auth.Auth/IsAdmin", json!({"user_id": 77})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }
}
