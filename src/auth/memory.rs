//! In-memory credential store.
//!
//! Mirrors the Postgres store's semantics (unique emails, join on the owning
//! user, strict expiry comparison) without a database, for tests and local
//! runs. State is lost on restart.
use std::collections::HashMap;

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;

use super::{
    repo_types::{App, Role, TokenRecord, User, APP_ID},
    store::{hash_token, CredentialStore},
};
use crate::store::{StoreError, StoreResult};

#[derive(Default)]
struct Inner {
    next_user_id: i64,
    users: HashMap<i64, User>,
    tokens: HashMap<Vec<u8>, TokenRecord>,
}

pub struct MemoryCredentialStore {
    app: Option<App>,
    token_window: Duration,
    inner: RwLock<Inner>,
}

impl MemoryCredentialStore {
    pub fn new(app: App, token_window: Duration) -> Self {
        Self {
            app: Some(app),
            token_window,
            inner: RwLock::new(Inner::default()),
        }
    }

    /// A store with no application record, so every login fails after the
    /// password check.
    pub fn without_app(token_window: Duration) -> Self {
        Self {
            app: None,
            token_window,
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Administrative role change; not reachable over RPC.
    pub async fn set_role(&self, user_id: i64, role: Role) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or(StoreError::NotFound("user"))?;
        user.role = role;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) async fn delete_user(&self, user_id: i64) {
        self.inner.write().await.users.remove(&user_id);
    }

    /// Inserts a record with an explicit expiry, bypassing the store window.
    #[cfg(test)]
    pub(crate) async fn insert_token_record(&self, token: &str, user_id: i64, expiry: OffsetDateTime) {
        let hash = hash_token(token);
        let record = TokenRecord {
            hash: hash.clone(),
            user_id,
            expiry,
        };
        self.inner.write().await.tokens.insert(hash, record);
    }

    #[cfg(test)]
    pub(crate) async fn has_token_record(&self, token: &str) -> bool {
        self.inner
            .read()
            .await
            .tokens
            .contains_key(&hash_token(token))
    }

    #[cfg(test)]
    pub(crate) async fn token_count(&self) -> usize {
        self.inner.read().await.tokens.len()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn save_user(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> StoreResult<i64> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == email) {
            return Err(StoreError::AlreadyExists("user"));
        }
        inner.next_user_id += 1;
        let id = inner.next_user_id;
        inner.users.insert(
            id,
            User {
                id,
                username: username.to_string(),
                email: email.to_string(),
                role: Role::User,
                activated: false,
                password_hash: password_hash.to_string(),
            },
        );
        Ok(id)
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<User> {
        self.inner
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound("user"))
    }

    async fn get_user(&self, id: i64) -> StoreResult<User> {
        self.inner
            .read()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("user"))
    }

    async fn is_admin(&self, user_id: i64) -> StoreResult<bool> {
        let user = self.get_user(user_id).await?;
        Ok(user.role == Role::Admin)
    }

    async fn app(&self) -> StoreResult<App> {
        self.app
            .clone()
            .filter(|app| app.id == APP_ID)
            .ok_or(StoreError::NotFound("app"))
    }

    async fn save_token(&self, token: &str, user_id: i64) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&user_id) {
            return Err(StoreError::MissingReference("user"));
        }
        let hash = hash_token(token);
        let record = TokenRecord {
            hash: hash.clone(),
            user_id,
            expiry: OffsetDateTime::now_utc() + self.token_window,
        };
        inner.tokens.insert(hash, record);
        Ok(())
    }

    async fn is_authenticated(&self, token: &str) -> StoreResult<bool> {
        let now = OffsetDateTime::now_utc();
        let inner = self.inner.read().await;
        let found = inner
            .tokens
            .get(&hash_token(token))
            .filter(|record| record.expiry > now)
            .is_some_and(|record| inner.users.contains_key(&record.user_id));
        Ok(found)
    }

    async fn delete_expired_tokens(&self, now: OffsetDateTime) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.tokens.len();
        inner.tokens.retain(|_, record| record.expiry > now);
        Ok((before - inner.tokens.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(window: Duration) -> MemoryCredentialStore {
        let app = App {
            id: APP_ID,
            name: "shop".into(),
            secret: "app-secret".into(),
        };
        MemoryCredentialStore::new(app, window)
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = store(Duration::hours(1));
        let first = store.save_user("a@x.io", "a", "h").await.unwrap();
        assert!(first > 0);
        let err = store.save_user("a@x.io", "b", "h").await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists("user")));
    }

    #[tokio::test]
    async fn is_admin_checks_role_and_existence() {
        let store = store(Duration::hours(1));
        let id = store.save_user("a@x.io", "a", "h").await.unwrap();
        assert!(!store.is_admin(id).await.unwrap());
        store.set_role(id, Role::Admin).await.unwrap();
        assert!(store.is_admin(id).await.unwrap());
        assert!(matches!(
            store.is_admin(999).await.unwrap_err(),
            StoreError::NotFound("user")
        ));
    }

    #[tokio::test]
    async fn saved_token_is_authenticated_within_window() {
        let store = store(Duration::hours(1));
        let id = store.save_user("a@x.io", "a", "h").await.unwrap();
        store.save_token("tok", id).await.unwrap();
        assert!(store.is_authenticated("tok").await.unwrap());
        assert!(!store.is_authenticated("other").await.unwrap());
    }

    #[tokio::test]
    async fn zero_window_token_is_never_authenticated() {
        let store = store(Duration::ZERO);
        let id = store.save_user("a@x.io", "a", "h").await.unwrap();
        store.save_token("tok", id).await.unwrap();
        assert!(!store.is_authenticated("tok").await.unwrap());
    }

    #[tokio::test]
    async fn token_of_deleted_user_is_not_authenticated() {
        let store = store(Duration::hours(1));
        let id = store.save_user("a@x.io", "a", "h").await.unwrap();
        store.save_token("tok", id).await.unwrap();
        store.delete_user(id).await;
        assert!(!store.is_authenticated("tok").await.unwrap());
    }

    #[tokio::test]
    async fn token_for_unknown_user_is_refused() {
        let store = store(Duration::hours(1));
        let err = store.save_token("tok", 5).await.unwrap_err();
        assert!(matches!(err, StoreError::MissingReference("user")));
    }

    #[tokio::test]
    async fn missing_app_is_not_found() {
        let store = MemoryCredentialStore::without_app(Duration::hours(1));
        assert!(matches!(
            store.app().await.unwrap_err(),
            StoreError::NotFound("app")
        ));
    }
}
