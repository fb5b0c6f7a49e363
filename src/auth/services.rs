use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use time::Duration;
use tracing::{error, info, instrument, warn};

use super::{
    jwt::{self, TokenError},
    password::{hash_password, verify_against_dummy, verify_password},
    repo_types::User,
    store::CredentialStore,
};
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown email or wrong password; the two are deliberately the same.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user already exists")]
    UserExists,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid token")]
    InvalidToken,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::AlreadyExists("user") => AuthError::UserExists,
            StoreError::NotFound("user") => AuthError::UserNotFound,
            StoreError::Unexpected(e) => AuthError::Internal(e),
            other => AuthError::Internal(anyhow::Error::new(other)),
        }
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Issues, persists and resolves identity tokens on top of a credential store.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, token_ttl: Duration) -> Self {
        Self { store, token_ttl }
    }

    #[instrument(skip(self, password))]
    pub async fn register_new_user(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<i64, AuthError> {
        let hash = hash_password(password)?;
        let id = self
            .store
            .save_user(email, username, &hash)
            .await
            .map_err(|e| {
                if matches!(e, StoreError::AlreadyExists(_)) {
                    warn!(email, "email already registered");
                    AuthError::UserExists
                } else {
                    error!(error = %e, "save user failed");
                    e.into()
                }
            })?;
        info!(user_id = id, email, "user registered");
        Ok(id)
    }

    /// Returns a freshly signed token; the token is only returned once its
    /// digest is persisted.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let user = match self.store.get_user_by_email(email).await {
            Ok(u) => u,
            Err(StoreError::NotFound(_)) => {
                // Same hashing cost as a wrong password for a known email.
                verify_against_dummy(password);
                warn!(email, "login unknown email");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                error!(error = %e, "get user by email failed");
                return Err(e.into());
            }
        };

        if !verify_password(password, &user.password_hash)? {
            warn!(user_id = user.id, "login invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        let app = self.store.app().await.map_err(|e| {
            error!(error = %e, "load app failed");
            AuthError::Internal(anyhow::Error::new(e).context("load app"))
        })?;

        let token = jwt::issue(&user, &app, self.token_ttl).map_err(|e| {
            error!(error = %e, "jwt sign failed");
            AuthError::Internal(anyhow::Error::new(e))
        })?;

        self.store.save_token(&token, user.id).await.map_err(|e| {
            error!(error = %e, user_id = user.id, "token not saved");
            AuthError::Internal(anyhow::Error::new(e).context("save token"))
        })?;

        info!(user_id = user.id, "user logged in");
        Ok(token)
    }

    #[instrument(skip(self))]
    pub async fn is_admin(&self, user_id: i64) -> Result<bool, AuthError> {
        let is_admin = self.store.is_admin(user_id).await?;
        info!(is_admin, "checked admin role");
        Ok(is_admin)
    }

    /// Persisted-record lookup only; the token is not decoded.
    #[instrument(skip_all)]
    pub async fn is_authenticated(&self, token: &str) -> Result<bool, AuthError> {
        let ok = self.store.is_authenticated(token).await?;
        info!(is_authenticated = ok, "checked authentication");
        Ok(ok)
    }

    /// Resolves a token to its user. The signature must verify and the
    /// persisted record must still be live.
    #[instrument(skip_all)]
    pub async fn get_user_info(&self, token: &str) -> Result<User, AuthError> {
        let app = self.store.app().await.map_err(|e| {
            AuthError::Internal(anyhow::Error::new(e).context("load app"))
        })?;

        let claims = jwt::decode_token(token, &app.secret).map_err(|e| match e {
            TokenError::InvalidToken => AuthError::InvalidToken,
            other => AuthError::Internal(anyhow::Error::new(other)),
        })?;

        if !self.store.is_authenticated(token).await? {
            warn!(user_id = claims.uid, "token signature valid but record missing or expired");
            return Err(AuthError::InvalidToken);
        }

        let user = self.store.get_user(claims.uid).await?;
        info!(user_id = user.id, "resolved user from token");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        memory::MemoryCredentialStore,
        repo_types::{App, Role, APP_ID},
    };

    fn app() -> App {
        App {
            id: APP_ID,
            name: "shop".into(),
            secret: "app-secret".into(),
        }
    }

    fn service_with(window: Duration, ttl: Duration) -> (AuthService, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::new(app(), window));
        (AuthService::new(store.clone(), ttl), store)
    }

    fn service() -> (AuthService, Arc<MemoryCredentialStore>) {
        service_with(Duration::hours(1), Duration::hours(1))
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@b.io"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("no at sign"));
    }

    #[tokio::test]
    async fn register_twice_with_same_email_fails() {
        let (svc, _) = service();
        let id = svc.register_new_user("a@x.io", "pw-123456", "a").await.unwrap();
        assert!(id > 0);
        let err = svc
            .register_new_user("a@x.io", "other-pw", "b")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserExists));
    }

    #[tokio::test]
    async fn register_never_stores_plaintext() {
        let (svc, store) = service();
        svc.register_new_user("a@x.io", "pw-123456", "a").await.unwrap();
        let user = store.get_user_by_email("a@x.io").await.unwrap();
        assert_ne!(user.password_hash, "pw-123456");
        assert!(user.password_hash.starts_with("$argon2"));
        assert_eq!(user.role, Role::User);
        assert!(!user.activated);
    }

    #[tokio::test]
    async fn login_returns_token_that_authenticates() {
        let (svc, _) = service();
        svc.register_new_user("a@x.io", "pw-123456", "a").await.unwrap();
        let token = svc.login("a@x.io", "pw-123456").await.unwrap();
        assert!(svc.is_authenticated(&token).await.unwrap());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let (svc, _) = service();
        svc.register_new_user("a@x.io", "pw-123456", "a").await.unwrap();

        for _ in 0..2 {
            let err = svc.login("a@x.io", "wrong").await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials));
        }
        let err = svc.login("nobody@x.io", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(err.to_string(), "invalid credentials");
    }

    #[tokio::test]
    async fn login_without_app_record_is_internal() {
        let store = Arc::new(MemoryCredentialStore::without_app(Duration::hours(1)));
        let svc = AuthService::new(store, Duration::hours(1));
        svc.register_new_user("a@x.io", "pw-123456", "a").await.unwrap();
        let err = svc.login("a@x.io", "pw-123456").await.unwrap_err();
        assert!(matches!(err, AuthError::Internal(_)));
    }

    #[tokio::test]
    async fn zero_window_tokens_are_rejected_large_ones_accepted() {
        let (short, _) = service_with(Duration::ZERO, Duration::ZERO);
        short.register_new_user("a@x.io", "pw-123456", "a").await.unwrap();
        let token = short.login("a@x.io", "pw-123456").await.unwrap();
        assert!(!short.is_authenticated(&token).await.unwrap());

        let (long, _) = service_with(Duration::days(7), Duration::days(7));
        long.register_new_user("a@x.io", "pw-123456", "a").await.unwrap();
        let token = long.login("a@x.io", "pw-123456").await.unwrap();
        assert!(long.is_authenticated(&token).await.unwrap());
    }

    #[tokio::test]
    async fn is_admin_delegates_to_store() {
        let (svc, store) = service();
        let id = svc.register_new_user("a@x.io", "pw-123456", "a").await.unwrap();
        assert!(!svc.is_admin(id).await.unwrap());
        store.set_role(id, Role::Admin).await.unwrap();
        assert!(svc.is_admin(id).await.unwrap());
        assert!(matches!(
            svc.is_admin(404).await.unwrap_err(),
            AuthError::UserNotFound
        ));
    }

    #[tokio::test]
    async fn get_user_info_resolves_logged_in_user() {
        let (svc, _) = service();
        let id = svc.register_new_user("a@x.io", "pw-123456", "alice").await.unwrap();
        let token = svc.login("a@x.io", "pw-123456").await.unwrap();

        let user = svc.get_user_info(&token).await.unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "a@x.io");
    }

    #[tokio::test]
    async fn get_user_info_rejects_garbage_and_foreign_tokens() {
        let (svc, _) = service();
        assert!(matches!(
            svc.get_user_info("garbage").await.unwrap_err(),
            AuthError::InvalidToken
        ));

        let user = User {
            id: 1,
            username: "x".into(),
            email: "x@x.io".into(),
            role: Role::Admin,
            activated: true,
            password_hash: String::new(),
        };
        let forged_app = App {
            secret: "not-the-secret".into(),
            ..app()
        };
        let forged = jwt::issue(&user, &forged_app, Duration::hours(1)).unwrap();
        assert!(matches!(
            svc.get_user_info(&forged).await.unwrap_err(),
            AuthError::InvalidToken
        ));
    }

    #[tokio::test]
    async fn get_user_info_requires_persisted_record() {
        let (svc, store) = service();
        svc.register_new_user("a@x.io", "pw-123456", "a").await.unwrap();
        let user = store.get_user_by_email("a@x.io").await.unwrap();
        // Correctly signed but never persisted.
        let token = jwt::issue(&user, &app(), Duration::hours(1)).unwrap();
        assert!(matches!(
            svc.get_user_info(&token).await.unwrap_err(),
            AuthError::InvalidToken
        ));
    }

    #[tokio::test]
    async fn get_user_info_for_deleted_user_is_not_a_crash() {
        let (svc, store) = service();
        let id = svc.register_new_user("a@x.io", "pw-123456", "a").await.unwrap();
        let token = svc.login("a@x.io", "pw-123456").await.unwrap();
        store.delete_user(id).await;
        // The join no longer matches, so the token is no longer live.
        assert!(matches!(
            svc.get_user_info(&token).await.unwrap_err(),
            AuthError::InvalidToken
        ));
    }
}
