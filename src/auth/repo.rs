use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::{Duration, OffsetDateTime};

use super::{
    repo_types::{App, Role, User, APP_ID},
    store::{hash_token, CredentialStore},
};
use crate::store::{classify, StoreError, StoreResult};

/// Postgres-backed credential store.
#[derive(Clone)]
pub struct PgCredentialStore {
    db: PgPool,
    token_window: Duration,
}

impl PgCredentialStore {
    pub fn new(db: PgPool, token_window: Duration) -> Self {
        Self { db, token_window }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn save_user(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> StoreResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (username, email, password_hash, user_role, activated)
            VALUES ($1, $2, $3, $4, FALSE)
            RETURNING id
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(Role::User.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(|e| classify(e, "user", "insert user"))?;
        Ok(id)
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, user_role, activated
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("select user by email")?
        .ok_or(StoreError::NotFound("user"))
    }

    async fn get_user(&self, id: i64) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, user_role, activated
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("select user by id")?
        .ok_or(StoreError::NotFound("user"))
    }

    async fn is_admin(&self, user_id: i64) -> StoreResult<bool> {
        let role = sqlx::query_scalar::<_, String>(r#"SELECT user_role FROM users WHERE id = $1"#)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .context("select user role")?
            .ok_or(StoreError::NotFound("user"))?;
        Ok(role == Role::Admin.as_str())
    }

    async fn app(&self) -> StoreResult<App> {
        sqlx::query_as::<_, App>(r#"SELECT id, name, secret FROM apps WHERE id = $1"#)
            .bind(APP_ID)
            .fetch_optional(&self.db)
            .await
            .context("select app")?
            .ok_or(StoreError::NotFound("app"))
    }

    async fn save_token(&self, token: &str, user_id: i64) -> StoreResult<()> {
        let expiry = OffsetDateTime::now_utc() + self.token_window;
        // Identical claims signed within the same second produce the same
        // token; the later login just extends the record.
        sqlx::query(
            r#"
            INSERT INTO tokens (hash, user_id, expiry)
            VALUES ($1, $2, $3)
            ON CONFLICT (hash) DO UPDATE SET expiry = EXCLUDED.expiry
            "#,
        )
        .bind(hash_token(token))
        .bind(user_id)
        .bind(expiry)
        .execute(&self.db)
        .await
        .map_err(|e| classify(e, "user", "insert token"))?;
        Ok(())
    }

    async fn is_authenticated(&self, token: &str) -> StoreResult<bool> {
        let found = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM tokens t
                INNER JOIN users u ON u.id = t.user_id
                WHERE t.hash = $1
                  AND t.expiry > $2
            )
            "#,
        )
        .bind(hash_token(token))
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&self.db)
        .await
        .context("select token")?;
        Ok(found)
    }

    async fn delete_expired_tokens(&self, now: OffsetDateTime) -> StoreResult<u64> {
        let done = sqlx::query(r#"DELETE FROM tokens WHERE expiry <= $1"#)
            .bind(now)
            .execute(&self.db)
            .await
            .context("delete expired tokens")?;
        Ok(done.rows_affected())
    }
}
