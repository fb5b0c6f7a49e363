use async_trait::async_trait;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

use super::repo_types::{App, User};
use crate::store::StoreResult;

/// Owner of user and token records. The only component touching the
/// authorization tables.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fails with `AlreadyExists("user")` when the email is taken.
    async fn save_user(&self, email: &str, username: &str, password_hash: &str)
        -> StoreResult<i64>;
    async fn get_user_by_email(&self, email: &str) -> StoreResult<User>;
    async fn get_user(&self, id: i64) -> StoreResult<User>;
    async fn is_admin(&self, user_id: i64) -> StoreResult<bool>;
    /// The single application record.
    async fn app(&self) -> StoreResult<App>;
    /// Persists the digest of `token` for the store's fixed window.
    async fn save_token(&self, token: &str, user_id: i64) -> StoreResult<()>;
    /// True iff an unexpired record for `token` exists and its user still
    /// exists. The token's signature is not checked here.
    async fn is_authenticated(&self, token: &str) -> StoreResult<bool>;
    /// Removes every record whose expiry is at or before `now`.
    async fn delete_expired_tokens(&self, now: OffsetDateTime) -> StoreResult<u64>;
}

/// SHA-256 digest of a plaintext token, as stored.
pub fn hash_token(token: &str) -> Vec<u8> {
    Sha256::digest(token.as_bytes()).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_and_distinct() {
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_ne!(hash_token("abc"), hash_token("abd"));
        assert_eq!(hash_token("abc").len(), 32);
    }
}
