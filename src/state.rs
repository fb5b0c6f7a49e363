use std::sync::Arc;

use sqlx::PgPool;
use time::Duration;

use crate::{
    auth::{repo::PgCredentialStore, services::AuthService, store::CredentialStore},
    config::AuthorityConfig,
};

/// Shared state of the Authority process.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub store: Arc<dyn CredentialStore>,
}

impl AppState {
    pub fn with_pool(db: PgPool, config: &AuthorityConfig) -> Self {
        let store = Arc::new(PgCredentialStore::new(
            db,
            Duration::minutes(config.token.store_window_minutes),
        ));
        Self::new(store, Duration::minutes(config.token.ttl_minutes))
    }

    pub fn new(store: Arc<dyn CredentialStore>, token_ttl: Duration) -> Self {
        Self {
            auth: AuthService::new(store.clone(), token_ttl),
            store,
        }
    }
}
