//! Background cleanup of expired token records.
//!
//! Authentication checks already compare expiry, so a late sweep never lets an
//! expired token through; the sweeper only bounds table growth.
use std::{sync::Arc, time::Duration};

use time::OffsetDateTime;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, error, info};

use super::store::CredentialStore;
use crate::store::StoreResult;

/// One cycle: drop every record that has expired as of now.
pub async fn sweep_once(store: &dyn CredentialStore) -> StoreResult<u64> {
    store.delete_expired_tokens(OffsetDateTime::now_utc()).await
}

/// Sweeps immediately, then every `every`, forever. A failed cycle is logged
/// and the loop waits for the next tick.
pub async fn run(store: Arc<dyn CredentialStore>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        match sweep_once(store.as_ref()).await {
            Ok(0) => debug!("token sweep: nothing expired"),
            Ok(removed) => info!(removed, "token sweep removed expired tokens"),
            Err(e) => error!(error = %e, "token sweep failed; retrying next interval"),
        }
    }
}

pub fn spawn(store: Arc<dyn CredentialStore>, every: Duration) -> JoinHandle<()> {
    info!(interval_secs = every.as_secs(), "starting token sweeper");
    tokio::spawn(run(store, every))
}
