use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    /// Lifetime written into the signed claim.
    pub ttl_minutes: i64,
    /// Lifetime of the persisted record; independent of `ttl_minutes`.
    pub store_window_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorityConfig {
    pub database_url: String,
    pub token: TokenConfig,
    pub sweep_interval_minutes: u64,
    pub listen: SocketAddr,
}

impl AuthorityConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL")?;
        let token = TokenConfig {
            ttl_minutes: env_or("TOKEN_TTL_MINUTES", 60),
            store_window_minutes: env_or("TOKEN_STORE_WINDOW_MINUTES", 60),
        };
        Ok(Self {
            database_url,
            token,
            sweep_interval_minutes: env_or("SWEEP_INTERVAL_MINUTES", 20),
            listen: listen_addr(8080)?,
        })
    }

    /// Never zero; `tokio::time::interval` panics on a zero period.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_minutes.max(1) * 60)
    }
}

/// Configuration of a service that delegates authorization to the Authority.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub database_url: String,
    pub authority_url: String,
    pub authority_timeout_ms: u64,
    pub listen: SocketAddr,
}

impl ServiceConfig {
    pub fn from_env(default_port: u16) -> anyhow::Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL")?,
            authority_url: std::env::var("AUTHORITY_URL").context("AUTHORITY_URL")?,
            authority_timeout_ms: env_or("AUTHORITY_TIMEOUT_MS", 2000),
            listen: listen_addr(default_port)?,
        })
    }

    pub fn authority_timeout(&self) -> Duration {
        Duration::from_millis(self.authority_timeout_ms)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn listen_addr(default_port: u16) -> anyhow::Result<SocketAddr> {
    let addr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| default_port.to_string())
    );
    addr.parse().with_context(|| format!("invalid listen address {addr}"))
}
