//! Client side of the Authority, as seen by services that delegate
//! authorization to it.
//!
//! Services receive an `Arc<dyn AuthorityClient>` at construction. Every call
//! carries its own timeout; a timed-out or unreachable Authority surfaces as
//! a `Status` so callers fail closed.
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::{
    auth::dto::{GetUserInfoResponse, IsAdminRequest, IsAdminResponse, TokenRequest, UserInfo},
    rpc::{Code, Status},
};

#[async_trait]
pub trait AuthorityClient: Send + Sync {
    /// Resolves a bearer token to the identity it was issued for.
    async fn get_user_info(&self, token: &str) -> Result<UserInfo, Status>;
    async fn is_admin(&self, user_id: i64) -> Result<bool, Status>;
}

#[derive(Clone)]
pub struct HttpAuthorityClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthorityClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build authority http client")?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn call<Req, Resp>(&self, method: &'static str, body: &Req) -> Result<Resp, Status>
    where
        Req: Serialize + ?Sized + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, method);
        let res = self.http.post(&url).json(body).send().await.map_err(|e| {
            if e.is_timeout() {
                warn!(method, "authority call timed out");
                Status::new(Code::DeadlineExceeded, "authority timed out")
            } else {
                warn!(method, error = %e, "authority unreachable");
                Status::new(Code::Unavailable, "authority unavailable")
            }
        })?;

        if !res.status().is_success() {
            let http_status = res.status();
            return Err(res.json::<Status>().await.unwrap_or_else(|_| {
                warn!(method, %http_status, "authority returned undecodable error");
                Status::internal("authority call failed")
            }));
        }

        res.json::<Resp>().await.map_err(|e| {
            if e.is_timeout() {
                Status::new(Code::DeadlineExceeded, "authority timed out")
            } else {
                warn!(method, error = %e, "authority returned undecodable response");
                Status::internal("authority call failed")
            }
        })
    }
}

#[async_trait]
impl AuthorityClient for HttpAuthorityClient {
    async fn get_user_info(&self, token: &str) -> Result<UserInfo, Status> {
        let req = TokenRequest {
            token: token.to_string(),
        };
        let res: GetUserInfoResponse = self.call("auth.UserInfo/GetUserInfo", &req).await?;
        Ok(res.user)
    }

    async fn is_admin(&self, user_id: i64) -> Result<bool, Status> {
        let res: IsAdminResponse = self
            .call("auth.Auth/IsAdmin", &IsAdminRequest { user_id })
            .await?;
        Ok(res.is_admin)
    }
}
