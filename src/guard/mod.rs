//! Authorization interceptor for privileged downstream methods.
//!
//! Identity and role are never evaluated locally: every guarded call resolves
//! its bearer token and, where the policy needs it, the admin role through the
//! Authority. Any failed step denies the call before the handler runs.
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::{
    auth::dto::UserInfo,
    client::AuthorityClient,
    rpc::{Code, Status},
};

pub mod layer;

pub use layer::{guard, MethodGuard};

/// Reads the subject user id out of a JSON request body.
pub type SubjectFn = fn(&[u8]) -> Option<i64>;

/// Method-specific rule applied after the caller's identity is resolved.
#[derive(Clone, Copy)]
pub enum Policy {
    AdminOnly,
    /// Allowed for the subject itself, otherwise only for admins.
    OwnerOrAdmin(SubjectFn),
    /// Allowed only when the caller is the subject of the request.
    SelfOnly(SubjectFn),
}

impl Policy {
    pub fn subject_fn(&self) -> Option<SubjectFn> {
        match self {
            Policy::AdminOnly => None,
            Policy::OwnerOrAdmin(f) | Policy::SelfOnly(f) => Some(*f),
        }
    }
}

impl std::fmt::Debug for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Policy::AdminOnly => "AdminOnly",
            Policy::OwnerOrAdmin(_) => "OwnerOrAdmin",
            Policy::SelfOnly(_) => "SelfOnly",
        })
    }
}

#[derive(Clone)]
pub struct Interceptor {
    authority: Arc<dyn AuthorityClient>,
}

impl Interceptor {
    pub fn new(authority: Arc<dyn AuthorityClient>) -> Self {
        Self { authority }
    }

    /// Decides a guarded call. `subject` must be present for the policies that
    /// compare against it.
    #[instrument(skip(self, token))]
    pub async fn authorize(
        &self,
        token: Option<&str>,
        policy: Policy,
        subject: Option<i64>,
    ) -> Result<UserInfo, Status> {
        let token = token.ok_or_else(|| Status::unauthenticated("missing authorization token"))?;

        let user = self
            .authority
            .get_user_info(token)
            .await
            .map_err(identity_failure)?;

        match policy {
            Policy::AdminOnly => self.require_admin(user.id).await?,
            Policy::OwnerOrAdmin(_) => {
                let subject = subject.ok_or_else(|| Status::invalid_argument("user_id is required"))?;
                if subject != user.id {
                    self.require_admin(user.id).await?;
                }
            }
            Policy::SelfOnly(_) => {
                let subject = subject.ok_or_else(|| Status::invalid_argument("user_id is required"))?;
                if subject != user.id {
                    warn!(caller = user.id, subject, "request attributed to another user");
                    return Err(Status::permission_denied(
                        "cannot act on behalf of another user",
                    ));
                }
            }
        }

        debug!(user_id = user.id, "authorized");
        Ok(user)
    }

    async fn require_admin(&self, user_id: i64) -> Result<(), Status> {
        match self.authority.is_admin(user_id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(Status::permission_denied("admin role required")),
            Err(e) => {
                warn!(user_id, code = ?e.code, "admin check failed");
                Err(Status::permission_denied("admin role required"))
            }
        }
    }
}

fn identity_failure(e: Status) -> Status {
    match e.code {
        Code::Unauthenticated | Code::PermissionDenied | Code::InvalidArgument => {
            Status::unauthenticated("invalid token")
        }
        Code::NotFound => Status::permission_denied("unknown user"),
        Code::DeadlineExceeded | Code::Unavailable => e,
        _ => {
            warn!(code = ?e.code, message = %e.message, "identity lookup failed");
            Status::internal("identity lookup failed")
        }
    }
}

/// Subject reader for bodies shaped `{"user_id": ..}`. Zero counts as absent.
pub fn user_id_field(body: &[u8]) -> Option<i64> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.get("user_id")?.as_i64().filter(|id| *id != 0)
}

/// Subject reader for bodies shaped `{"order": {"user_id": ..}}`.
pub fn order_user_id(body: &[u8]) -> Option<i64> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.get("order")?.get("user_id")?.as_i64().filter(|id| *id != 0)
}
