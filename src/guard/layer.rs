use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::{Interceptor, Policy};
use crate::rpc::{bearer_token, Status};

/// Largest body buffered while looking for the subject id.
const MAX_GUARDED_BODY: usize = 64 * 1024;

/// Per-route state of the guard middleware.
#[derive(Clone)]
pub struct MethodGuard {
    interceptor: Interceptor,
    policy: Policy,
}

impl MethodGuard {
    pub fn new(interceptor: Interceptor, policy: Policy) -> Self {
        Self {
            interceptor,
            policy,
        }
    }
}

/// Middleware for `axum::middleware::from_fn_with_state`. Runs the wrapped
/// handler only when the interceptor allows the call, with the resolved
/// `UserInfo` in the request extensions.
pub async fn guard(
    State(method): State<MethodGuard>,
    req: Request,
    next: Next,
) -> Result<Response, Status> {
    let token = bearer_token(req.headers())
        .map(str::to_owned)
        .ok_or_else(|| Status::unauthenticated("missing authorization token"))?;

    let (mut req, subject) = match method.policy.subject_fn() {
        None => (req, None),
        Some(read_subject) => {
            let (parts, body) = req.into_parts();
            let bytes = to_bytes(body, MAX_GUARDED_BODY)
                .await
                .map_err(|_| Status::invalid_argument("request body too large"))?;
            let subject = read_subject(&bytes);
            (Request::from_parts(parts, Body::from(bytes)), subject)
        }
    };

    let user = method
        .interceptor
        .authorize(Some(&token), method.policy, subject)
        .await?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
