use axum::http::{header::AUTHORIZATION, HeaderMap};

/// Reads the bearer token from call metadata.
///
/// The `authorization` value may carry the raw token or a `Bearer ` prefixed
/// one. Absent, non-UTF-8 and empty values all count as no token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok())?;
    let token = raw
        .strip_prefix("Bearer ")
        .or_else(|| raw.strip_prefix("bearer "))
        .unwrap_or(raw)
        .trim();
    (!token.is_empty()).then_some(token)
}
