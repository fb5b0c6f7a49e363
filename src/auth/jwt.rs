use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use super::{
    claims::Claims,
    repo_types::{App, User},
};

/// Decoding failure. Malformed, badly signed and expired tokens all collapse
/// into one kind so callers cannot tell which check failed.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid token")]
    InvalidToken,
    #[error("token signing failed")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Signs a claim set for `user`, scoped to `app`, valid for `ttl`.
pub fn issue(user: &User, app: &App, ttl: Duration) -> Result<String, TokenError> {
    let exp = OffsetDateTime::now_utc() + ttl;
    let claims = Claims {
        uid: user.id,
        email: user.email.clone(),
        app_id: app.id,
        exp: exp.unix_timestamp(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(app.secret.as_bytes()),
    )
    .map_err(TokenError::Signing)?;
    debug!(user_id = user.id, app_id = app.id, "jwt signed");
    Ok(token)
}

/// Verifies signature, structure and expiry, returning the claims.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| TokenError::InvalidToken)?;
    debug!(user_id = data.claims.uid, "jwt verified");
    Ok(data.claims)
}
