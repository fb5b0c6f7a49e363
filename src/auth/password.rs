//! Credential hashing for the Authority.
//!
//! Every stored hash is an Argon2id v1.3 PHC string with the crate's default
//! cost (19 MiB memory, 2 passes, 1 lane). Verification reads the parameters
//! back from the stored string, so hashes written with older costs still
//! verify.
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

/// Well-formed hash of no real password, with the same cost as stored
/// hashes. Verifying against it makes a login for an unknown email cost as
/// much as one with a wrong password.
pub(crate) const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

fn hasher() -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default())
}

/// Hashes a new credential with a fresh random salt. Only called at
/// registration.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    hasher()
        .hash_password(plain.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| {
            error!(error = %e, "credential hashing failed");
            anyhow::anyhow!("hash credential: {e}")
        })
}

/// `Ok(false)` on mismatch; `Err` only when the stored string is not a PHC
/// hash.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let phc = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "stored credential is not a PHC string");
        anyhow::anyhow!("parse stored credential: {e}")
    })?;
    Ok(hasher().verify_password(plain.as_bytes(), &phc).is_ok())
}

/// Burns one verification against `DUMMY_HASH`. The outcome is always a
/// mismatch.
pub fn verify_against_dummy(plain: &str) {
    let _ = verify_password(plain, DUMMY_HASH);
}
