//! Credential handling for the journal: password hashing and opaque
//! session-token generation. Session storage itself lives in the database
//! crate; cookie handling lives in the web server.

use rand::{Rng, distributions::Alphanumeric};

pub mod error;

pub use error::{Error, Result};

/// Length of a session token. Alphanumeric, so ~6 bits of entropy per char.
const SESSION_TOKEN_LEN: usize = 48;

/// Name of the session cookie the web layer reads and writes.
pub const SESSION_COOKIE: &str = "sid";

/// Hashes a plaintext password with bcrypt at the default cost.
pub fn hash_password(password: &str) -> Result<String> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

/// Checks a plaintext password against a stored bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    Ok(bcrypt::verify(password, hash)?)
}

/// Generates an opaque session token for the `sid` cookie.
pub fn generate_session_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_TOKEN_LEN)
        .map(char::from)
        .collect()
}
