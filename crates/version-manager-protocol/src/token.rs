//! Day-scoped auth token.
//!
//! The token is the hex SHA-1 of the shared secret followed by the current
//! UTC date (`YYYY-MM-DD`). The server recomputes it for its own date, so a
//! token is only accepted on the UTC day it was generated.

use chrono::{NaiveDate, Utc};
use sha1::{Digest, Sha1};

/// Compute the token for `secret` on `date`.
pub fn auth_token(secret: &str, date: NaiveDate) -> String {
    let mut hasher = Sha1::new();
    hasher.update(secret.as_bytes());
    hasher.update(date.format("%Y-%m-%d").to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Compute the token for `secret` on today's UTC date.
pub fn auth_token_for_today(secret: &str) -> String {
    auth_token(secret, Utc::now().date_naive())
}
