//! Single-use password-reset tokens.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of random bytes behind a reset token (256 bits).
const TOKEN_LEN: usize = 32;

/// A password-reset token tied to one user and one expiry instant.
///
/// `used` transitions false -> true exactly once and is permanent;
/// consumed and expired tokens are kept around rather than deleted so
/// replayed redemptions stay detectable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordResetToken {
    /// The unguessable token string embedded in the reset link.
    pub token: String,

    pub user_id: Uuid,

    /// Instant after which the token is never honored.
    pub expiry: DateTime<Utc>,

    pub used: bool,
}

impl PasswordResetToken {
    /// Issue a fresh token for `user_id`, valid for `lifetime`.
    pub fn new(user_id: Uuid, lifetime: chrono::Duration) -> Self {
        Self {
            token: generate_token(),
            user_id,
            expiry: Utc::now() + lifetime,
            used: false,
        }
    }

    /// Whether the token has expired as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiry
    }
}

/// Generate a cryptographically random URL-safe token string.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_LEN];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
