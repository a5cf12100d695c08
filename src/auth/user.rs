//! User account record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A vault user.
///
/// `totp_enabled == true` implies `totp_secret` is present and has been
/// validated by at least one successful code check; provisioning a new
/// secret always clears the flag until verification succeeds again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,

    /// Principal identifier used as the owner key for vault entries and
    /// the login-attempt limiter.
    pub username: String,

    pub email: String,

    /// Argon2id PHC-format hash.  Never the raw password.
    pub password_hash: String,

    /// base32-encoded TOTP seed, present once MFA has been provisioned.
    pub totp_secret: Option<String>,

    pub totp_enabled: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh user around an already-hashed password.
    pub fn new(username: &str, email: &str, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            totp_secret: None,
            totp_enabled: false,
            created_at: now,
            updated_at: now,
        }
    }
}
