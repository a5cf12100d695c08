//! Authentication entry point.
//!
//! Composes the pieces in order: lockout gate, password check, then the
//! optional TOTP challenge.  Every failure mode past the gate reports
//! the merged `InvalidCredentials`, so a caller learns nothing about
//! whether the email exists or which factor failed.

use std::sync::Arc;

use uuid::Uuid;

use crate::errors::{CredVaultError, Result};
use crate::store::UserStore;

use super::limiter::LoginAttemptLimiter;
use super::mfa::MfaService;
use super::password;

/// Result of a successful trip through the login flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials (and MFA, when enabled) checked out.
    Authenticated { user_id: Uuid },
    /// Password checked out but the account requires a TOTP code and
    /// none was supplied.
    MfaRequired,
}

/// Password + optional-TOTP authentication, gated by the lockout.
pub struct Authenticator {
    users: Arc<dyn UserStore>,
    limiter: Arc<LoginAttemptLimiter>,
    mfa: Arc<MfaService>,
}

impl Authenticator {
    pub fn new(
        users: Arc<dyn UserStore>,
        limiter: Arc<LoginAttemptLimiter>,
        mfa: Arc<MfaService>,
    ) -> Self {
        Self {
            users,
            limiter,
            mfa,
        }
    }

    /// Attempt to authenticate `email` with `password` and, when MFA is
    /// enabled on the account, `totp_code`.
    ///
    /// Failed password or TOTP checks count toward the lockout; a
    /// missing-but-required TOTP code does not (the password was right).
    pub fn login(
        &self,
        email: &str,
        password_attempt: &str,
        totp_code: Option<&str>,
    ) -> Result<LoginOutcome> {
        if self.limiter.is_blocked(email) {
            return Err(CredVaultError::TooManyAttempts);
        }

        let Some(user) = self.users.find_by_email(email)? else {
            // Unknown accounts burn an attempt too, so probing for valid
            // emails is throttled the same as password guessing.
            self.limiter.record_failure(email);
            return Err(CredVaultError::InvalidCredentials);
        };

        if !password::verify_password(password_attempt, &user.password_hash) {
            self.limiter.record_failure(email);
            return Err(CredVaultError::InvalidCredentials);
        }

        if user.totp_enabled {
            let Some(code) = totp_code else {
                return Ok(LoginOutcome::MfaRequired);
            };
            if !self.mfa.verify(user.id, code)? {
                self.limiter.record_failure(email);
                return Err(CredVaultError::InvalidCredentials);
            }
        }

        self.limiter.record_success(email);
        tracing::debug!(user_id = %user.id, "login succeeded");
        Ok(LoginOutcome::Authenticated { user_id: user.id })
    }
}
