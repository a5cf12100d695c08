//! Self-service password reset with single-use expiring tokens.
//!
//! `request_reset` issues a fresh token and hands the reset link to the
//! email collaborator; `perform_reset` redeems a token exactly once.
//! Unknown, already-used, and expired tokens all report the same
//! `InvalidToken` so a caller cannot probe which check failed.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::errors::{CredVaultError, Result};
use crate::store::{TokenStore, UserStore};

use super::password;
use super::token::PasswordResetToken;

/// Outbound email dispatch, fire-and-forget.
///
/// Failures are the collaborator's concern; they never roll back token
/// creation.
pub trait Mailer: Send + Sync {
    fn send(&self, to: &str, reset_url: &str);
}

/// Issues, validates, and consumes password-reset tokens.
pub struct PasswordResetService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenStore>,
    mailer: Arc<dyn Mailer>,
    token_lifetime: chrono::Duration,
    reset_url_base: String,
}

impl PasswordResetService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenStore>,
        mailer: Arc<dyn Mailer>,
        token_lifetime: chrono::Duration,
        reset_url_base: &str,
    ) -> Self {
        Self {
            users,
            tokens,
            mailer,
            token_lifetime,
            reset_url_base: reset_url_base.to_string(),
        }
    }

    /// Issue a reset token for the account behind `email` and dispatch
    /// the reset link.
    ///
    /// Any previously issued unused tokens for the same user are
    /// invalidated first, so at most one token is live per user.
    pub fn request_reset(&self, email: &str) -> Result<()> {
        let user = self
            .users
            .find_by_email(email)?
            .ok_or(CredVaultError::UserNotFound)?;

        self.tokens.invalidate_for_user(user.id)?;

        let token = PasswordResetToken::new(user.id, self.token_lifetime);
        let reset_url = format!("{}{}", self.reset_url_base, token.token);
        let user_id = token.user_id;
        self.tokens.insert(token)?;

        // Dispatch must not be able to roll back the token write, and a
        // slow mail provider is the collaborator's problem.
        self.mailer.send(&user.email, &reset_url);

        tracing::info!(user_id = %user_id, "password reset token issued");
        Ok(())
    }

    /// Redeem `token` and set `new_password` for its user.
    ///
    /// The used flag flips via compare-and-set in the token store, so two
    /// concurrent redemptions of the same token produce exactly one
    /// success.
    pub fn perform_reset(&self, token: &str, new_password: &str) -> Result<()> {
        if new_password.trim().is_empty() {
            return Err(CredVaultError::InvalidInput(
                "new password must not be blank".to_string(),
            ));
        }

        let stored = self
            .tokens
            .find_by_token(token)?
            .ok_or(CredVaultError::InvalidToken)?;

        if stored.used || stored.is_expired(Utc::now()) {
            return Err(CredVaultError::InvalidToken);
        }

        // Winner-takes-all consumption.
        if !self.tokens.consume(token)? {
            return Err(CredVaultError::InvalidToken);
        }

        let mut user = self
            .users
            .find_by_id(stored.user_id)?
            .ok_or(CredVaultError::UserNotFound)?;
        user.password_hash = password::hash_password(new_password)?;
        user.updated_at = Utc::now();
        if !self.users.update(&user)? {
            return Err(CredVaultError::UserNotFound);
        }

        tracing::info!(user_id = %user.id, "password reset completed");
        Ok(())
    }
}

/// A `Mailer` that drops everything, for deployments without outbound
/// email and for tests that only exercise the token lifecycle.
pub struct NoopMailer;

impl Mailer for NoopMailer {
    fn send(&self, _to: &str, _reset_url: &str) {}
}
