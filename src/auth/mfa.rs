//! TOTP multi-factor authentication.
//!
//! RFC 6238 with the interoperable defaults: SHA-1, 6 digits, 30-second
//! time step, and a tolerance of one step either side.  The seed is
//! stored base32-encoded on the user record.
//!
//! State machine: Unprovisioned -> Provisioned(pending) -> Enabled.
//! `disable` keeps the secret so a later successful `verify` plus
//! `confirm_enable` re-enables without re-provisioning; callers wanting
//! stronger hygiene can simply provision a fresh secret, which always
//! clears the enabled flag.

use std::sync::Arc;

use totp_rs::{Algorithm, Secret, TOTP};
use uuid::Uuid;

use crate::errors::{CredVaultError, Result};
use crate::store::UserStore;

const TOTP_DIGITS: usize = 6;
const TOTP_STEP: u64 = 30;
const TOTP_SKEW: u8 = 1;

/// Seed material returned from `provision`, for QR-code presentation.
#[derive(Debug, Clone)]
pub struct ProvisionedSecret {
    /// base32-encoded seed, for manual entry.
    pub secret_base32: String,
    /// otpauth:// provisioning URL, for QR rendering.
    pub otpauth_url: String,
}

/// TOTP provisioning and verification over the user store.
pub struct MfaService {
    users: Arc<dyn UserStore>,
    issuer: String,
}

impl MfaService {
    pub fn new(users: Arc<dyn UserStore>, issuer: &str) -> Self {
        Self {
            users,
            issuer: issuer.to_string(),
        }
    }

    fn totp(&self, secret_base32: &str, account: &str) -> Result<TOTP> {
        let seed = Secret::Encoded(secret_base32.to_string())
            .to_bytes()
            .map_err(|_| CredVaultError::CryptoOperationFailed)?;
        TOTP::new(
            Algorithm::SHA1,
            TOTP_DIGITS,
            TOTP_SKEW,
            TOTP_STEP,
            seed,
            Some(self.issuer.clone()),
            account.to_string(),
        )
        .map_err(|_| CredVaultError::CryptoOperationFailed)
    }

    /// Generate a fresh random seed and store it as the user's pending
    /// secret.
    ///
    /// The enabled flag is always cleared here: a new secret has not been
    /// validated by any code check yet.
    pub fn provision(&self, user_id: Uuid) -> Result<ProvisionedSecret> {
        let mut user = self
            .users
            .find_by_id(user_id)?
            .ok_or(CredVaultError::UserNotFound)?;

        let seed = Secret::generate_secret()
            .to_bytes()
            .map_err(|_| CredVaultError::CryptoOperationFailed)?;
        let totp = TOTP::new(
            Algorithm::SHA1,
            TOTP_DIGITS,
            TOTP_SKEW,
            TOTP_STEP,
            seed,
            Some(self.issuer.clone()),
            user.email.clone(),
        )
        .map_err(|_| CredVaultError::CryptoOperationFailed)?;

        user.totp_secret = Some(totp.get_secret_base32());
        user.totp_enabled = false;
        user.updated_at = chrono::Utc::now();
        if !self.users.update(&user)? {
            return Err(CredVaultError::UserNotFound);
        }

        tracing::info!(user_id = %user_id, "TOTP secret provisioned");
        Ok(ProvisionedSecret {
            secret_base32: totp.get_secret_base32(),
            otpauth_url: totp.get_url(),
        })
    }

    /// Check a submitted code against the stored secret within the
    /// standard time-step tolerance window.
    ///
    /// A wrong code (or an unprovisioned user) is `Ok(false)`, not an
    /// error.
    pub fn verify(&self, user_id: Uuid, code: &str) -> Result<bool> {
        let user = self
            .users
            .find_by_id(user_id)?
            .ok_or(CredVaultError::UserNotFound)?;

        let Some(secret) = user.totp_secret.as_deref() else {
            return Ok(false);
        };

        let totp = self.totp(secret, &user.email)?;
        totp.check_current(code)
            .map_err(|_| CredVaultError::CryptoOperationFailed)
    }

    /// Mark MFA enabled.  Call only after a successful `verify`.
    pub fn confirm_enable(&self, user_id: Uuid) -> Result<()> {
        let mut user = self
            .users
            .find_by_id(user_id)?
            .ok_or(CredVaultError::UserNotFound)?;

        if user.totp_secret.is_none() {
            return Err(CredVaultError::InvalidInput(
                "no TOTP secret has been provisioned".to_string(),
            ));
        }

        user.totp_enabled = true;
        user.updated_at = chrono::Utc::now();
        if !self.users.update(&user)? {
            return Err(CredVaultError::UserNotFound);
        }

        tracing::info!(user_id = %user_id, "MFA enabled");
        Ok(())
    }

    /// Turn MFA off, retaining the secret for later re-enablement.
    pub fn disable(&self, user_id: Uuid) -> Result<()> {
        let mut user = self
            .users
            .find_by_id(user_id)?
            .ok_or(CredVaultError::UserNotFound)?;

        user.totp_enabled = false;
        user.updated_at = chrono::Utc::now();
        if !self.users.update(&user)? {
            return Err(CredVaultError::UserNotFound);
        }

        tracing::info!(user_id = %user_id, "MFA disabled");
        Ok(())
    }
}
