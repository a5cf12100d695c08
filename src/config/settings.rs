use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::crypto::EncryptionEngine;
use crate::errors::{CredVaultError, Result};

/// Deployment configuration, loaded from `credvault.toml`.
///
/// Every field except `encryption.secret_key` has a sensible default, so
/// a minimal config file only needs the key-derivation passphrase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub encryption: EncryptionSettings,

    #[serde(default)]
    pub security: SecuritySettings,

    #[serde(default)]
    pub reset: ResetSettings,

    #[serde(default)]
    pub frontend: FrontendSettings,
}

/// `[encryption]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncryptionSettings {
    /// Operator passphrase used as key-derivation input for the
    /// `EncryptionEngine`.  Required; there is no safe default.
    #[serde(default)]
    pub secret_key: String,
}

/// `[security]` section — login-attempt lockout tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecuritySettings {
    /// Consecutive failures before a principal is locked out.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// How long a locked-out principal stays blocked.
    #[serde(default = "default_lockout_minutes")]
    pub lockout_minutes: u64,
}

/// `[reset]` section — password-reset token tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetSettings {
    /// Lifetime of an issued reset token, in hours.
    #[serde(default = "default_token_lifetime_hours")]
    pub token_lifetime_hours: i64,
}

/// `[frontend]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendSettings {
    /// Base URL the reset token is appended to when building the link
    /// that gets emailed to the user.
    #[serde(default = "default_reset_url_base")]
    pub reset_url_base: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_max_attempts() -> u32 {
    5
}

fn default_lockout_minutes() -> u64 {
    15
}

fn default_token_lifetime_hours() -> i64 {
    24
}

fn default_reset_url_base() -> String {
    "http://localhost:3000/reset-password?token=".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            lockout_minutes: default_lockout_minutes(),
        }
    }
}

impl Default for ResetSettings {
    fn default() -> Self {
        Self {
            token_lifetime_hours: default_token_lifetime_hours(),
        }
    }
}

impl Default for FrontendSettings {
    fn default() -> Self {
        Self {
            reset_url_base: default_reset_url_base(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            encryption: EncryptionSettings::default(),
            security: SecuritySettings::default(),
            reset: ResetSettings::default(),
            frontend: FrontendSettings::default(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for.
    const FILE_NAME: &'static str = "credvault.toml";

    /// Load settings from `<dir>/credvault.toml`.
    ///
    /// If the file does not exist, defaults are returned.  If the file
    /// exists but cannot be parsed, an error is returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            CredVaultError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Build the encryption engine from the configured passphrase.
    ///
    /// Fails if `encryption.secret_key` is empty; a vault silently running
    /// with an empty passphrase is a misconfiguration, not a default.
    pub fn encryption_engine(&self) -> Result<EncryptionEngine> {
        if self.encryption.secret_key.is_empty() {
            return Err(CredVaultError::Config(
                "encryption.secret_key must be set".to_string(),
            ));
        }
        Ok(EncryptionEngine::new(&self.encryption.secret_key))
    }

    /// Lockout window as a `Duration`.
    pub fn lockout_window(&self) -> Duration {
        Duration::from_secs(self.security.lockout_minutes * 60)
    }

    /// Reset-token lifetime as a `chrono::Duration`.
    pub fn token_lifetime(&self) -> chrono::Duration {
        chrono::Duration::hours(self.reset.token_lifetime_hours)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
