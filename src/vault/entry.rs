//! SecretEntry types stored in the credential vault.
//!
//! `SecretEntry` is the persisted shape: its `ciphertext` field is only
//! ever produced by the `EncryptionEngine`, so no code path can write a
//! raw secret to durable storage.  `DecryptedEntry` is the read-side
//! view handed back to the owning caller; it never travels to a store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single encrypted credential entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretEntry {
    /// Entry identifier, assigned at creation.
    pub id: Uuid,

    /// Opaque principal identifier of the owner.  Immutable after
    /// creation.
    pub owner: String,

    /// Display title (e.g. "bank").
    pub title: String,

    /// Optional site URL.
    pub url: Option<String>,

    /// Optional secondary username for the stored credential.
    pub username: Option<String>,

    /// base64(nonce || ciphertext), produced by the `EncryptionEngine`.
    pub ciphertext: String,

    /// When this entry was first created.
    pub created_at: DateTime<Utc>,

    /// When this entry was last updated.
    pub updated_at: DateTime<Utc>,
}

impl SecretEntry {
    /// Build a fresh entry around an already-encrypted secret.
    pub fn new(
        owner: &str,
        title: &str,
        url: Option<&str>,
        username: Option<&str>,
        ciphertext: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            title: title.to_string(),
            url: url.map(str::to_string),
            username: username.map(str::to_string),
            ciphertext,
            created_at: now,
            updated_at: now,
        }
    }
}

/// An entry with its secret decrypted, as returned by `Vault::get` and
/// `Vault::list_for_owner`.
#[derive(Debug, Clone)]
pub struct DecryptedEntry {
    pub id: Uuid,
    pub owner: String,
    pub title: String,
    pub url: Option<String>,
    pub username: Option<String>,
    pub secret: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DecryptedEntry {
    /// Pair a stored entry with its decrypted secret.
    pub fn from_entry(entry: SecretEntry, secret: String) -> Self {
        Self {
            id: entry.id,
            owner: entry.owner,
            title: entry.title,
            url: entry.url,
            username: entry.username,
            secret,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}
