//! High-level vault operations.
//!
//! `Vault` wraps the entry store, the encryption engine, and the audit
//! log so callers work with simple method calls like
//! `vault.create("alice", "bank", None, None, "s3cr3t")`.
//!
//! Ownership is checked before anything else: decrypting another
//! principal's secret is never attempted, and delete enforces the same
//! check as get/update.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::audit::{AuditAction, AuditLog};
use crate::crypto::EncryptionEngine;
use crate::errors::{CredVaultError, Result};
use crate::store::EntryStore;

use super::entry::{DecryptedEntry, SecretEntry};

/// The credential vault service.
pub struct Vault {
    entries: Arc<dyn EntryStore>,
    engine: Arc<EncryptionEngine>,
    audit: Arc<dyn AuditLog>,
}

impl Vault {
    pub fn new(
        entries: Arc<dyn EntryStore>,
        engine: Arc<EncryptionEngine>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            entries,
            engine,
            audit,
        }
    }

    /// Create a new entry owned by `owner`, encrypting `secret` before it
    /// is persisted.  Emits a `create` audit record.
    pub fn create(
        &self,
        owner: &str,
        title: &str,
        url: Option<&str>,
        username: Option<&str>,
        secret: &str,
    ) -> Result<SecretEntry> {
        let ciphertext = self.engine.encrypt(secret)?;
        let entry = SecretEntry::new(owner, title, url, username, ciphertext);

        self.entries.insert(entry.clone())?;
        self.audit.record(AuditAction::Create, owner, entry.id)?;

        tracing::debug!(entry_id = %entry.id, owner, "vault entry created");
        Ok(entry)
    }

    /// Fetch one entry with its secret decrypted.
    ///
    /// Fails `EntryNotFound` if no entry exists and `Forbidden` if the
    /// caller is not the owner; the ownership check happens before any
    /// decryption attempt.
    pub fn get(&self, id: Uuid, caller: &str) -> Result<DecryptedEntry> {
        let entry = self
            .entries
            .find_by_id(id)?
            .ok_or(CredVaultError::EntryNotFound)?;

        if entry.owner != caller {
            return Err(CredVaultError::Forbidden);
        }

        let secret = self.engine.decrypt(&entry.ciphertext)?;
        Ok(DecryptedEntry::from_entry(entry, secret))
    }

    /// Return every entry owned by `caller`, each individually decrypted.
    ///
    /// A decryption failure on any entry fails the whole call; entries
    /// are never silently dropped.
    pub fn list_for_owner(&self, caller: &str) -> Result<Vec<DecryptedEntry>> {
        self.entries
            .find_by_owner(caller)?
            .into_iter()
            .map(|entry| {
                let secret = self.engine.decrypt(&entry.ciphertext)?;
                Ok(DecryptedEntry::from_entry(entry, secret))
            })
            .collect()
    }

    /// Replace all mutable fields of an entry atomically, re-encrypting
    /// the secret.  Emits an `update` audit record.
    ///
    /// Title, username, and secret must be non-blank; url may be empty.
    pub fn update(
        &self,
        id: Uuid,
        caller: &str,
        title: &str,
        url: Option<&str>,
        username: &str,
        secret: &str,
    ) -> Result<SecretEntry> {
        let mut entry = self
            .entries
            .find_by_id(id)?
            .ok_or(CredVaultError::EntryNotFound)?;

        if entry.owner != caller {
            return Err(CredVaultError::Forbidden);
        }

        if title.trim().is_empty() || username.trim().is_empty() || secret.trim().is_empty() {
            return Err(CredVaultError::InvalidInput(
                "title, username, and secret are required".to_string(),
            ));
        }

        entry.title = title.to_string();
        entry.url = url.map(str::to_string);
        entry.username = Some(username.to_string());
        entry.ciphertext = self.engine.encrypt(secret)?;
        entry.updated_at = Utc::now();

        // A concurrent delete may have won; report it as not-found.
        if !self.entries.update(&entry)? {
            return Err(CredVaultError::EntryNotFound);
        }
        self.audit.record(AuditAction::Update, caller, id)?;

        tracing::debug!(entry_id = %id, owner = caller, "vault entry updated");
        Ok(entry)
    }

    /// Delete an entry.  Emits a `delete` audit record.
    pub fn delete(&self, id: Uuid, caller: &str) -> Result<()> {
        let entry = self
            .entries
            .find_by_id(id)?
            .ok_or(CredVaultError::EntryNotFound)?;

        if entry.owner != caller {
            return Err(CredVaultError::Forbidden);
        }

        if !self.entries.delete(id)? {
            return Err(CredVaultError::EntryNotFound);
        }
        self.audit.record(AuditAction::Delete, caller, id)?;

        tracing::debug!(entry_id = %id, owner = caller, "vault entry deleted");
        Ok(())
    }
}
