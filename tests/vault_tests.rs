//! Integration tests for the credential vault and its audit trail.

use std::sync::Arc;

use credvault::audit::{AuditAction, AuditLog, MemoryAuditLog};
use credvault::crypto::EncryptionEngine;
use credvault::errors::{CredVaultError, Result};
use credvault::store::{EntryStore, MemoryStore};
use credvault::vault::{SecretEntry, Vault};
use uuid::Uuid;

fn vault() -> (Vault, Arc<MemoryStore>, Arc<MemoryAuditLog>) {
    let store = Arc::new(MemoryStore::new());
    let audit = Arc::new(MemoryAuditLog::new());
    let engine = Arc::new(EncryptionEngine::new("test passphrase"));
    let vault = Vault::new(store.clone(), engine, audit.clone());
    (vault, store, audit)
}

// ---------------------------------------------------------------------------
// Create / get
// ---------------------------------------------------------------------------

#[test]
fn create_encrypts_at_rest_and_audits() {
    let (vault, store, audit) = vault();

    let entry = vault
        .create("alice", "bank", Some("https://bank.example"), None, "s3cr3t")
        .unwrap();

    // The stored ciphertext must not be the plaintext.
    let stored = store.find_by_id(entry.id).unwrap().unwrap();
    assert_ne!(stored.ciphertext, "s3cr3t");
    assert!(!stored.ciphertext.contains("s3cr3t"));

    // The owner reads the plaintext back.
    let read = vault.get(entry.id, "alice").unwrap();
    assert_eq!(read.secret, "s3cr3t");
    assert_eq!(read.title, "bank");

    // Exactly one create record for that id.
    let trail = audit.read_for_entry(entry.id).unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].action, AuditAction::Create);
    assert_eq!(trail[0].principal, "alice");
}

#[test]
fn get_enforces_ownership_before_decryption() {
    let (vault, _, _) = vault();
    let entry = vault.create("alice", "bank", None, None, "pw").unwrap();

    assert!(matches!(
        vault.get(entry.id, "bob"),
        Err(CredVaultError::Forbidden)
    ));
    assert!(vault.get(entry.id, "alice").is_ok());
}

#[test]
fn get_missing_entry_is_not_found() {
    let (vault, _, _) = vault();
    assert!(matches!(
        vault.get(Uuid::new_v4(), "alice"),
        Err(CredVaultError::EntryNotFound)
    ));
}

#[test]
fn list_for_owner_returns_only_owned_entries_decrypted() {
    let (vault, _, _) = vault();
    vault.create("alice", "bank", None, None, "a1").unwrap();
    vault.create("alice", "mail", None, None, "a2").unwrap();
    vault.create("bob", "mail", None, None, "b1").unwrap();

    let mine = vault.list_for_owner("alice").unwrap();
    assert_eq!(mine.len(), 2);
    let secrets: Vec<&str> = mine.iter().map(|e| e.secret.as_str()).collect();
    assert!(secrets.contains(&"a1") && secrets.contains(&"a2"));
}

#[test]
fn list_propagates_decryption_failure_instead_of_dropping_entries() {
    let (vault, store, _) = vault();
    vault.create("alice", "good", None, None, "ok").unwrap();

    // Plant an entry whose blob the engine never produced.
    store
        .insert(SecretEntry::new(
            "alice",
            "bad",
            None,
            None,
            "garbage-blob".to_string(),
        ))
        .unwrap();

    assert!(matches!(
        vault.list_for_owner("alice"),
        Err(CredVaultError::CryptoOperationFailed)
    ));
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[test]
fn update_replaces_fields_and_audits() {
    let (vault, _, audit) = vault();
    let entry = vault.create("alice", "bank", None, None, "old").unwrap();

    vault
        .update(
            entry.id,
            "alice",
            "bank v2",
            Some("https://bank.example"),
            "alice@bank",
            "new",
        )
        .unwrap();

    let read = vault.get(entry.id, "alice").unwrap();
    assert_eq!(read.title, "bank v2");
    assert_eq!(read.username.as_deref(), Some("alice@bank"));
    assert_eq!(read.secret, "new");
    assert!(read.updated_at >= read.created_at);

    let trail = audit.read_for_entry(entry.id).unwrap();
    assert_eq!(trail.len(), 2);
    assert_eq!(trail[1].action, AuditAction::Update);
}

#[test]
fn update_with_blank_username_is_rejected_and_entry_unchanged() {
    let (vault, _, audit) = vault();
    let entry = vault.create("alice", "bank", None, None, "pw").unwrap();

    let result = vault.update(entry.id, "alice", "bank", None, "   ", "pw2");
    assert!(matches!(result, Err(CredVaultError::InvalidInput(_))));

    // Original entry unchanged, no update audit record.
    let read = vault.get(entry.id, "alice").unwrap();
    assert_eq!(read.secret, "pw");
    assert_eq!(read.title, "bank");
    assert_eq!(audit.read_for_entry(entry.id).unwrap().len(), 1);
}

#[test]
fn update_checks_existence_then_ownership() {
    let (vault, _, _) = vault();
    let entry = vault.create("alice", "bank", None, None, "pw").unwrap();

    assert!(matches!(
        vault.update(Uuid::new_v4(), "alice", "t", None, "u", "s"),
        Err(CredVaultError::EntryNotFound)
    ));
    assert!(matches!(
        vault.update(entry.id, "bob", "t", None, "u", "s"),
        Err(CredVaultError::Forbidden)
    ));
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[test]
fn delete_enforces_ownership_and_audits() {
    let (vault, _, audit) = vault();
    let entry = vault.create("alice", "bank", None, None, "pw").unwrap();

    assert!(matches!(
        vault.delete(entry.id, "bob"),
        Err(CredVaultError::Forbidden)
    ));

    vault.delete(entry.id, "alice").unwrap();
    assert!(matches!(
        vault.get(entry.id, "alice"),
        Err(CredVaultError::EntryNotFound)
    ));

    let trail = audit.read_for_entry(entry.id).unwrap();
    assert_eq!(trail.len(), 2);
    assert_eq!(trail[1].action, AuditAction::Delete);
}

#[test]
fn double_delete_reports_not_found() {
    let (vault, _, _) = vault();
    let entry = vault.create("alice", "bank", None, None, "pw").unwrap();

    vault.delete(entry.id, "alice").unwrap();
    assert!(matches!(
        vault.delete(entry.id, "alice"),
        Err(CredVaultError::EntryNotFound)
    ));
}

// ---------------------------------------------------------------------------
// Audit failure semantics
// ---------------------------------------------------------------------------

struct FailingAuditLog;

impl AuditLog for FailingAuditLog {
    fn record(&self, _: AuditAction, _: &str, _: Uuid) -> Result<()> {
        Err(CredVaultError::AuditWriteFailed("sink down".to_string()))
    }

    fn read_all(&self) -> Result<Vec<credvault::audit::AuditRecord>> {
        Ok(Vec::new())
    }

    fn read_for_entry(&self, _: Uuid) -> Result<Vec<credvault::audit::AuditRecord>> {
        Ok(Vec::new())
    }
}

#[test]
fn audit_write_failure_is_surfaced_distinctly() {
    let store = Arc::new(MemoryStore::new());
    let engine = Arc::new(EncryptionEngine::new("k"));
    let vault = Vault::new(store, engine, Arc::new(FailingAuditLog));

    let result = vault.create("alice", "bank", None, None, "pw");
    assert!(matches!(result, Err(CredVaultError::AuditWriteFailed(_))));
}

// ---------------------------------------------------------------------------
// Full audit trail ordering
// ---------------------------------------------------------------------------

#[test]
fn audit_trail_reads_oldest_first() {
    let (vault, _, audit) = vault();
    let entry = vault.create("alice", "bank", None, None, "pw").unwrap();
    vault
        .update(entry.id, "alice", "bank", None, "alice", "pw2")
        .unwrap();
    vault.delete(entry.id, "alice").unwrap();

    let all = audit.read_all().unwrap();
    assert_eq!(
        all.iter().map(|r| r.action).collect::<Vec<_>>(),
        vec![AuditAction::Create, AuditAction::Update, AuditAction::Delete]
    );
    assert!(all.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}
