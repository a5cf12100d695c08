//! Append-only audit log of credential mutations.
//!
//! Every successful vault create/update/delete appends one record.
//! Records are never updated or deleted, and a failed audit write fails
//! the surrounding operation: a mutation whose trail did not persist is
//! reported to the caller as `AuditWriteFailed`, never silently dropped.

pub mod sqlite;

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::{CredVaultError, Result};

pub use sqlite::SqliteAuditLog;

/// What kind of mutation a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(AuditAction::Create),
            "update" => Some(AuditAction::Update),
            "delete" => Some(AuditAction::Delete),
            _ => None,
        }
    }
}

/// A single audit record.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub id: i64,
    pub action: AuditAction,
    pub principal: String,
    pub entry_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

/// An append-only audit sink.
///
/// Reads are ordered by timestamp ascending.
pub trait AuditLog: Send + Sync {
    fn record(&self, action: AuditAction, principal: &str, entry_id: Uuid) -> Result<()>;

    fn read_all(&self) -> Result<Vec<AuditRecord>>;

    fn read_for_entry(&self, entry_id: Uuid) -> Result<Vec<AuditRecord>>;
}

/// In-process audit sink for embedding and tests.
#[derive(Default)]
pub struct MemoryAuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditLog for MemoryAuditLog {
    fn record(&self, action: AuditAction, principal: &str, entry_id: Uuid) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| CredVaultError::AuditWriteFailed("audit lock poisoned".to_string()))?;
        let id = records.len() as i64 + 1;
        records.push(AuditRecord {
            id,
            action,
            principal: principal.to_string(),
            entry_id,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<AuditRecord>> {
        let records = self
            .records
            .lock()
            .map_err(|_| CredVaultError::Storage("audit lock poisoned".to_string()))?;
        Ok(records.clone())
    }

    fn read_for_entry(&self, entry_id: Uuid) -> Result<Vec<AuditRecord>> {
        let records = self
            .records
            .lock()
            .map_err(|_| CredVaultError::Storage("audit lock poisoned".to_string()))?;
        Ok(records
            .iter()
            .filter(|r| r.entry_id == entry_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_are_appended_in_order() {
        let log = MemoryAuditLog::new();
        let entry = Uuid::new_v4();

        log.record(AuditAction::Create, "alice", entry).unwrap();
        log.record(AuditAction::Update, "alice", entry).unwrap();
        log.record(AuditAction::Delete, "alice", entry).unwrap();

        let all = log.read_all().unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].action, AuditAction::Create);
        assert_eq!(all[1].action, AuditAction::Update);
        assert_eq!(all[2].action, AuditAction::Delete);
        assert!(all.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn read_for_entry_filters_by_id() {
        let log = MemoryAuditLog::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        log.record(AuditAction::Create, "alice", a).unwrap();
        log.record(AuditAction::Create, "bob", b).unwrap();

        let only_a = log.read_for_entry(a).unwrap();
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].principal, "alice");
    }

    #[test]
    fn action_strings_roundtrip() {
        for action in [AuditAction::Create, AuditAction::Update, AuditAction::Delete] {
            assert_eq!(AuditAction::parse(action.as_str()), Some(action));
        }
        assert_eq!(AuditAction::parse("rotate"), None);
    }
}
