//! SQLite-backed audit sink.
//!
//! Stores records in `<dir>/audit.db`.  Unlike a best-effort activity
//! log, open and write failures here are surfaced to the caller: the
//! vault treats a mutation without a persisted trail as a failed
//! operation.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::errors::{CredVaultError, Result};

use super::{AuditAction, AuditLog, AuditRecord};

/// Durable audit sink over a local SQLite database.
pub struct SqliteAuditLog {
    conn: Mutex<Connection>,
}

impl SqliteAuditLog {
    /// Open (or create) the audit database at `<dir>/audit.db`.
    pub fn open(dir: &Path) -> Result<Self> {
        let db_path = Self::db_path(dir);
        let conn = Connection::open(&db_path)
            .map_err(|e| CredVaultError::Storage(format!("audit db open: {e}")))?;

        // Restrictive permissions on the audit database (owner-only).
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&db_path, perms);
        }

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS audit_log (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                action    TEXT NOT NULL,
                principal TEXT NOT NULL,
                entry_id  TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );",
        )
        .map_err(|e| CredVaultError::Storage(format!("audit schema: {e}")))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Path to the audit database (for display/testing).
    pub fn db_path(dir: &Path) -> PathBuf {
        dir.join("audit.db")
    }

    fn map_rows(stmt: &mut rusqlite::Statement<'_>, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<AuditRecord>> {
        let rows = stmt
            .query_map(params, |row| {
                let action_str: String = row.get(1)?;
                let entry_str: String = row.get(3)?;
                let ts_str: String = row.get(4)?;
                Ok((row.get::<_, i64>(0)?, action_str, row.get::<_, String>(2)?, entry_str, ts_str))
            })
            .map_err(|e| CredVaultError::Storage(format!("audit query: {e}")))?;

        let mut records = Vec::new();
        for row in rows {
            let (id, action_str, principal, entry_str, ts_str) =
                row.map_err(|e| CredVaultError::Storage(format!("audit row: {e}")))?;

            let action = AuditAction::parse(&action_str).ok_or_else(|| {
                CredVaultError::Storage(format!("unknown audit action '{action_str}'"))
            })?;
            let entry_id = Uuid::parse_str(&entry_str)
                .map_err(|e| CredVaultError::Storage(format!("audit entry id: {e}")))?;
            let timestamp = DateTime::parse_from_rfc3339(&ts_str)
                .map_err(|e| CredVaultError::Storage(format!("audit timestamp: {e}")))?
                .with_timezone(&Utc);

            records.push(AuditRecord {
                id,
                action,
                principal,
                entry_id,
                timestamp,
            });
        }

        Ok(records)
    }
}

impl AuditLog for SqliteAuditLog {
    fn record(&self, action: AuditAction, principal: &str, entry_id: Uuid) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| CredVaultError::AuditWriteFailed("audit lock poisoned".to_string()))?;

        conn.execute(
            "INSERT INTO audit_log (action, principal, entry_id, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                action.as_str(),
                principal,
                entry_id.to_string(),
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| CredVaultError::AuditWriteFailed(e.to_string()))?;

        Ok(())
    }

    fn read_all(&self) -> Result<Vec<AuditRecord>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| CredVaultError::Storage("audit lock poisoned".to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT id, action, principal, entry_id, timestamp
                 FROM audit_log
                 ORDER BY id ASC",
            )
            .map_err(|e| CredVaultError::Storage(format!("audit prepare: {e}")))?;

        Self::map_rows(&mut stmt, &[])
    }

    fn read_for_entry(&self, entry_id: Uuid) -> Result<Vec<AuditRecord>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| CredVaultError::Storage("audit lock poisoned".to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT id, action, principal, entry_id, timestamp
                 FROM audit_log
                 WHERE entry_id = ?1
                 ORDER BY id ASC",
            )
            .map_err(|e| CredVaultError::Storage(format!("audit prepare: {e}")))?;

        let entry_str = entry_id.to_string();
        Self::map_rows(&mut stmt, &[&entry_str])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_creates_database() {
        let dir = TempDir::new().unwrap();
        SqliteAuditLog::open(dir.path()).unwrap();
        assert!(dir.path().join("audit.db").exists());
    }

    #[test]
    fn open_errors_on_bad_path() {
        let result = SqliteAuditLog::open(Path::new("/nonexistent/path/that/does/not/exist"));
        assert!(result.is_err(), "open failure must be surfaced, not swallowed");
    }

    #[test]
    fn record_and_read_roundtrip() {
        let dir = TempDir::new().unwrap();
        let log = SqliteAuditLog::open(dir.path()).unwrap();
        let entry = Uuid::new_v4();

        log.record(AuditAction::Create, "alice", entry).unwrap();
        log.record(AuditAction::Update, "alice", entry).unwrap();

        let all = log.read_all().unwrap();
        assert_eq!(all.len(), 2);
        // Oldest first.
        assert_eq!(all[0].action, AuditAction::Create);
        assert_eq!(all[1].action, AuditAction::Update);
        assert_eq!(all[0].principal, "alice");
        assert_eq!(all[0].entry_id, entry);
    }

    #[test]
    fn read_for_entry_filters() {
        let dir = TempDir::new().unwrap();
        let log = SqliteAuditLog::open(dir.path()).unwrap();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        log.record(AuditAction::Create, "alice", a).unwrap();
        log.record(AuditAction::Delete, "bob", b).unwrap();

        let only_b = log.read_for_entry(b).unwrap();
        assert_eq!(only_b.len(), 1);
        assert_eq!(only_b[0].action, AuditAction::Delete);
    }

    #[cfg(unix)]
    #[test]
    fn audit_db_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let _log = SqliteAuditLog::open(dir.path()).unwrap();

        let perms = std::fs::metadata(dir.path().join("audit.db"))
            .unwrap()
            .permissions();
        assert_eq!(perms.mode() & 0o777, 0o600);
    }
}
