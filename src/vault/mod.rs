//! Credential vault — ownership-scoped encrypted secret storage.
//!
//! This module provides:
//! - `SecretEntry` and `DecryptedEntry` types (`entry`)
//! - The high-level `Vault` service owning create/read/update/delete
//!   (`service`)
//!
//! Every write path routes through the `EncryptionEngine`, so the
//! durable store never sees plaintext, and every mutation appends an
//! audit record.

pub mod entry;
pub mod service;

pub use entry::{DecryptedEntry, SecretEntry};
pub use service::Vault;
