//! Cryptographic primitives for CredVault.
//!
//! This module provides:
//! - The `EncryptionEngine` used to envelope-encrypt stored secrets
//!   (`engine`)
//!
//! The engine derives its 256-bit key once from the operator passphrase
//! and holds it in memory for its whole lifetime; the key is never
//! persisted anywhere.

pub mod engine;

pub use engine::EncryptionEngine;
