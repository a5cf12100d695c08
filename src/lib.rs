//! CredVault: a personal credential vault.
//!
//! Stored secrets are envelope-encrypted with AES-256-GCM before they ever
//! reach durable storage, every vault mutation lands in an append-only
//! audit log, and account access is hardened with a login-attempt lockout,
//! optional TOTP multi-factor authentication, and single-use expiring
//! password-reset tokens.

pub mod audit;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod store;
pub mod vault;
