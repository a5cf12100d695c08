//! Authentication hardening for the vault.
//!
//! This module provides:
//! - `User` account records (`user`)
//! - Argon2id password hashing (`password`)
//! - The in-memory login-attempt lockout (`limiter`)
//! - The login entry point composing limiter, password check, and MFA
//!   (`login`)
//! - TOTP multi-factor provisioning and verification (`mfa`)
//! - The single-use password-reset token lifecycle (`reset`, `token`)

pub mod limiter;
pub mod login;
pub mod mfa;
pub mod password;
pub mod reset;
pub mod token;
pub mod user;

pub use limiter::LoginAttemptLimiter;
pub use login::{Authenticator, LoginOutcome};
pub use mfa::{MfaService, ProvisionedSecret};
pub use reset::{Mailer, NoopMailer, PasswordResetService};
pub use token::PasswordResetToken;
pub use user::User;
