//! Durable-store abstractions.
//!
//! The vault, MFA, and reset components talk to storage through these
//! traits; absence is reported as `Ok(None)` / `Ok(false)`, never as an
//! error, so callers can distinguish "not found" from a storage fault.
//! One in-memory implementation (`MemoryStore`) ships with the crate;
//! deployments bring their own durable implementations.

pub mod memory;

use uuid::Uuid;

use crate::auth::token::PasswordResetToken;
use crate::auth::user::User;
use crate::errors::Result;
use crate::vault::entry::SecretEntry;

pub use memory::MemoryStore;

/// Storage for user accounts.
pub trait UserStore: Send + Sync {
    fn insert(&self, user: User) -> Result<()>;

    fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Replace the stored record matching `user.id`.  Returns `false` if
    /// the user no longer exists.
    fn update(&self, user: &User) -> Result<bool>;
}

/// Storage for encrypted credential entries.
pub trait EntryStore: Send + Sync {
    fn insert(&self, entry: SecretEntry) -> Result<()>;

    fn find_by_id(&self, id: Uuid) -> Result<Option<SecretEntry>>;

    fn find_by_owner(&self, owner: &str) -> Result<Vec<SecretEntry>>;

    /// Replace the stored record matching `entry.id`.  Returns `false` if
    /// the entry no longer exists (e.g. a concurrent delete won).
    fn update(&self, entry: &SecretEntry) -> Result<bool>;

    /// Returns `false` if the entry was already gone.
    fn delete(&self, id: Uuid) -> Result<bool>;
}

/// Storage for password-reset tokens.
pub trait TokenStore: Send + Sync {
    fn insert(&self, token: PasswordResetToken) -> Result<()>;

    fn find_by_token(&self, token: &str) -> Result<Option<PasswordResetToken>>;

    /// Compare-and-set consumption of a token: flips `used` from false to
    /// true and returns `true` only for the call that performed the flip.
    /// Concurrent redemptions of the same token see exactly one `true`.
    fn consume(&self, token: &str) -> Result<bool>;

    /// Mark every unused token belonging to `user_id` as used, so a
    /// freshly issued token is the only live one.
    fn invalidate_for_user(&self, user_id: Uuid) -> Result<()>;
}
