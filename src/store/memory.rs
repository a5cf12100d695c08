//! In-memory store implementation.
//!
//! Backs all three repository traits with process-local maps.  Entry and
//! user records sit behind `RwLock`s; reset tokens sit behind a `Mutex`
//! so that `consume` is a genuine compare-and-set (lookup and flip happen
//! under one lock acquisition).
//!
//! Token lookups deliberately scan and compare with `subtle` instead of
//! hashing the token into a map key, so matching is constant-time in the
//! token contents.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::auth::token::PasswordResetToken;
use crate::auth::user::User;
use crate::errors::{CredVaultError, Result};
use crate::vault::entry::SecretEntry;

use super::{EntryStore, TokenStore, UserStore};

/// Process-local implementation of every store trait.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    entries: RwLock<HashMap<Uuid, SecretEntry>>,
    tokens: Mutex<Vec<PasswordResetToken>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> CredVaultError {
    CredVaultError::Storage("store lock poisoned".to_string())
}

impl UserStore for MemoryStore {
    fn insert(&self, user: User) -> Result<()> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        users.insert(user.id, user);
        Ok(())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.get(&id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    fn update(&self, user: &User) -> Result<bool> {
        let mut users = self.users.write().map_err(|_| poisoned())?;
        match users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl EntryStore for MemoryStore {
    fn insert(&self, entry: SecretEntry) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(entry.id, entry);
        Ok(())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<SecretEntry>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(&id).cloned())
    }

    fn find_by_owner(&self, owner: &str) -> Result<Vec<SecretEntry>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        let mut owned: Vec<SecretEntry> = entries
            .values()
            .filter(|e| e.owner == owner)
            .cloned()
            .collect();
        // Stable order for callers and tests.
        owned.sort_by_key(|e| e.created_at);
        Ok(owned)
    }

    fn update(&self, entry: &SecretEntry) -> Result<bool> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        match entries.get_mut(&entry.id) {
            Some(existing) => {
                *existing = entry.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, id: Uuid) -> Result<bool> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        Ok(entries.remove(&id).is_some())
    }
}

impl TokenStore for MemoryStore {
    fn insert(&self, token: PasswordResetToken) -> Result<()> {
        let mut tokens = self.tokens.lock().map_err(|_| poisoned())?;
        tokens.push(token);
        Ok(())
    }

    fn find_by_token(&self, token: &str) -> Result<Option<PasswordResetToken>> {
        let tokens = self.tokens.lock().map_err(|_| poisoned())?;
        Ok(tokens
            .iter()
            .find(|t| t.token.as_bytes().ct_eq(token.as_bytes()).into())
            .cloned())
    }

    fn consume(&self, token: &str) -> Result<bool> {
        let mut tokens = self.tokens.lock().map_err(|_| poisoned())?;
        for stored in tokens.iter_mut() {
            if bool::from(stored.token.as_bytes().ct_eq(token.as_bytes())) {
                if stored.used {
                    return Ok(false);
                }
                stored.used = true;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn invalidate_for_user(&self, user_id: Uuid) -> Result<()> {
        let mut tokens = self.tokens.lock().map_err(|_| poisoned())?;
        for stored in tokens.iter_mut() {
            if stored.user_id == user_id {
                stored.used = true;
            }
        }
        Ok(())
    }
}
