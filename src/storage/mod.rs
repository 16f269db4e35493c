// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local secure key-value storage for the session.
//!
//! Provides:
//! - The `SecureStore` trait implemented by each backend
//! - `MemoryStore` for tests and throwaway sessions
//! - `EncryptedFileStore` for sessions that survive restarts
//! - `SessionStorage`, the typed view used by the rest of the crate

pub mod cipher;
pub mod encrypted_file;
pub mod memory;

pub use cipher::StoreCipher;
pub use encrypted_file::EncryptedFileStore;
pub use memory::MemoryStore;

use crate::models::User;
use std::sync::Arc;

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored data is corrupt: {0}")]
    Corrupt(String),

    #[error("Encryption error: {0}")]
    Crypto(String),
}

/// A string key-value store whose contents are protected at rest.
pub trait SecureStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Storage key names.
pub mod keys {
    pub const TOKEN: &str = "auth_token";
    pub const USER: &str = "user_data";
    pub const REFRESH_TOKEN: &str = "refresh_token";

    pub const ALL: [&str; 3] = [TOKEN, USER, REFRESH_TOKEN];
}

/// Typed access to the session entries of a `SecureStore`.
#[derive(Clone)]
pub struct SessionStorage {
    store: Arc<dyn SecureStore>,
}

impl SessionStorage {
    pub fn new(store: Arc<dyn SecureStore>) -> Self {
        Self { store }
    }

    /// Session storage backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    // ─── Bearer Token ────────────────────────────────────────────

    pub fn save_token(&self, token: &str) -> Result<(), StorageError> {
        self.store.set(keys::TOKEN, token)
    }

    pub fn token(&self) -> Result<Option<String>, StorageError> {
        self.store.get(keys::TOKEN)
    }

    // ─── User Record ─────────────────────────────────────────────

    pub fn save_user(&self, user: &User) -> Result<(), StorageError> {
        let json = serde_json::to_string(user)
            .map_err(|e| StorageError::Corrupt(format!("Cannot encode user: {}", e)))?;
        self.store.set(keys::USER, &json)
    }

    pub fn user(&self) -> Result<Option<User>, StorageError> {
        match self.store.get(keys::USER)? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| StorageError::Corrupt(format!("Cannot decode user: {}", e))),
            None => Ok(None),
        }
    }

    // ─── Refresh Token ───────────────────────────────────────────

    pub fn save_refresh_token(&self, token: &str) -> Result<(), StorageError> {
        self.store.set(keys::REFRESH_TOKEN, token)
    }

    pub fn refresh_token(&self) -> Result<Option<String>, StorageError> {
        self.store.get(keys::REFRESH_TOKEN)
    }

    /// Remove every session entry.
    ///
    /// Attempts all keys even if one fails, then reports the first failure.
    pub fn clear_all(&self) -> Result<(), StorageError> {
        let mut first_err = None;
        for key in keys::ALL {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!(key, error = %e, "Failed to remove session entry");
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.store.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_user() -> User {
        serde_json::from_value(json!({"id": 42, "username": "asha", "email": "asha@uni.edu"}))
            .unwrap()
    }

    #[test]
    fn test_session_roundtrip_and_clear() {
        let storage = SessionStorage::in_memory();
        assert_eq!(storage.token().unwrap(), None);

        storage.save_token("tok").unwrap();
        storage.save_user(&sample_user()).unwrap();
        storage.save_refresh_token("ref").unwrap();

        assert_eq!(storage.token().unwrap().as_deref(), Some("tok"));
        assert_eq!(storage.user().unwrap().map(|u| u.id), Some(42));
        assert_eq!(storage.refresh_token().unwrap().as_deref(), Some("ref"));

        storage.clear_all().unwrap();
        assert_eq!(storage.token().unwrap(), None);
        assert_eq!(storage.user().unwrap(), None);
        assert_eq!(storage.refresh_token().unwrap(), None);
    }

    #[test]
    fn test_unknown_role_kept_across_save() {
        let storage = SessionStorage::in_memory();
        let user: User =
            serde_json::from_value(json!({"id": 7, "username": "old", "role": "ALUMNI"})).unwrap();
        storage.save_user(&user).unwrap();

        let loaded = storage.user().unwrap().unwrap();
        assert_eq!(loaded.role.as_ref().map(|r| r.as_str()), Some("ALUMNI"));
        assert_eq!(loaded, user);
    }

    #[test]
    fn test_corrupt_user_record() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::USER, "{not json").unwrap();
        let storage = SessionStorage::new(store);
        assert!(matches!(storage.user(), Err(StorageError::Corrupt(_))));
    }
}
