// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! File-backed secure store.
//!
//! The file is a JSON object mapping entry names to sealed values. Writes are
//! serialized by a mutex and land through a temp file + rename so a crash never
//! leaves a half-written store.

use super::{SecureStore, StorageError, StoreCipher};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub struct EncryptedFileStore {
    path: PathBuf,
    cipher: StoreCipher,
    write_lock: Mutex<()>,
}

impl EncryptedFileStore {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>, secret: &str) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            cipher: StoreCipher::from_secret(secret)?,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|e| StorageError::Corrupt(format!("{}: {}", self.path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn modify(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, String>) -> Result<bool, StorageError>,
    ) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::Corrupt("Store lock poisoned".to_string()))?;
        let mut entries = self.load()?;
        if f(&mut entries)? {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

impl SecureStore for EncryptedFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.load()?.get(key) {
            Some(sealed) => self.cipher.decrypt(sealed, key.as_bytes()).map(Some),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let sealed = self.cipher.encrypt(value, key.as_bytes())?;
        self.modify(|entries| {
            entries.insert(key.to_string(), sealed);
            Ok(true)
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.modify(|entries| Ok(entries.remove(key).is_some()))
    }
}
