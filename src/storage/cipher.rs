// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! AES-256-GCM sealing of individual store entries.
//!
//! The key is derived from a configured secret with HKDF-SHA256. Every value
//! is sealed with a fresh random nonce and the entry name as additional
//! authenticated data, so a ciphertext cannot be moved to another key.
//! Output is base64(nonce || ciphertext || tag).

use super::StorageError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hkdf::Hkdf;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::Sha256;
use std::sync::Arc;

/// Entry encryption for the local store.
#[derive(Clone)]
pub struct StoreCipher {
    key: Arc<LessSafeKey>,
    rng: SystemRandom,
}

impl StoreCipher {
    /// HKDF salt; changing it invalidates every existing store.
    const SALT: &'static [u8] = b"campus-hub/secure-store";
    const INFO: &'static [u8] = b"aes-256-gcm entry key v1";

    /// Derive the entry key from a secret.
    pub fn from_secret(secret: &str) -> Result<Self, StorageError> {
        if secret.is_empty() {
            return Err(StorageError::Crypto("Store secret is empty".to_string()));
        }

        let hk = Hkdf::<Sha256>::new(Some(Self::SALT), secret.as_bytes());
        let mut okm = [0u8; 32];
        hk.expand(Self::INFO, &mut okm)
            .map_err(|e| StorageError::Crypto(format!("Key derivation failed: {}", e)))?;

        let unbound = UnboundKey::new(&AES_256_GCM, &okm)
            .map_err(|_| StorageError::Crypto("Invalid AES-256-GCM key".to_string()))?;

        Ok(Self {
            key: Arc::new(LessSafeKey::new(unbound)),
            rng: SystemRandom::new(),
        })
    }

    /// Encrypt plaintext bound to `aad`.
    /// Returns base64-encoded nonce and ciphertext.
    pub fn encrypt(&self, plaintext: &str, aad: &[u8]) -> Result<String, StorageError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| StorageError::Crypto("Nonce generation failed".to_string()))?;

        let mut in_out = plaintext.as_bytes().to_vec();
        self.key
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::from(aad),
                &mut in_out,
            )
            .map_err(|_| StorageError::Crypto("Seal failed".to_string()))?;

        let mut out = Vec::with_capacity(NONCE_LEN + in_out.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&in_out);
        Ok(BASE64.encode(out))
    }

    /// Decrypt a value produced by [`StoreCipher::encrypt`] with the same `aad`.
    pub fn decrypt(&self, ciphertext_b64: &str, aad: &[u8]) -> Result<String, StorageError> {
        let data = BASE64
            .decode(ciphertext_b64)
            .map_err(|e| StorageError::Corrupt(format!("Base64 decode failed: {}", e)))?;

        if data.len() < NONCE_LEN {
            return Err(StorageError::Corrupt("Ciphertext too short".to_string()));
        }
        let (nonce_bytes, sealed) = data.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| StorageError::Corrupt("Bad nonce".to_string()))?;

        let mut in_out = sealed.to_vec();
        let plaintext = self
            .key
            .open_in_place(nonce, Aad::from(aad), &mut in_out)
            .map_err(|_| {
                StorageError::Crypto("Decryption failed (wrong key or tampered entry)".to_string())
            })?;

        String::from_utf8(plaintext.to_vec())
            .map_err(|e| StorageError::Corrupt(format!("UTF-8 decode failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt() {
        let cipher = StoreCipher::from_secret("device secret").unwrap();
        let sealed = cipher.encrypt("eyJhbGciOi", b"auth_token").unwrap();
        assert!(!sealed.contains("eyJhbGciOi"));
        assert_eq!(cipher.decrypt(&sealed, b"auth_token").unwrap(), "eyJhbGciOi");
    }

    #[test]
    fn test_nonce_is_fresh() {
        let cipher = StoreCipher::from_secret("device secret").unwrap();
        let a = cipher.encrypt("same", b"k").unwrap();
        let b = cipher.encrypt("same", b"k").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_aad_mismatch_rejected() {
        let cipher = StoreCipher::from_secret("device secret").unwrap();
        let sealed = cipher.encrypt("token", b"auth_token").unwrap();
        assert!(matches!(
            cipher.decrypt(&sealed, b"refresh_token"),
            Err(StorageError::Crypto(_))
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let sealed = StoreCipher::from_secret("one")
            .unwrap()
            .encrypt("token", b"auth_token")
            .unwrap();
        let other = StoreCipher::from_secret("two").unwrap();
        assert!(other.decrypt(&sealed, b"auth_token").is_err());
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(StoreCipher::from_secret("").is_err());
    }
}
