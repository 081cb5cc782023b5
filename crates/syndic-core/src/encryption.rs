//! Sealing of vendor tokens at rest
//!
//! A sealed token is `v1.` followed by base64url of `nonce || ciphertext`. The
//! ciphertext is AES-256-GCM with the store key of the credential as
//! associated data, so a token copied under another owner or vendor no longer
//! opens.

use crate::{CoreError, CoreResult};
use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng, Payload},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use std::env;

/// Variable holding the base64 (standard alphabet) sealing key.
pub const KEY_ENV: &str = "ENCRYPTION_KEY";

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const ENVELOPE_PREFIX: &str = "v1.";

fn sealing_error(what: impl std::fmt::Display) -> CoreError {
    CoreError::Encryption(what.to_string())
}

#[derive(Clone)]
pub struct EncryptionService {
    cipher: Aes256Gcm,
}

impl EncryptionService {
    /// Key must be exactly 32 bytes.
    pub fn from_key_bytes(key: &[u8]) -> CoreResult<Self> {
        if key.len() != KEY_LEN {
            return Err(sealing_error(format!(
                "Sealing key must be {} bytes, got {}",
                KEY_LEN,
                key.len()
            )));
        }
        Ok(Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
        })
    }

    pub fn from_base64_key(encoded: &str) -> CoreResult<Self> {
        let key = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| sealing_error(format!("{} is not valid base64: {}", KEY_ENV, e)))?;
        Self::from_key_bytes(&key)
    }

    pub fn from_env() -> CoreResult<Self> {
        let encoded =
            env::var(KEY_ENV).map_err(|_| sealing_error(format!("{} is not set", KEY_ENV)))?;
        Self::from_base64_key(&encoded)
    }

    /// Seal a token for the credential stored under `binding`.
    pub fn seal(&self, token: &str, binding: &str) -> CoreResult<String> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let payload = Payload {
            msg: token.as_bytes(),
            aad: binding.as_bytes(),
        };
        let ciphertext = self
            .cipher
            .encrypt(&nonce, payload)
            .map_err(|_| sealing_error("Token could not be sealed"))?;

        let mut envelope = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        envelope.extend_from_slice(&nonce);
        envelope.extend_from_slice(&ciphertext);
        Ok(format!("{}{}", ENVELOPE_PREFIX, URL_SAFE_NO_PAD.encode(envelope)))
    }

    /// Open a token sealed for `binding`.
    ///
    /// Fails on plaintext, on a different key and on a token sealed for
    /// another binding.
    pub fn open(&self, sealed: &str, binding: &str) -> CoreResult<String> {
        let body = sealed
            .strip_prefix(ENVELOPE_PREFIX)
            .ok_or_else(|| sealing_error("Token is not sealed"))?;
        let envelope = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|e| sealing_error(format!("Sealed token is not valid base64: {}", e)))?;
        if envelope.len() <= NONCE_LEN {
            return Err(sealing_error("Sealed token is truncated"));
        }

        let (nonce, ciphertext) = envelope.split_at(NONCE_LEN);
        let payload = Payload {
            msg: ciphertext,
            aad: binding.as_bytes(),
        };
        let token = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), payload)
            .map_err(|_| sealing_error("Token could not be opened with this key and binding"))?;

        String::from_utf8(token)
            .map_err(|e| sealing_error(format!("Opened token is not UTF-8: {}", e)))
    }
}
