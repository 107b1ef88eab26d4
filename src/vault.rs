//! Secure key vault module
//!
//! This module protects the server-issued user identifier at rest. It exposes
//! a [`KeyVault`] capability trait (encrypt/decrypt/clear) and one
//! implementation, [`SecureKeyStore`], backed by the operating system keyring
//! (macOS/iOS Keychain, Windows Credential Manager, Linux Secret Service).
//!
//! The scheme is envelope encryption against a static X25519 key pair: each
//! `encrypt` call performs an ephemeral ECDH with the static public key and
//! seals the plaintext with XChaCha20-Poly1305. A blob is only decryptable by
//! the key pair that produced it; if the keyring entry is lost, the blob is
//! permanently undecryptable.
//!
//! Weaker guarantee than a hardware keystore: the static secret is readable
//! by the application (the keyring limits exposure to the logged-in user, it
//! does not make the key non-extractable). Platforms with a hardware-backed
//! store can provide their own [`KeyVault`] implementation instead.

use crate::{Error, Result};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};
use keyring::Entry;
use std::sync::Mutex;

/// Keyring service name
const KEYRING_SERVICE: &str = "kaiwa";
/// Fixed alias for the static secret; only one key pair ever exists per
/// installation
const KEY_ALIAS: &str = "identity-key";

// Blob layout: ephemeral public key || nonce || ciphertext+tag
const EPHEMERAL_PUB_LEN: usize = 32;
const NONCE_LEN: usize = 24;

/// Capability interface for at-rest protection of small strings
///
/// Implementations own exactly one key pair. `encrypt` lazily creates it on
/// first use; `decrypt` fails with [`Error::KeyUnavailable`] if it does not
/// exist yet and [`Error::DecryptionFailed`] on a ciphertext/key mismatch.
pub trait KeyVault {
    /// Encrypt a UTF-8 string, returning a text-safe encoded blob
    fn encrypt(&self, plaintext: &str) -> Result<String>;

    /// Decrypt a blob produced by [`KeyVault::encrypt`] back to the string
    fn decrypt(&self, encoded: &str) -> Result<String>;

    /// Remove the key pair; idempotent
    fn clear(&self) -> Result<()>;
}

/// OS-keyring-backed key vault
///
/// Holds a single keyring [`Entry`] for the installation's static X25519
/// secret. The entry is created lazily on the first `encrypt`; creation is
/// serialized so concurrent first use produces at most one key.
pub struct SecureKeyStore {
    entry: Entry,
    // Serializes lazy key creation and keyring access
    lock: Mutex<()>,
}

impl SecureKeyStore {
    /// Open the vault under the default service name and alias
    ///
    /// # Errors
    /// Returns `Error::Crypto` if the platform keyring is unavailable; this
    /// is fatal for the identity subsystem (there is no in-app recovery
    /// other than clearing storage and re-registering).
    pub fn new() -> Result<Self> {
        Self::with_alias(KEYRING_SERVICE, KEY_ALIAS)
    }

    /// Open the vault under an explicit service name and alias
    pub fn with_alias(service: &str, alias: &str) -> Result<Self> {
        let entry = Entry::new(service, alias)
            .map_err(|e| Error::Crypto(format!("Failed to open secure store: {}", e)))?;

        Ok(Self {
            entry,
            lock: Mutex::new(()),
        })
    }

    /// Load the static secret, or generate and persist it when absent
    fn load_or_create_secret(&self) -> Result<[u8; 32]> {
        match self.load_secret()? {
            Some(secret) => Ok(secret),
            None => {
                let secret = generate_secret();
                self.entry
                    .set_password(&hex::encode(secret))
                    .map_err(|e| Error::Crypto(format!("Failed to store key: {}", e)))?;
                tracing::info!("Generated new vault key pair");
                Ok(secret)
            }
        }
    }

    /// Load the static secret if one exists
    fn load_secret(&self) -> Result<Option<[u8; 32]>> {
        match self.entry.get_password() {
            Ok(stored) => {
                let bytes = hex::decode(&stored)
                    .map_err(|e| Error::Crypto(format!("Invalid key encoding in store: {}", e)))?;
                let secret: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| Error::Crypto("Invalid key length in store".to_string()))?;
                Ok(Some(secret))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(Error::Crypto(format!("Failed to read secure store: {}", e))),
        }
    }
}

impl KeyVault for SecureKeyStore {
    fn encrypt(&self, plaintext: &str) -> Result<String> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;

        let secret = self.load_or_create_secret()?;
        let static_public = x25519_dalek::x25519(secret, x25519_dalek::X25519_BASEPOINT_BYTES);

        // Fresh ephemeral key per call; its public half rides in the blob
        let ephemeral_secret = generate_secret();
        let ephemeral_public =
            x25519_dalek::x25519(ephemeral_secret, x25519_dalek::X25519_BASEPOINT_BYTES);
        let shared = x25519_dalek::x25519(ephemeral_secret, static_public);

        let cipher = XChaCha20Poly1305::new(&shared.into());
        let nonce_bytes = generate_nonce();
        let nonce = XNonce::from(nonce_bytes);

        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| Error::Crypto(format!("Encryption failed: {}", e)))?;

        let mut blob = Vec::with_capacity(EPHEMERAL_PUB_LEN + NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&ephemeral_public);
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);

        Ok(URL_SAFE_NO_PAD.encode(blob))
    }

    fn decrypt(&self, encoded: &str) -> Result<String> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;

        let secret = self.load_secret()?.ok_or(Error::KeyUnavailable)?;

        let blob = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| Error::DecryptionFailed(format!("Invalid base64 blob: {}", e)))?;

        if blob.len() < EPHEMERAL_PUB_LEN + NONCE_LEN {
            return Err(Error::DecryptionFailed("Blob too short".to_string()));
        }

        let ephemeral_public: [u8; 32] = blob[..EPHEMERAL_PUB_LEN]
            .try_into()
            .map_err(|_| Error::DecryptionFailed("Invalid ephemeral key".to_string()))?;
        let nonce_bytes: [u8; 24] = blob[EPHEMERAL_PUB_LEN..EPHEMERAL_PUB_LEN + NONCE_LEN]
            .try_into()
            .map_err(|_| Error::DecryptionFailed("Invalid nonce".to_string()))?;
        let ciphertext = &blob[EPHEMERAL_PUB_LEN + NONCE_LEN..];

        let shared = x25519_dalek::x25519(secret, ephemeral_public);
        let cipher = XChaCha20Poly1305::new(&shared.into());

        let plaintext = cipher
            .decrypt(&XNonce::from(nonce_bytes), ciphertext)
            .map_err(|_| Error::DecryptionFailed("Ciphertext/key mismatch".to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|e| Error::DecryptionFailed(format!("Invalid UTF-8 plaintext: {}", e)))
    }

    fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().map_err(|_| poisoned())?;

        match self.entry.delete_credential() {
            Ok(()) => {
                tracing::info!("Vault key pair removed");
                Ok(())
            }
            // Already absent
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(Error::Crypto(format!("Failed to clear secure store: {}", e))),
        }
    }
}

impl std::fmt::Debug for SecureKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureKeyStore").finish_non_exhaustive()
    }
}

fn generate_secret() -> [u8; 32] {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    bytes
}

fn generate_nonce() -> [u8; 24] {
    use rand::RngCore;
    let mut bytes = [0u8; 24];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    bytes
}

fn poisoned() -> Error {
    Error::Crypto("Vault lock poisoned".to_string())
}
