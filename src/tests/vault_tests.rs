use super::test_vault;
use crate::Error;
use crate::vault::KeyVault;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

#[test]
fn test_encrypt_decrypt_round_trip() {
    let vault = test_vault();

    let blob = vault.encrypt("u123").expect("Failed to encrypt");
    let plain = vault.decrypt(&blob).expect("Failed to decrypt");

    assert_eq!(plain, "u123");
}

#[test]
fn test_ciphertext_is_not_plaintext() {
    let vault = test_vault();

    let blob = vault.encrypt("u123").expect("Failed to encrypt");

    assert_ne!(blob, "u123");
    assert!(!blob.contains("u123"));
}

#[test]
fn test_round_trip_multibyte() {
    let vault = test_vault();

    let blob = vault.encrypt("こんにちは").expect("Failed to encrypt");
    assert_eq!(vault.decrypt(&blob).expect("Failed to decrypt"), "こんにちは");
}

#[test]
fn test_key_creation_is_idempotent() {
    let vault = test_vault();

    // Several encrypts without an intervening clear reuse one key pair:
    // every blob decrypts through the same decrypt path
    let blobs: Vec<String> = (0..5)
        .map(|i| vault.encrypt(&format!("user-{}", i)).expect("Failed to encrypt"))
        .collect();

    for (i, blob) in blobs.iter().enumerate() {
        assert_eq!(
            vault.decrypt(blob).expect("Failed to decrypt"),
            format!("user-{}", i)
        );
    }
}

#[test]
fn test_encrypt_same_plaintext_twice_differs() {
    let vault = test_vault();

    // Fresh ephemeral key and nonce per call
    let a = vault.encrypt("u123").expect("Failed to encrypt");
    let b = vault.encrypt("u123").expect("Failed to encrypt");

    assert_ne!(a, b);
    assert_eq!(vault.decrypt(&a).expect("decrypt a"), "u123");
    assert_eq!(vault.decrypt(&b).expect("decrypt b"), "u123");
}

#[test]
fn test_decrypt_without_key_fails_cleanly() {
    let vault = test_vault();

    // No encrypt has happened, so no key pair exists
    let result = vault.decrypt("AAAA");

    assert!(matches!(result, Err(Error::KeyUnavailable)));
}

#[test]
fn test_decrypt_invalid_base64() {
    let vault = test_vault();
    vault.encrypt("seed the key").expect("Failed to encrypt");

    let result = vault.decrypt("not-valid-base64!!!");

    assert!(matches!(result, Err(Error::DecryptionFailed(_))));
}

#[test]
fn test_decrypt_truncated_blob() {
    let vault = test_vault();
    vault.encrypt("seed the key").expect("Failed to encrypt");

    let short = URL_SAFE_NO_PAD.encode([0u8; 16]);
    let result = vault.decrypt(&short);

    assert!(matches!(result, Err(Error::DecryptionFailed(_))));
}

#[test]
fn test_decrypt_tampered_blob() {
    let vault = test_vault();

    let blob = vault.encrypt("u123").expect("Failed to encrypt");
    let mut bytes = URL_SAFE_NO_PAD.decode(&blob).expect("Invalid blob encoding");
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    let tampered = URL_SAFE_NO_PAD.encode(bytes);

    assert!(matches!(
        vault.decrypt(&tampered),
        Err(Error::DecryptionFailed(_))
    ));
}

#[test]
fn test_decrypt_with_wrong_key_pair() {
    let vault_a = test_vault();
    let vault_b = test_vault();

    let blob = vault_a.encrypt("u123").expect("Failed to encrypt");
    // Give B its own key pair, then feed it A's blob
    vault_b.encrypt("other").expect("Failed to encrypt");

    assert!(matches!(
        vault_b.decrypt(&blob),
        Err(Error::DecryptionFailed(_))
    ));
}

#[test]
fn test_clear_removes_key() {
    let vault = test_vault();

    let blob = vault.encrypt("u123").expect("Failed to encrypt");
    vault.clear().expect("Failed to clear");

    // Old key pair is gone; the blob is permanently undecryptable
    assert!(matches!(vault.decrypt(&blob), Err(Error::KeyUnavailable)));
}

#[test]
fn test_clear_is_idempotent() {
    let vault = test_vault();

    vault.clear().expect("Clear on empty vault should succeed");
    vault.encrypt("u123").expect("Failed to encrypt");
    vault.clear().expect("Failed to clear");
    vault.clear().expect("Second clear should succeed");
}

#[test]
fn test_new_key_after_clear_cannot_read_old_blob() {
    let vault = test_vault();

    let old_blob = vault.encrypt("u123").expect("Failed to encrypt");
    vault.clear().expect("Failed to clear");

    // A fresh key pair comes up lazily on the next encrypt
    let new_blob = vault.encrypt("u456").expect("Failed to encrypt");
    assert_eq!(vault.decrypt(&new_blob).expect("Failed to decrypt"), "u456");
    assert!(matches!(
        vault.decrypt(&old_blob),
        Err(Error::DecryptionFailed(_))
    ));
}
