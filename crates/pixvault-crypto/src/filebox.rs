//! Per-file XChaCha20-Poly1305 encryption under the account master key
//!
//! Encrypted blob format (binary, self-contained):
//! ```text
//! [1 byte: format tag (0x01)][24 bytes: random nonce][N bytes: ciphertext][16 bytes: tag]
//! ```
//!
//! No associated data: file identity is bound by storage-layer naming, not
//! by the cipher. The format tag allows a future cipher migration without
//! breaking stored blobs. The master key is long-lived and reused across
//! every file of an account; safety against nonce reuse rests on drawing a
//! fresh random 192-bit nonce per call.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use rand::RngCore;
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};
use crate::{KEY_SIZE, NONCE_SIZE, TAG_SIZE};

/// Blob format tag for the current scheme.
pub const FILE_FORMAT_V1: u8 = 0x01;

/// The account's long-lived 256-bit file-encryption key.
///
/// Generated once at signup, sealed under the KEK, and independent of the
/// password: a password change re-seals this key but never rotates it, so
/// stored photos are never re-encrypted. Zeroized on drop.
#[derive(Clone)]
pub struct MasterKey {
    bytes: [u8; KEY_SIZE],
}

impl MasterKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// Generate a fresh random master key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }
}

impl Drop for MasterKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Encrypt a file payload with the master key.
///
/// Returns the self-contained blob stored by object storage:
/// `[format tag][nonce][ciphertext + tag]`.
pub fn encrypt_file(master: &MasterKey, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(master.as_bytes().into());

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = XNonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CryptoError::InvalidInput("file encryption failed".into()))?;

    let mut blob = Vec::with_capacity(1 + NONCE_SIZE + ciphertext.len());
    blob.push(FILE_FORMAT_V1);
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Decrypt a file blob with the master key.
///
/// Rejects blobs that are truncated or carry an unknown format tag before
/// any cipher work; a tag mismatch (wrong key or corrupted data) is the
/// uniform `AuthenticationFailure`.
pub fn decrypt_file(master: &MasterKey, blob: &[u8]) -> CryptoResult<Vec<u8>> {
    if blob.len() < 1 + NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::InvalidInput(format!(
            "file blob too short: {} bytes (minimum {})",
            blob.len(),
            1 + NONCE_SIZE + TAG_SIZE
        )));
    }
    if blob[0] != FILE_FORMAT_V1 {
        return Err(CryptoError::InvalidInput(format!(
            "unknown file blob format tag {:#04x}",
            blob[0]
        )));
    }

    let (nonce_bytes, ciphertext) = blob[1..].split_at(NONCE_SIZE);
    let nonce = XNonce::from_slice(nonce_bytes);
    let cipher = XChaCha20Poly1305::new(master.as_bytes().into());

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CryptoError::AuthenticationFailure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let master = MasterKey::generate();
        let plaintext = b"raw photo bytes";

        let blob = encrypt_file(&master, plaintext).unwrap();
        let decrypted = decrypt_file(&master, &blob).unwrap();

        assert_eq!(&decrypted, plaintext);
    }

    #[test]
    fn test_encrypt_decrypt_empty() {
        let master = MasterKey::generate();

        let blob = encrypt_file(&master, b"").unwrap();
        let decrypted = decrypt_file(&master, &blob).unwrap();

        assert_eq!(decrypted, b"");
    }

    #[test]
    fn test_decrypt_wrong_key() {
        let master1 = MasterKey::generate();
        let master2 = MasterKey::generate();

        let blob = encrypt_file(&master1, b"secret image").unwrap();
        let result = decrypt_file(&master2, &blob);

        assert!(matches!(result, Err(CryptoError::AuthenticationFailure)));
    }

    #[test]
    fn test_tampered_ciphertext() {
        let master = MasterKey::generate();
        let mut blob = encrypt_file(&master, b"secret image").unwrap();
        // Flip a bit in the ciphertext (after the format tag and nonce)
        blob[1 + NONCE_SIZE] ^= 0x01;

        let result = decrypt_file(&master, &blob);
        assert!(matches!(result, Err(CryptoError::AuthenticationFailure)));
    }

    #[test]
    fn test_tampered_nonce() {
        let master = MasterKey::generate();
        let mut blob = encrypt_file(&master, b"secret image").unwrap();
        blob[1] ^= 0x80;

        let result = decrypt_file(&master, &blob);
        assert!(matches!(result, Err(CryptoError::AuthenticationFailure)));
    }

    #[test]
    fn test_truncated_blob() {
        let master = MasterKey::generate();
        let blob = encrypt_file(&master, b"secret image").unwrap();

        let result = decrypt_file(&master, &blob[..NONCE_SIZE]);
        assert!(matches!(result, Err(CryptoError::InvalidInput(_))));
    }

    #[test]
    fn test_unknown_format_tag() {
        let master = MasterKey::generate();
        let mut blob = encrypt_file(&master, b"secret image").unwrap();
        blob[0] = 0x02;

        let result = decrypt_file(&master, &blob);
        assert!(matches!(result, Err(CryptoError::InvalidInput(_))));
    }

    #[test]
    fn test_blob_size() {
        let master = MasterKey::generate();
        let plaintext = vec![0u8; 1000];

        let blob = encrypt_file(&master, &plaintext).unwrap();

        // tag byte (1) + nonce (24) + plaintext (1000) + tag (16)
        assert_eq!(blob.len(), 1 + NONCE_SIZE + 1000 + TAG_SIZE);
    }

    #[test]
    fn test_nonce_uniqueness() {
        let master = MasterKey::generate();
        let mut nonces = HashSet::new();

        for _ in 0..10_000 {
            let blob = encrypt_file(&master, b"").unwrap();
            let nonce: [u8; NONCE_SIZE] = blob[1..1 + NONCE_SIZE].try_into().unwrap();
            assert!(nonces.insert(nonce), "nonce collision across encryptions");
        }
    }

    #[test]
    fn test_master_key_generate_unique() {
        let k1 = MasterKey::generate();
        let k2 = MasterKey::generate();
        assert_ne!(k1.as_bytes(), k2.as_bytes(), "random keys must differ");
    }

    #[test]
    fn test_master_key_debug_redacted() {
        let key = MasterKey::generate();
        let rendered = format!("{key:?}");
        assert!(rendered.contains("REDACTED"));
    }
}
