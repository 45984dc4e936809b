//! Credential envelope: AEAD sealing of a long-lived secret under a KEK
//!
//! Wire format (JSON, field names stable across signup/signin):
//! ```text
//! {
//!   "v": 1,
//!   "nonce": base64,       // 24-byte XChaCha20-Poly1305 nonce
//!   "ciphertext": base64,  // ciphertext || 16-byte Poly1305 tag
//!   "salt": base64,        // 16-byte Argon2id salt used to derive the KEK
//!   "aad": string,         // associated-data descriptor, e.g. "mk:alice:v1"
//!   "kdf": { "mem_cost_kib", "time_cost", "parallelism" }
//! }
//! ```
//!
//! The AAD binds the envelope to (secret kind, username, protocol version):
//! swapping ciphertexts between users or between the master-key and
//! verification-token slots fails the integrity check. Base64 is the
//! standard alphabet with padding on both sides.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    XChaCha20Poly1305, XNonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};
use crate::kdf::{Kek, KdfParams};
use crate::{NONCE_SIZE, SALT_SIZE, TAG_SIZE};

/// Current envelope format version.
pub const ENVELOPE_VERSION: u32 = 1;

/// A sealed secret in its on-the-wire form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Format version
    pub v: u32,
    /// Nonce (base64)
    pub nonce: String,
    /// Ciphertext plus tag (base64)
    pub ciphertext: String,
    /// KDF salt (base64), stored alongside the sealed secret
    pub salt: String,
    /// Associated-data descriptor. Self-description only: `open` always
    /// authenticates against the caller-supplied AAD, never this field.
    pub aad: String,
    /// Cost parameters the KEK was derived with
    pub kdf: KdfParams,
}

impl Envelope {
    /// Decode the embedded KDF salt, validating its length.
    pub fn salt_bytes(&self) -> CryptoResult<[u8; SALT_SIZE]> {
        let raw = b64_decode(&self.salt)?;
        raw.as_slice().try_into().map_err(|_| {
            CryptoError::InvalidInput(format!(
                "salt must be {SALT_SIZE} bytes, got {}",
                raw.len()
            ))
        })
    }

    /// Serialize to JSON bytes for transport/storage.
    pub fn to_bytes(&self) -> CryptoResult<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| CryptoError::InvalidInput(format!("envelope serialization: {e}")))
    }

    /// Deserialize from JSON bytes.
    pub fn from_bytes(data: &[u8]) -> CryptoResult<Self> {
        serde_json::from_slice(data)
            .map_err(|e| CryptoError::InvalidInput(format!("envelope deserialization: {e}")))
    }
}

/// Seal a secret under a KEK with a fresh random nonce.
///
/// The salt is the one the KEK was derived from; it is carried in the
/// envelope so the opener can re-derive the same KEK. Nonces are generated
/// per call and never cached: reuse under the same key must be impossible
/// by construction.
pub fn seal(
    kek: &Kek,
    plaintext: &[u8],
    aad: &str,
    salt: &[u8],
    kdf: &KdfParams,
) -> CryptoResult<Envelope> {
    if plaintext.is_empty() {
        return Err(CryptoError::InvalidInput("plaintext must not be empty".into()));
    }
    if salt.len() != SALT_SIZE {
        return Err(CryptoError::InvalidInput(format!(
            "salt must be {SALT_SIZE} bytes, got {}",
            salt.len()
        )));
    }

    let cipher = XChaCha20Poly1305::new(kek.as_bytes().into());

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = XNonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad: aad.as_bytes(),
            },
        )
        .map_err(|_| CryptoError::InvalidInput("encryption failed".into()))?;

    tracing::debug!(aad, ciphertext_len = ciphertext.len(), "sealed envelope");

    Ok(Envelope {
        v: ENVELOPE_VERSION,
        nonce: b64_encode(&nonce_bytes),
        ciphertext: b64_encode(&ciphertext),
        salt: b64_encode(salt),
        aad: aad.to_string(),
        kdf: kdf.clone(),
    })
}

/// Open a sealed envelope.
///
/// Structural problems (unknown version, malformed base64, wrong nonce or
/// salt length, ciphertext shorter than a tag) are `InvalidInput`. Wrong
/// key, wrong AAD, and corrupted ciphertext all return the single uniform
/// `AuthenticationFailure`, so the caller cannot be used as an oracle to
/// distinguish them.
pub fn open(kek: &Kek, envelope: &Envelope, aad: &str) -> CryptoResult<Zeroizing<Vec<u8>>> {
    validate(envelope)?;

    let nonce_bytes = b64_decode(&envelope.nonce)?;
    let ciphertext = b64_decode(&envelope.ciphertext)?;

    let nonce = XNonce::from_slice(&nonce_bytes);
    let cipher = XChaCha20Poly1305::new(kek.as_bytes().into());

    let plaintext = cipher
        .decrypt(
            nonce,
            Payload {
                msg: &ciphertext,
                aad: aad.as_bytes(),
            },
        )
        .map_err(|_| CryptoError::AuthenticationFailure)?;

    tracing::debug!(aad, "opened envelope");

    Ok(Zeroizing::new(plaintext))
}

fn validate(envelope: &Envelope) -> CryptoResult<()> {
    if envelope.v != ENVELOPE_VERSION {
        return Err(CryptoError::InvalidInput(format!(
            "unsupported envelope version {}",
            envelope.v
        )));
    }

    let nonce = b64_decode(&envelope.nonce)?;
    if nonce.len() != NONCE_SIZE {
        return Err(CryptoError::InvalidInput(format!(
            "nonce must be {NONCE_SIZE} bytes, got {}",
            nonce.len()
        )));
    }

    let ciphertext = b64_decode(&envelope.ciphertext)?;
    if ciphertext.len() < TAG_SIZE {
        return Err(CryptoError::InvalidInput(
            "ciphertext too short (need at least the tag)".into(),
        ));
    }

    // Salt length is checked before any derivation work happens
    envelope.salt_bytes()?;

    Ok(())
}

fn b64_encode(data: &[u8]) -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    STANDARD.encode(data)
}

fn b64_decode(s: &str) -> CryptoResult<Vec<u8>> {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    STANDARD
        .decode(s)
        .map_err(|e| CryptoError::InvalidInput(format!("base64 decode: {e}")))
}
