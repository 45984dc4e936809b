//! pixvault-crypto: client-side encryption for PixVault
//!
//! The server never sees a plaintext password, key, or photo byte.
//!
//! Key hierarchy:
//! ```text
//! Password ──Argon2id(salt)──▶ KEK (256-bit, transient)
//!   ├── seals Master Key          (envelope, AAD = "mk:<username>:v1")
//!   └── seals Verification Token  (envelope, AAD = "vt:<username>:v1")
//! Master Key (256-bit random, lifetime of the account)
//!   └── File AEAD: XChaCha20-Poly1305 (nonce = random 192-bit, no AAD)
//! ```
//!
//! Changing the password re-seals the two envelopes under a new KEK; the
//! master key itself never changes, so stored photos never need re-encryption.

pub mod envelope;
pub mod error;
pub mod filebox;
pub mod kdf;

pub use envelope::{seal, open, Envelope};
pub use error::{CryptoError, CryptoResult};
pub use filebox::{decrypt_file, encrypt_file, MasterKey};
pub use kdf::{derive_kek, Kek, KdfParams};

/// Size of a symmetric key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of an XChaCha20-Poly1305 nonce (192-bit)
pub const NONCE_SIZE: usize = 24;

/// Size of a Poly1305 authentication tag
pub const TAG_SIZE: usize = 16;

/// Size of the KDF salt (128-bit)
pub const SALT_SIZE: usize = 16;
