//! Boundary traits for the external account store and object storage
//!
//! The real backends live behind HTTP and impose no cryptographic semantics
//! of their own; these traits capture only the contract the credential and
//! photo flows depend on. In-memory implementations back the tests and
//! local development.

use std::collections::HashMap;
use std::sync::Mutex;

use subtle::ConstantTimeEq;

use pixvault_core::types::PhotoMeta;
use pixvault_core::{PixvaultError, PixvaultResult};
use pixvault_crypto::Envelope;
use pixvault_crypto::KEY_SIZE;

use crate::credentials::SignupRecord;

/// What the account store persists for one user.
#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub username: String,
    pub email: String,
    pub sealed_master: Envelope,
    pub sealed_verif: Envelope,
    /// The server's equality-check secret, received in the clear at signup.
    pub verification_token: [u8; KEY_SIZE],
}

/// Server-side account persistence and token verification.
pub trait AccountStore {
    /// Persist a new account. Fails on duplicate username.
    fn create_account(
        &self,
        username: &str,
        email: &str,
        record: SignupRecord,
    ) -> PixvaultResult<()>;

    /// Signin-fetch: return `(sealed_master, sealed_verif)` for a username.
    /// Pure retrieval, no cryptography.
    fn fetch_envelopes(&self, username: &str) -> PixvaultResult<(Envelope, Envelope)>;

    /// Constant-time comparison of the presented proof against the token
    /// captured at signup; issues an opaque session credential on match.
    fn verify_token(&self, username: &str, proof: &[u8]) -> PixvaultResult<String>;
}

/// Opaque-blob storage keyed by `(owner, filename)`.
pub trait ObjectStore {
    /// Store an encrypted blob verbatim.
    fn put(&self, meta: &PhotoMeta, blob: Vec<u8>) -> PixvaultResult<()>;

    /// Return the blob exactly as uploaded.
    fn get(&self, owner: &str, filename: &str) -> PixvaultResult<Vec<u8>>;

    /// List an owner's photo metadata.
    fn list(&self, owner: &str) -> PixvaultResult<Vec<PhotoMeta>>;

    /// Remove a blob and its metadata. Fails if the photo does not exist.
    fn delete(&self, owner: &str, filename: &str) -> PixvaultResult<()>;
}

/// In-memory account store for tests and local development.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<HashMap<String, AccountRecord>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for MemoryAccountStore {
    fn create_account(
        &self,
        username: &str,
        email: &str,
        record: SignupRecord,
    ) -> PixvaultResult<()> {
        let mut accounts = self
            .accounts
            .lock()
            .map_err(|_| PixvaultError::Storage("account store poisoned".into()))?;
        if accounts.contains_key(username) {
            return Err(PixvaultError::Storage(format!(
                "username '{username}' already exists"
            )));
        }
        accounts.insert(
            username.to_string(),
            AccountRecord {
                username: username.to_string(),
                email: email.to_string(),
                sealed_master: record.sealed_master,
                sealed_verif: record.sealed_verif,
                verification_token: *record.verification_token.as_bytes(),
            },
        );
        Ok(())
    }

    fn fetch_envelopes(&self, username: &str) -> PixvaultResult<(Envelope, Envelope)> {
        let accounts = self
            .accounts
            .lock()
            .map_err(|_| PixvaultError::Storage("account store poisoned".into()))?;
        let record = accounts
            .get(username)
            .ok_or_else(|| PixvaultError::Credential("invalid credentials".into()))?;
        Ok((record.sealed_master.clone(), record.sealed_verif.clone()))
    }

    fn verify_token(&self, username: &str, proof: &[u8]) -> PixvaultResult<String> {
        let accounts = self
            .accounts
            .lock()
            .map_err(|_| PixvaultError::Storage("account store poisoned".into()))?;
        let record = accounts
            .get(username)
            .ok_or_else(|| PixvaultError::Credential("invalid credentials".into()))?;

        if bool::from(record.verification_token.ct_eq(proof)) {
            Ok(issue_session_token())
        } else {
            Err(PixvaultError::Credential("invalid credentials".into()))
        }
    }
}

fn issue_session_token() -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use rand::RngCore;

    let mut raw = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut raw);
    URL_SAFE_NO_PAD.encode(raw)
}

/// In-memory object storage for tests and local development.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    blobs: Mutex<HashMap<(String, String), (PhotoMeta, Vec<u8>)>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ObjectStore for MemoryObjectStore {
    fn put(&self, meta: &PhotoMeta, blob: Vec<u8>) -> PixvaultResult<()> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| PixvaultError::Storage("object store poisoned".into()))?;
        blobs.insert(
            (meta.owner.clone(), meta.filename.clone()),
            (meta.clone(), blob),
        );
        Ok(())
    }

    fn get(&self, owner: &str, filename: &str) -> PixvaultResult<Vec<u8>> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|_| PixvaultError::Storage("object store poisoned".into()))?;
        blobs
            .get(&(owner.to_string(), filename.to_string()))
            .map(|(_, blob)| blob.clone())
            .ok_or_else(|| PixvaultError::Storage(format!("no such photo '{filename}'")))
    }

    fn list(&self, owner: &str) -> PixvaultResult<Vec<PhotoMeta>> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|_| PixvaultError::Storage("object store poisoned".into()))?;
        Ok(blobs
            .values()
            .filter(|(meta, _)| meta.owner == owner)
            .map(|(meta, _)| meta.clone())
            .collect())
    }

    fn delete(&self, owner: &str, filename: &str) -> PixvaultResult<()> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| PixvaultError::Storage("object store poisoned".into()))?;
        blobs
            .remove(&(owner.to_string(), filename.to_string()))
            .map(|_| ())
            .ok_or_else(|| PixvaultError::Storage(format!("no such photo '{filename}'")))
    }
}
