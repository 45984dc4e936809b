//! Signup / signin credential orchestration
//!
//! Owns the associated-data binding scheme: every credential envelope is
//! bound to `(secret kind, username, protocol version)` so that envelopes
//! cannot be swapped between users or between the master-key and
//! verification-token slots.

use secrecy::SecretString;
use zeroize::Zeroize;

use pixvault_core::{PixvaultError, PixvaultResult};
use pixvault_crypto::kdf::generate_salt;
use pixvault_crypto::{
    derive_kek, open, seal, CryptoError, CryptoResult, Envelope, KdfParams, KEY_SIZE, SALT_SIZE,
};
use pixvault_crypto::filebox::MasterKey;

use crate::session::Session;
use crate::store::AccountStore;

/// Protocol version baked into every AAD string.
const PROTOCOL_VERSION: &str = "v1";

/// Which of the two sealed secrets an envelope holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SecretKind {
    MasterKey,
    VerificationToken,
}

impl SecretKind {
    fn prefix(self) -> &'static str {
        match self {
            SecretKind::MasterKey => "mk",
            SecretKind::VerificationToken => "vt",
        }
    }
}

/// AAD for one envelope: `"<kind>:<username>:<version>"`.
fn binding_aad(kind: SecretKind, username: &str) -> String {
    format!("{}:{username}:{PROTOCOL_VERSION}", kind.prefix())
}

/// The 256-bit secret that proves password knowledge to the server.
///
/// The server receives this value in the clear at signup and stores it as
/// its equality-check secret. That is the protocol's deliberate trust
/// boundary, not a leak: the token reveals nothing about the master key.
#[derive(Clone)]
pub struct VerificationToken {
    bytes: [u8; KEY_SIZE],
}

impl VerificationToken {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    fn generate() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }
}

impl Drop for VerificationToken {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for VerificationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationToken")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Everything signup produces for the account store.
#[derive(Debug)]
pub struct SignupRecord {
    pub sealed_master: Envelope,
    pub sealed_verif: Envelope,
    /// Plaintext verification token for the server's equality check.
    pub verification_token: VerificationToken,
}

/// A successful verification: the recovered master key plus the proof to
/// present to the server.
#[derive(Debug)]
pub struct VerifiedCredentials {
    pub master_key: MasterKey,
    pub proof: VerificationToken,
}

/// Orchestrates KDF + envelope codec for the signup/signin flows.
#[derive(Debug, Clone, Default)]
pub struct CredentialManager {
    params: KdfParams,
}

impl CredentialManager {
    pub fn new(params: KdfParams) -> Self {
        Self { params }
    }

    /// Generate and seal the account secrets for a new user.
    ///
    /// One salt is drawn per signup and shared by both envelopes, so a later
    /// signin opens both with a single derivation. The KEK lives only for
    /// the duration of this call.
    pub fn signup(&self, username: &str, password: &SecretString) -> CryptoResult<SignupRecord> {
        if username.is_empty() {
            return Err(CryptoError::InvalidInput("username must not be empty".into()));
        }

        let master_key = MasterKey::generate();
        let verification_token = VerificationToken::generate();
        let salt = generate_salt();

        let kek = derive_kek(password, &salt, &self.params)?;

        let sealed_master = seal(
            &kek,
            master_key.as_bytes(),
            &binding_aad(SecretKind::MasterKey, username),
            &salt,
            &self.params,
        )?;
        let sealed_verif = seal(
            &kek,
            verification_token.as_bytes(),
            &binding_aad(SecretKind::VerificationToken, username),
            &salt,
            &self.params,
        )?;

        tracing::debug!(username, "sealed account secrets");

        Ok(SignupRecord {
            sealed_master,
            sealed_verif,
            verification_token,
        })
    }

    /// Prove password knowledge and recover the master key.
    ///
    /// Any integrity rejection is the uniform `AuthenticationFailure`; the
    /// caller surfaces it as "invalid credentials" without distinguishing
    /// wrong password from tampered envelope. A cost-parameter drift between
    /// seal time and now is reported as `ConfigurationMismatch` before any
    /// derivation work.
    pub fn verify(
        &self,
        username: &str,
        password: &SecretString,
        sealed_verif: &Envelope,
        sealed_master: &Envelope,
    ) -> CryptoResult<VerifiedCredentials> {
        if sealed_verif.kdf != self.params {
            return Err(CryptoError::ConfigurationMismatch {
                sealed_m_cost_kib: sealed_verif.kdf.mem_cost_kib,
                sealed_t_cost: sealed_verif.kdf.time_cost,
                sealed_p_cost: sealed_verif.kdf.parallelism,
            });
        }

        let salt = sealed_verif.salt_bytes()?;
        let kek = derive_kek(password, &salt, &self.params)?;

        let verif_plain = open(
            &kek,
            sealed_verif,
            &binding_aad(SecretKind::VerificationToken, username),
        )?;
        let proof = VerificationToken::from_bytes(to_key_array(&verif_plain)?);

        let master_plain = open(
            &kek,
            sealed_master,
            &binding_aad(SecretKind::MasterKey, username),
        )?;
        let master_key = MasterKey::from_bytes(to_key_array(&master_plain)?);

        tracing::debug!(username, "credential verification succeeded");

        Ok(VerifiedCredentials { master_key, proof })
    }

    /// Run a derivation against a fixed salt and discard the result.
    ///
    /// Signin burns the same KDF cost whether or not the username exists,
    /// so response time does not reveal which failure occurred.
    pub(crate) fn decoy_derive(&self, password: &SecretString) {
        let _ = derive_kek(password, &[0u8; SALT_SIZE], &self.params);
    }
}

fn to_key_array(plaintext: &[u8]) -> CryptoResult<[u8; KEY_SIZE]> {
    plaintext.try_into().map_err(|_| {
        CryptoError::InvalidInput(format!(
            "unsealed secret has wrong size: {} bytes (expected {KEY_SIZE})",
            plaintext.len()
        ))
    })
}

/// Full signup flow: seal the secrets and persist them via the account store.
pub fn register(
    manager: &CredentialManager,
    store: &dyn AccountStore,
    username: &str,
    email: &str,
    password: &SecretString,
) -> PixvaultResult<()> {
    let record = manager
        .signup(username, password)
        .map_err(|e| PixvaultError::Credential(e.to_string()))?;
    store.create_account(username, email, record)?;
    tracing::info!(username, "account registered");
    Ok(())
}

/// Full signin flow: fetch, verify, present the proof, build a session.
///
/// Unknown username, wrong password, and corrupted envelopes all collapse
/// into the same "invalid credentials" error (anti-enumeration).
pub fn login(
    manager: &CredentialManager,
    store: &dyn AccountStore,
    username: &str,
    password: &SecretString,
) -> PixvaultResult<Session> {
    let invalid = || PixvaultError::Credential("invalid credentials".into());

    let (sealed_master, sealed_verif) = match store.fetch_envelopes(username) {
        Ok(envelopes) => envelopes,
        Err(_) => {
            manager.decoy_derive(password);
            return Err(invalid());
        }
    };

    let verified = manager
        .verify(username, password, &sealed_verif, &sealed_master)
        .map_err(|e| match e {
            // ConfigurationMismatch keeps its own message; only failed
            // proofs collapse into the uniform error
            CryptoError::ConfigurationMismatch { .. } => PixvaultError::Credential(e.to_string()),
            _ => invalid(),
        })?;

    let token = store
        .verify_token(username, verified.proof.as_bytes())
        .map_err(|_| invalid())?;

    tracing::info!(username, "signin succeeded");

    Ok(Session::new(username.to_string(), verified.master_key, token))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_manager() -> CredentialManager {
        CredentialManager::new(KdfParams {
            mem_cost_kib: 1024,
            time_cost: 1,
            parallelism: 1,
        })
    }

    #[test]
    fn test_signup_verify_roundtrip() {
        let manager = fast_manager();
        let password = SecretString::from("correct-horse-battery-staple");

        let record = manager.signup("alice", &password).unwrap();
        let verified = manager
            .verify("alice", &password, &record.sealed_verif, &record.sealed_master)
            .unwrap();

        assert_eq!(
            verified.proof.as_bytes(),
            record.verification_token.as_bytes(),
            "recovered token must match the one captured at signup"
        );
    }

    #[test]
    fn test_verify_wrong_password() {
        let manager = fast_manager();
        let record = manager
            .signup("alice", &SecretString::from("correct-horse-battery-staple"))
            .unwrap();

        let result = manager.verify(
            "alice",
            &SecretString::from("wrong-password"),
            &record.sealed_verif,
            &record.sealed_master,
        );
        assert!(matches!(result, Err(CryptoError::AuthenticationFailure)));
    }

    #[test]
    fn test_verify_wrong_username() {
        let manager = fast_manager();
        let password = SecretString::from("pw-for-alice");
        let record = manager.signup("alice", &password).unwrap();

        // Envelope sealed for alice must not open under bob's binding
        let result = manager.verify("bob", &password, &record.sealed_verif, &record.sealed_master);
        assert!(matches!(result, Err(CryptoError::AuthenticationFailure)));
    }

    #[test]
    fn test_envelopes_not_swappable() {
        let manager = fast_manager();
        let password = SecretString::from("a-password");
        let record = manager.signup("alice", &password).unwrap();

        // Master-key envelope in the verification-token slot and vice versa
        let result = manager.verify("alice", &password, &record.sealed_master, &record.sealed_verif);
        assert!(matches!(result, Err(CryptoError::AuthenticationFailure)));
    }

    #[test]
    fn test_verify_params_mismatch() {
        let manager = fast_manager();
        let password = SecretString::from("a-password");
        let record = manager.signup("alice", &password).unwrap();

        let other = CredentialManager::new(KdfParams {
            mem_cost_kib: 2048,
            time_cost: 1,
            parallelism: 1,
        });
        let result = other.verify("alice", &password, &record.sealed_verif, &record.sealed_master);
        assert!(matches!(result, Err(CryptoError::ConfigurationMismatch { .. })));
    }

    #[test]
    fn test_signup_empty_username() {
        let result = fast_manager().signup("", &SecretString::from("pw"));
        assert!(matches!(result, Err(CryptoError::InvalidInput(_))));
    }

    #[test]
    fn test_signup_shared_salt() {
        let record = fast_manager()
            .signup("alice", &SecretString::from("pw"))
            .unwrap();
        assert_eq!(
            record.sealed_master.salt, record.sealed_verif.salt,
            "both envelopes of one sealing event share the salt"
        );
    }

    #[test]
    fn test_signup_distinct_secrets() {
        let record = fast_manager()
            .signup("alice", &SecretString::from("pw"))
            .unwrap();
        assert_ne!(
            record.sealed_master.ciphertext, record.sealed_verif.ciphertext,
            "master key and verification token are independent secrets"
        );
    }

    #[test]
    fn test_binding_aad_shape() {
        assert_eq!(binding_aad(SecretKind::MasterKey, "alice"), "mk:alice:v1");
        assert_eq!(
            binding_aad(SecretKind::VerificationToken, "alice"),
            "vt:alice:v1"
        );
    }
}
