//! Session context: the unsealed master key for the lifetime of one signin
//!
//! Created on verify success, destroyed on logout. Replaces ambient global
//! state: callers thread the session explicitly into file-cipher calls, and
//! dropping it zeroizes the master key.

use pixvault_crypto::filebox::MasterKey;
use secrecy::SecretString;

/// An authenticated session.
pub struct Session {
    username: String,
    master_key: MasterKey,
    /// Opaque session credential issued by the account store.
    token: SecretString,
}

impl Session {
    pub fn new(username: String, master_key: MasterKey, token: String) -> Self {
        Self {
            username,
            master_key,
            token: SecretString::from(token),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn master_key(&self) -> &MasterKey {
        &self.master_key
    }

    pub fn token(&self) -> &SecretString {
        &self.token
    }

    /// End the session. Consumes the context; the master key and token are
    /// zeroized as the fields drop.
    pub fn logout(self) {
        tracing::info!(username = %self.username, "session ended");
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("master_key", &"[REDACTED]")
            .field("token", &"[REDACTED]")
            .finish()
    }
}
