use thiserror::Error;

pub type CryptoResult<T> = Result<T, CryptoError>;

/// Error taxonomy for the cryptographic core.
///
/// None of these are transient: every failure is either bad input or a
/// cryptographic proof that did not hold. Retrying without correcting the
/// input (or re-fetching an uncorrupted envelope) will fail identically.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Malformed input to a single call (wrong salt/key length, empty
    /// password, unparseable envelope). The caller must fix the input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The AEAD integrity check failed. Carries no detail; wrong key and
    /// tampered data are not distinguishable from the outside.
    #[error("authentication failure")]
    AuthenticationFailure,

    /// The envelope was sealed under different derivation parameters than
    /// this build supports. Handled by version negotiation, never by
    /// silently retrying with other costs.
    #[error("derivation parameters mismatch: sealed with m={sealed_m_cost_kib} t={sealed_t_cost} p={sealed_p_cost}")]
    ConfigurationMismatch {
        sealed_m_cost_kib: u32,
        sealed_t_cost: u32,
        sealed_p_cost: u32,
    },
}
