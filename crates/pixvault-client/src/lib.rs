//! pixvault-client: zero-knowledge credential flows for PixVault
//!
//! Signup generates a random master key and verification token, seals both
//! under a password-derived KEK, and hands the envelopes (plus the plaintext
//! verification token) to the account store. Signin re-derives the KEK from
//! the salt embedded in the fetched envelope, proves password knowledge by
//! decrypting the verification token, and recovers the master key for the
//! session. The password and KEK never leave the client.
//!
//! The account store and object storage are external collaborators reached
//! through the traits in [`store`]; in-memory implementations are provided
//! for tests and local development.

pub mod credentials;
pub mod photos;
pub mod session;
pub mod store;

pub use credentials::{login, register, CredentialManager, SignupRecord, VerifiedCredentials};
pub use photos::{delete_photo, download_photo, list_photos, upload_photo};
pub use session::Session;
pub use store::{AccountRecord, AccountStore, MemoryAccountStore, MemoryObjectStore, ObjectStore};
