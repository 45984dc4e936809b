//! Photo upload/download orchestration: encrypt-then-store, fetch-then-decrypt
//!
//! The object store only ever sees the opaque blob plus plaintext metadata
//! (filename, owner). The master key comes from the session and never
//! touches the KDF or the password.

use pixvault_core::types::{classify_filename, ContentType, PhotoMeta};
use pixvault_core::{PixvaultError, PixvaultResult};
use pixvault_crypto::{decrypt_file, encrypt_file};

use crate::session::Session;
use crate::store::ObjectStore;

/// Encrypt a photo with the session's master key and hand it to storage.
///
/// Rejects non-image filenames up front, matching the service's upload
/// policy.
pub fn upload_photo(
    session: &Session,
    store: &dyn ObjectStore,
    filename: &str,
    plaintext: &[u8],
) -> PixvaultResult<PhotoMeta> {
    if classify_filename(filename) != ContentType::Image {
        return Err(PixvaultError::Storage(format!(
            "'{filename}' is not a supported image type"
        )));
    }

    let blob = encrypt_file(session.master_key(), plaintext)
        .map_err(|e| PixvaultError::Storage(e.to_string()))?;

    let meta = PhotoMeta {
        filename: filename.to_string(),
        owner: session.username().to_string(),
        content_type: ContentType::Image,
        encrypted_size: blob.len() as u64,
    };
    store.put(&meta, blob)?;

    tracing::debug!(
        owner = %meta.owner,
        filename = %meta.filename,
        encrypted_size = meta.encrypted_size,
        "photo uploaded"
    );

    Ok(meta)
}

/// Fetch a photo blob and decrypt it with the session's master key.
///
/// A tag mismatch surfaces as a generic "corrupted file" error; the caller
/// must not retry with the same blob.
pub fn download_photo(
    session: &Session,
    store: &dyn ObjectStore,
    filename: &str,
) -> PixvaultResult<Vec<u8>> {
    let blob = store.get(session.username(), filename)?;

    let plaintext = decrypt_file(session.master_key(), &blob)
        .map_err(|_| PixvaultError::Storage(format!("corrupted file '{filename}'")))?;

    tracing::debug!(
        owner = %session.username(),
        filename,
        size = plaintext.len(),
        "photo downloaded"
    );

    Ok(plaintext)
}

/// List the session owner's photo metadata.
pub fn list_photos(session: &Session, store: &dyn ObjectStore) -> PixvaultResult<Vec<PhotoMeta>> {
    store.list(session.username())
}

/// Remove a photo from storage. Fails if no such photo exists for the
/// session owner.
pub fn delete_photo(
    session: &Session,
    store: &dyn ObjectStore,
    filename: &str,
) -> PixvaultResult<()> {
    store.delete(session.username(), filename)?;

    tracing::debug!(
        owner = %session.username(),
        filename,
        "photo deleted"
    );

    Ok(())
}
