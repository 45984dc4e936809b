use serde::{Deserialize, Serialize};

/// Metadata accompanying an encrypted photo blob.
///
/// The blob itself is opaque to the server; only this plaintext metadata is
/// visible for listing and ownership checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoMeta {
    /// Original filename (client-chosen; the server treats it as a label)
    pub filename: String,
    /// Owning account username
    pub owner: String,
    /// Declared content category
    pub content_type: ContentType,
    /// Size of the encrypted blob in bytes (includes framing overhead)
    pub encrypted_size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Image,
    Other,
}

/// Image extensions the client accepts for upload.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];

/// Classify a filename by extension, case-insensitively.
pub fn classify_filename(filename: &str) -> ContentType {
    let ext = filename.rsplit('.').next().unwrap_or("");
    if IMAGE_EXTENSIONS
        .iter()
        .any(|e| ext.eq_ignore_ascii_case(e))
    {
        ContentType::Image
    } else {
        ContentType::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_image_extensions() {
        assert_eq!(classify_filename("vacation.jpg"), ContentType::Image);
        assert_eq!(classify_filename("IMG_0042.PNG"), ContentType::Image);
        assert_eq!(classify_filename("anim.webp"), ContentType::Image);
    }

    #[test]
    fn test_classify_non_image() {
        assert_eq!(classify_filename("notes.txt"), ContentType::Other);
        assert_eq!(classify_filename("archive.tar.gz"), ContentType::Other);
        assert_eq!(classify_filename("no_extension"), ContentType::Other);
    }

    #[test]
    fn test_photo_meta_serde_roundtrip() {
        let meta = PhotoMeta {
            filename: "beach.png".into(),
            owner: "alice".into(),
            content_type: ContentType::Image,
            encrypted_size: 2048,
        };
        let json = serde_json::to_string(&meta).unwrap();
        let parsed: PhotoMeta = serde_json::from_str(&json).unwrap();
        assert_eq!(meta, parsed);
    }
}
