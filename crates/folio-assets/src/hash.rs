//! Content hashing and ingestion.

use sha2::{Digest, Sha256};

use folio_core::{ContentHash, MediaItem, MediaKind};

/// Hash file contents: the first 12 hex characters of their SHA-256 digest.
pub fn hash_bytes(bytes: &[u8]) -> ContentHash {
    ContentHash::from_digest(&Sha256::digest(bytes))
}

/// Create a pending media item for a freshly ingested file.
///
/// The item is shown from `preview_ref` with unknown dimensions until the
/// caller fills them in and commits the asset.
pub fn ingest(kind: MediaKind, asset_id: ContentHash, preview_ref: impl Into<String>) -> MediaItem {
    let preview_ref = preview_ref.into();
    log::debug!("ingesting {kind:?} {asset_id} from local preview");
    MediaItem::new(kind, asset_id).with_preview(preview_ref)
}

/// Media kind for a MIME type, if it is one Folio can show.
pub fn kind_for_mime(mime: &str) -> Option<MediaKind> {
    let category = mime.split('/').next()?.trim().to_ascii_lowercase();
    match category.as_str() {
        "image" => Some(MediaKind::Image),
        "video" => Some(MediaKind::Video),
        _ => None,
    }
}

/// Media kind for a file extension, if it is one Folio can show.
pub fn kind_for_extension(ext: &str) -> Option<MediaKind> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" | "png" | "gif" | "webp" | "avif" | "heic" => Some(MediaKind::Image),
        "mp4" | "mov" | "webm" | "m4v" => Some(MediaKind::Video),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_bytes() {
        // sha256("") = e3b0c44298fc1c149afbf4c8996fb924...
        assert_eq!(hash_bytes(b"").as_str(), "e3b0c44298fc");
        // sha256("abc") = ba7816bf8f01cfea414140de5dae2223...
        assert_eq!(hash_bytes(b"abc").as_str(), "ba7816bf8f01");
    }

    #[test]
    fn test_ingest_is_pending() {
        let item = ingest(MediaKind::Image, hash_bytes(b"abc"), "blob:local/1");
        assert!(item.pending);
        assert_eq!(item.dimensions, None);
        assert_eq!(item.preview_ref.as_deref(), Some("blob:local/1"));
    }

    #[test]
    fn test_kind_for_mime() {
        assert_eq!(kind_for_mime("image/jpeg"), Some(MediaKind::Image));
        assert_eq!(kind_for_mime("Video/mp4"), Some(MediaKind::Video));
        assert_eq!(kind_for_mime("text/plain"), None);
    }

    #[test]
    fn test_kind_for_extension() {
        assert_eq!(kind_for_extension("JPG"), Some(MediaKind::Image));
        assert_eq!(kind_for_extension("mov"), Some(MediaKind::Video));
        assert_eq!(kind_for_extension("txt"), None);
    }
}
