//! Asset handling for Folio.
//!
//! Every media file is addressed by its [`ContentHash`](folio_core::ContentHash);
//! all renditions are derived from it by name:
//!
//! ```text
//! assets/<hash>.jpg            canonical image
//! assets/<hash>-<width>.jpg    image rendition (400, 800, 1600, 2400)
//! assets/<hash>.mp4            canonical video
//! assets/<hash>-<height>p.mp4  video rendition (360p, 540p)
//! assets/<hash>-poster.jpg     video poster frame
//! ```

pub mod hash;
pub mod ladder;
pub mod path;

pub use hash::{hash_bytes, ingest, kind_for_extension, kind_for_mime};
pub use ladder::{
    nearest_image_rung, select_image_variant, select_video_variant, ImageVariant, SrcsetEntry,
    VideoVariant, IMAGE_LADDER, VIDEO_WIDTH_THRESHOLD,
};
pub use path::{
    canonical_path, is_local_preview, poster_path, variant_path, AssetPath, ASSET_DIR,
};
