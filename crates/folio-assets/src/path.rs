//! Recognizing and building asset paths.

use std::sync::OnceLock;

use regex::Regex;

use folio_core::{ContentHash, MediaKind};

/// Directory holding all assets, relative to the page.
pub const ASSET_DIR: &str = "assets";

fn asset_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:^|/)assets/([a-f0-9]{12})(?:-([a-z0-9]+))?\.(jpg|mp4)(?:\?.*)?$")
            .expect("asset path pattern is valid")
    })
}

/// An asset reference found in a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPath {
    pub id: ContentHash,
    /// Rendition suffix such as `800`, `540p`, or `poster`.
    pub variant: Option<String>,
    pub kind: MediaKind,
}

impl AssetPath {
    /// Find an asset path in `url`.
    ///
    /// Accepts absolute URLs, relative prefixes such as `../`, rendition
    /// suffixes, and trailing query strings. Local previews never match.
    pub fn find(url: &str) -> Option<Self> {
        if is_local_preview(url) {
            return None;
        }
        let caps = asset_pattern().captures(url.trim())?;
        let id = ContentHash::parse(caps.get(1)?.as_str()).ok()?;
        let variant = caps.get(2).map(|m| m.as_str().to_string());
        let kind = match caps.get(3)?.as_str() {
            "mp4" => MediaKind::Video,
            _ => MediaKind::Image,
        };
        Some(Self { id, variant, kind })
    }

    /// Canonical path of the underlying asset, without rendition suffix.
    ///
    /// A poster frame is a still, so its canonical form stays the poster path.
    pub fn canonical(&self) -> String {
        match self.variant.as_deref() {
            Some("poster") => poster_path(&self.id),
            _ => canonical_path(&self.id, self.kind),
        }
    }
}

/// `assets/<hash>.jpg` or `assets/<hash>.mp4`.
pub fn canonical_path(id: &ContentHash, kind: MediaKind) -> String {
    format!("{ASSET_DIR}/{id}.{}", kind.ext())
}

/// `assets/<hash>-<suffix>.<ext>`.
pub fn variant_path(id: &ContentHash, suffix: &str, kind: MediaKind) -> String {
    format!("{ASSET_DIR}/{id}-{suffix}.{}", kind.ext())
}

/// `assets/<hash>-poster.jpg`.
pub fn poster_path(id: &ContentHash) -> String {
    variant_path(id, "poster", MediaKind::Image)
}

/// True for `data:` and `blob:` URLs shown while an upload is pending.
pub fn is_local_preview(url: &str) -> bool {
    let url = url.trim_start();
    url.starts_with("data:") || url.starts_with("blob:")
}
