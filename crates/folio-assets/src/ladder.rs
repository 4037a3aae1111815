//! Responsive rendition selection.
//!
//! Renditions are produced externally at fixed sizes; these functions only
//! choose among them and are total over any display width.

use folio_core::{ContentHash, MediaKind};

use crate::path::{poster_path, variant_path};

/// Precomputed image widths in pixels.
pub const IMAGE_LADDER: [u32; 4] = [400, 800, 1600, 2400];

/// Rung used as the plain `src` fallback.
pub const DEFAULT_IMAGE_RUNG: u32 = 800;

/// Rung linked from an image for full-size viewing.
pub const FULL_SIZE_RUNG: u32 = 2400;

/// Precomputed video heights, smallest first.
pub const VIDEO_LADDER: [u32; 2] = [360, 540];

/// Display widths strictly above this select the larger video rendition.
pub const VIDEO_WIDTH_THRESHOLD: f64 = 400.0;

/// One `srcset` candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SrcsetEntry {
    pub url: String,
    pub width: u32,
}

/// Image rendition set for one display slot.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageVariant {
    pub src: String,
    pub srcset: Vec<SrcsetEntry>,
    /// Display width hint for the `sizes` attribute.
    pub sizes_px: u32,
    pub full_size_href: String,
}

impl ImageVariant {
    /// `srcset` attribute value.
    pub fn srcset_attr(&self) -> String {
        self.srcset
            .iter()
            .map(|e| format!("{} {}w", e.url, e.width))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `sizes` attribute value.
    pub fn sizes_attr(&self) -> String {
        format!("{}px", self.sizes_px)
    }
}

/// Video rendition for one display slot.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VideoVariant {
    pub src: String,
    pub poster: String,
    pub height: u32,
}

/// Smallest ladder rung at least `width` pixels wide, else the largest rung.
pub fn nearest_image_rung(width: f64) -> u32 {
    IMAGE_LADDER
        .iter()
        .copied()
        .find(|&rung| f64::from(rung) >= width)
        .unwrap_or(FULL_SIZE_RUNG)
}

/// Image renditions for a slot `display_width_px` wide.
///
/// The final choice among rungs is left to the rendering surface through
/// `srcset` and `sizes`.
pub fn select_image_variant(id: &ContentHash, display_width_px: f64) -> ImageVariant {
    let srcset = IMAGE_LADDER
        .iter()
        .map(|&width| SrcsetEntry {
            url: variant_path(id, &width.to_string(), MediaKind::Image),
            width,
        })
        .collect();
    ImageVariant {
        src: variant_path(id, &DEFAULT_IMAGE_RUNG.to_string(), MediaKind::Image),
        srcset,
        sizes_px: width_hint(display_width_px),
        full_size_href: variant_path(id, &FULL_SIZE_RUNG.to_string(), MediaKind::Image),
    }
}

/// Video rendition for a slot `display_width_px` wide.
pub fn select_video_variant(id: &ContentHash, display_width_px: f64) -> VideoVariant {
    let height = if display_width_px > VIDEO_WIDTH_THRESHOLD {
        VIDEO_LADDER[1]
    } else {
        VIDEO_LADDER[0]
    };
    VideoVariant {
        src: variant_path(id, &format!("{height}p"), MediaKind::Video),
        poster: poster_path(id),
        height,
    }
}

fn width_hint(width: f64) -> u32 {
    if width.is_finite() && width > 0.0 {
        width.round().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}
