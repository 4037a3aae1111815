//! Value types for media state.

use std::fmt;
use std::str::FromStr;

use crate::errors::AssetError;

/// Length of a content hash in hex characters.
pub const CONTENT_HASH_LEN: usize = 12;

/// Identity of an uploaded media file: 12 lowercase hex characters.
///
/// All rendering variants of an asset (resolutions, poster frames) are
/// derived from this value by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct ContentHash(String);

impl ContentHash {
    /// Validate and wrap a hash string.
    pub fn parse(s: &str) -> Result<Self, AssetError> {
        let valid = s.len() == CONTENT_HASH_LEN
            && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(AssetError::InvalidHash {
                value: s.to_string(),
            })
        }
    }

    /// Hash from the leading bytes of a digest, rendered as lowercase hex.
    /// Digests shorter than six bytes are zero-padded.
    pub fn from_digest(digest: &[u8]) -> Self {
        let mut hex = String::with_capacity(CONTENT_HASH_LEN);
        for i in 0..CONTENT_HASH_LEN / 2 {
            let byte = digest.get(i).copied().unwrap_or(0);
            hex.push_str(&format!("{byte:02x}"));
        }
        Self(hex)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContentHash {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentHash {
    type Error = AssetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.0
    }
}

/// Kind of media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// File extension of the canonical asset.
    pub fn ext(self) -> &'static str {
        match self {
            Self::Image => "jpg",
            Self::Video => "mp4",
        }
    }

    /// Markup tag name.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Image => "img",
            Self::Video => "video",
        }
    }
}

/// Declarative cropping intent relative to sibling media in the same row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FitMode {
    /// No forced crop.
    #[default]
    None,
    /// Crop to the aspect of the reference sibling (item is too wide).
    TooWide,
    /// Crop to the aspect of the reference sibling (item is too tall).
    TooTall,
    /// Crop to a 1:1 cell.
    Square,
}

impl FitMode {
    /// Attribute value, or `None` for the default mode which is never persisted.
    pub fn as_attr(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::TooWide => Some("toowide"),
            Self::TooTall => Some("tootall"),
            Self::Square => Some("square"),
        }
    }

    /// Parse an attribute value. Unrecognized values map to the default.
    pub fn from_attr(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "toowide" => Self::TooWide,
            "tootall" => Self::TooTall,
            "square" => Self::Square,
            _ => Self::None,
        }
    }

    /// Next mode in the authoring cycle: none, toowide, tootall, square.
    pub fn next(self) -> Self {
        match self {
            Self::None => Self::TooWide,
            Self::TooWide => Self::TooTall,
            Self::TooTall => Self::Square,
            Self::Square => Self::None,
        }
    }

    /// Whether the mode needs a reference sibling to resolve.
    pub fn needs_reference(self) -> bool {
        matches!(self, Self::TooWide | Self::TooTall)
    }
}

/// Native pixel dimensions of a media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height, with non-positive sides treated as 1.
    pub fn aspect(&self) -> f64 {
        f64::from(self.width.max(1)) / f64::from(self.height.max(1))
    }
}

/// Rotation, zoom, and pan state of an image.
///
/// Fields are kept in range by construction: rotation in `[0, 360)`,
/// zoom in `[100, 200]`, pan in `[-50, 50]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "RawImageTransform")
)]
pub struct ImageTransform {
    rotate_degrees: u16,
    zoom_percent: u16,
    pan_x_percent: i16,
    pan_y_percent: i16,
}

impl ImageTransform {
    pub const DEFAULT_ROTATE: u16 = 0;
    pub const DEFAULT_ZOOM: u16 = 100;
    pub const DEFAULT_PAN: i16 = 0;
    pub const MIN_ZOOM: u16 = 100;
    pub const MAX_ZOOM: u16 = 200;
    pub const MAX_PAN: i16 = 50;

    /// Build a transform from raw values, normalizing each into range.
    pub fn new(rotate: i64, zoom: i64, pan_x: i64, pan_y: i64) -> Self {
        Self::default()
            .with_rotate(rotate)
            .with_zoom(zoom)
            .with_pan(pan_x, pan_y)
    }

    pub fn rotate_degrees(&self) -> u16 {
        self.rotate_degrees
    }

    pub fn zoom_percent(&self) -> u16 {
        self.zoom_percent
    }

    pub fn pan_x_percent(&self) -> i16 {
        self.pan_x_percent
    }

    pub fn pan_y_percent(&self) -> i16 {
        self.pan_y_percent
    }

    /// Set the rotation, wrapping modulo 360.
    pub fn with_rotate(mut self, degrees: i64) -> Self {
        self.rotate_degrees = degrees.rem_euclid(360) as u16;
        self
    }

    /// Set the zoom, clamped to `[100, 200]`.
    pub fn with_zoom(mut self, percent: i64) -> Self {
        self.zoom_percent =
            percent.clamp(i64::from(Self::MIN_ZOOM), i64::from(Self::MAX_ZOOM)) as u16;
        self
    }

    /// Set both pan offsets, each clamped to `[-50, 50]`.
    pub fn with_pan(mut self, x: i64, y: i64) -> Self {
        self.pan_x_percent = clamp_pan(x);
        self.pan_y_percent = clamp_pan(y);
        self
    }

    /// True when every field is at its default.
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

impl Default for ImageTransform {
    fn default() -> Self {
        Self {
            rotate_degrees: Self::DEFAULT_ROTATE,
            zoom_percent: Self::DEFAULT_ZOOM,
            pan_x_percent: Self::DEFAULT_PAN,
            pan_y_percent: Self::DEFAULT_PAN,
        }
    }
}

/// Unchecked transform fields as stored, normalized on conversion.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(default)]
struct RawImageTransform {
    rotate_degrees: i64,
    zoom_percent: i64,
    pan_x_percent: i64,
    pan_y_percent: i64,
}

#[cfg(feature = "serde")]
impl Default for RawImageTransform {
    fn default() -> Self {
        Self {
            rotate_degrees: ImageTransform::DEFAULT_ROTATE.into(),
            zoom_percent: ImageTransform::DEFAULT_ZOOM.into(),
            pan_x_percent: ImageTransform::DEFAULT_PAN.into(),
            pan_y_percent: ImageTransform::DEFAULT_PAN.into(),
        }
    }
}

#[cfg(feature = "serde")]
impl From<RawImageTransform> for ImageTransform {
    fn from(raw: RawImageTransform) -> Self {
        Self::new(raw.rotate_degrees, raw.zoom_percent, raw.pan_x_percent, raw.pan_y_percent)
    }
}

fn clamp_pan(value: i64) -> i16 {
    let limit = i64::from(ImageTransform::MAX_PAN);
    value.clamp(-limit, limit) as i16
}
