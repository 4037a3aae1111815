//! Document tree types.
//!
//! A [`Document`] is a flat sequence of blocks. Blocks only nest through
//! lists (`List -> ListItem -> nested List`); media lives in [`MediaRow`]
//! blocks, and consecutive rows form one gallery run.

use smallvec::SmallVec;

use crate::types::{ContentHash, Dimensions, FitMode, ImageTransform, MediaKind};

/// A complete document.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Plain text of the first level-1 heading.
    pub fn title(&self) -> Option<String> {
        self.blocks.iter().find_map(|block| match block {
            Block::Heading(h) if h.level == 1 => Some(plain_text(&h.inline)),
            _ => None,
        })
    }

    /// Iterate over every media item with its block and row index.
    pub fn media(&self) -> impl Iterator<Item = (usize, usize, &MediaItem)> {
        self.blocks
            .iter()
            .enumerate()
            .filter_map(|(b, block)| match block {
                Block::MediaRow(row) => Some((b, row)),
                _ => None,
            })
            .flat_map(|(b, row)| row.items.iter().enumerate().map(move |(i, m)| (b, i, m)))
    }

    /// True if any media item is still addressed by a local preview.
    pub fn has_pending(&self) -> bool {
        self.media().any(|(_, _, m)| m.pending)
    }
}

/// A top-level block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Block {
    Heading(Heading),
    Paragraph(InlineRun),
    List(List),
    MediaRow(MediaRow),
}

impl Block {
    /// Paragraph holding a single text span.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph(vec![Inline::Text(text.into())])
    }

    /// Heading holding a single text span.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::Heading(Heading::new(level, vec![Inline::Text(text.into())]))
    }

    pub fn as_media_row(&self) -> Option<&MediaRow> {
        match self {
            Self::MediaRow(row) => Some(row),
            _ => None,
        }
    }

    pub fn as_media_row_mut(&mut self) -> Option<&mut MediaRow> {
        match self {
            Self::MediaRow(row) => Some(row),
            _ => None,
        }
    }
}

/// Heading block with a level in `1..=6`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Heading {
    pub level: u8,
    pub inline: InlineRun,
}

impl Heading {
    /// Create a heading, clamping the level into `1..=6`.
    pub fn new(level: u8, inline: InlineRun) -> Self {
        Self {
            level: level.clamp(1, 6),
            inline,
        }
    }
}

/// Unordered list.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct List {
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListItem {
    pub inline: InlineRun,
    pub nested: Option<List>,
}

impl ListItem {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            inline: vec![Inline::Text(text.into())],
            nested: None,
        }
    }
}

/// Ordered inline spans of a text block.
pub type InlineRun = Vec<Inline>;

/// Inline span.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Inline {
    Text(String),
    Link { href: String, children: InlineRun },
    Bold { children: InlineRun },
    Italic { children: InlineRun },
}

impl Inline {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

/// Concatenated text content of an inline run.
pub fn plain_text(run: &[Inline]) -> String {
    let mut out = String::new();
    collect_text(run, &mut out);
    out
}

fn collect_text(run: &[Inline], out: &mut String) {
    for span in run {
        match span {
            Inline::Text(t) => out.push_str(t),
            Inline::Link { children, .. }
            | Inline::Bold { children }
            | Inline::Italic { children } => collect_text(children, out),
        }
    }
}

/// A horizontally packed run of media. Never empty.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediaRow {
    pub items: SmallVec<[MediaItem; 4]>,
}

impl MediaRow {
    /// Create a row, or `None` if `items` is empty.
    pub fn new(items: impl IntoIterator<Item = MediaItem>) -> Option<Self> {
        let items: SmallVec<[MediaItem; 4]> = items.into_iter().collect();
        if items.is_empty() {
            None
        } else {
            Some(Self { items })
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// An image or video placed in a row.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediaItem {
    pub kind: MediaKind,
    pub asset_id: ContentHash,
    /// Empty means absent.
    pub alt: String,
    /// Unknown until captured after ingestion.
    pub dimensions: Option<Dimensions>,
    /// Video only.
    pub duration_seconds: Option<f64>,
    pub fit: FitMode,
    /// Image only; always the default for videos.
    pub transform: ImageTransform,
    /// Asset is shown from a local preview and not yet committed.
    pub pending: bool,
    /// Local preview reference (`data:` or `blob:` URL) while pending.
    pub preview_ref: Option<String>,
}

impl MediaItem {
    pub fn new(kind: MediaKind, asset_id: ContentHash) -> Self {
        Self {
            kind,
            asset_id,
            alt: String::new(),
            dimensions: None,
            duration_seconds: None,
            fit: FitMode::None,
            transform: ImageTransform::default(),
            pending: false,
            preview_ref: None,
        }
    }

    pub fn image(asset_id: ContentHash) -> Self {
        Self::new(MediaKind::Image, asset_id)
    }

    pub fn video(asset_id: ContentHash) -> Self {
        Self::new(MediaKind::Video, asset_id)
    }

    pub fn is_image(&self) -> bool {
        self.kind == MediaKind::Image
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = alt.into();
        self
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Some(Dimensions::new(width, height));
        self
    }

    pub fn with_fit(mut self, fit: FitMode) -> Self {
        self.fit = fit;
        self
    }

    /// Set the image transform. Ignored for videos.
    pub fn with_transform(mut self, transform: ImageTransform) -> Self {
        if self.is_image() {
            self.transform = transform;
        }
        self
    }

    /// Set the duration. Ignored for images.
    pub fn with_duration(mut self, seconds: f64) -> Self {
        if !self.is_image() {
            self.duration_seconds = Some(seconds);
        }
        self
    }

    /// Mark the item as previewed from a local reference.
    pub fn with_preview(mut self, preview_ref: impl Into<String>) -> Self {
        self.pending = true;
        self.preview_ref = Some(preview_ref.into());
        self
    }

    /// Intrinsic aspect ratio, 1 when dimensions are unknown.
    pub fn aspect(&self) -> f64 {
        self.dimensions.map_or(1.0, |d| d.aspect())
    }
}
