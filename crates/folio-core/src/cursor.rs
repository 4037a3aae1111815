//! Cursor and selection model.
//!
//! A cursor is a block index plus an offset inside that block. In text
//! blocks the offset counts characters of the block's plain text; in media
//! rows it counts item boundaries, so offset `i` sits just before item `i`.

use crate::ast::{plain_text, Block, Document};
use crate::edit::MediaPosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cursor {
    pub block: usize,
    pub offset: usize,
}

impl Cursor {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }

    /// Clamp to a valid position in `doc`, or `None` if the document is empty.
    pub fn clamp(self, doc: &Document) -> Option<Self> {
        let last = doc.blocks.len().checked_sub(1)?;
        let block = self.block.min(last);
        let len = block_len(&doc.blocks[block]);
        Some(Self::new(block, self.offset.min(len)))
    }
}

/// Number of cursor positions after the start of a block.
fn block_len(block: &Block) -> usize {
    match block {
        Block::Heading(h) => plain_text(&h.inline).chars().count(),
        Block::Paragraph(inline) => plain_text(inline).chars().count(),
        Block::List(list) => list
            .items
            .iter()
            .map(|item| plain_text(&item.inline).chars().count())
            .sum(),
        Block::MediaRow(row) => row.len(),
    }
}

/// A selection from `anchor` to `focus`, in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    pub anchor: Cursor,
    pub focus: Cursor,
}

impl Selection {
    pub fn new(anchor: Cursor, focus: Cursor) -> Self {
        Self { anchor, focus }
    }

    /// Selection spanning exactly the media item at `at`.
    pub fn media(at: MediaPosition) -> Self {
        Self::new(
            Cursor::new(at.block, at.index),
            Cursor::new(at.block, at.index.saturating_add(1)),
        )
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Start and end in document order.
    pub fn ordered(&self) -> (Cursor, Cursor) {
        if self.anchor <= self.focus {
            (self.anchor, self.focus)
        } else {
            (self.focus, self.anchor)
        }
    }

    /// The media item covered by this selection, if it spans exactly one
    /// item of a single media row.
    pub fn selected_media(&self, doc: &Document) -> Option<MediaPosition> {
        let (start, end) = self.ordered();
        if start.block != end.block || Some(end.offset) != start.offset.checked_add(1) {
            return None;
        }
        let row = doc.blocks.get(start.block)?.as_media_row()?;
        (start.offset < row.len()).then(|| MediaPosition::new(start.block, start.offset))
    }

    /// Like [`selected_media`](Self::selected_media), restricted to images.
    pub fn selected_image(&self, doc: &Document) -> Option<MediaPosition> {
        let at = self.selected_media(doc)?;
        let row = doc.blocks[at.block].as_media_row()?;
        row.items[at.index].is_image().then_some(at)
    }
}
