//! Edit commands over immutable document snapshots.
//!
//! Every command is a total reassignment of the state it touches. Applying a
//! command produces a new [`Document`] snapshot in an [`EditLog`], which
//! keeps earlier snapshots for undo and redo.

use std::sync::Arc;

use crate::ast::{Block, Document, MediaItem, MediaRow};
use crate::errors::EditError;
use crate::types::{ContentHash, Dimensions, FitMode, ImageTransform};

/// Address of a media item: block index and index within the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediaPosition {
    pub block: usize,
    pub index: usize,
}

impl MediaPosition {
    pub fn new(block: usize, index: usize) -> Self {
        Self { block, index }
    }
}

/// Where an inserted media item goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertTarget {
    /// Into an existing row, before `index` (equal to the row length appends).
    Row(MediaPosition),
    /// As a new single-item row before `block` (equal to the block count appends).
    NewRow { block: usize },
}

/// A document edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    InsertMedia { target: InsertTarget, item: MediaItem },
    /// Removing the last item of a row removes the row.
    RemoveMedia { at: MediaPosition },
    /// Split a row into two consecutive rows; `at` is the first index of the second row.
    SplitRow { block: usize, at: usize },
    SetFit { at: MediaPosition, fit: FitMode },
    Rotate { at: MediaPosition, degrees: i64 },
    Zoom { at: MediaPosition, percent: i64 },
    Pan { at: MediaPosition, x: i64, y: i64 },
    SetAlt { at: MediaPosition, alt: String },
    /// Fill in dimensions captured after ingestion. Allowed once.
    SetDimensions { at: MediaPosition, dimensions: Dimensions },
    /// Replace a pending placeholder with its committed asset id.
    CommitAsset { at: MediaPosition, asset_id: ContentHash },
}

/// Relative adjustments, resolved against the current state into a
/// total-reassignment [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nudge {
    /// none, toowide, tootall, square, none, ...
    CycleFit,
    /// Rotate by +90 degrees.
    QuarterTurn,
    RotateBy(i64),
    ZoomBy(i64),
    PanBy { dx: i64, dy: i64 },
}

impl Nudge {
    /// Resolve this nudge against `doc` into an absolute command.
    pub fn resolve(self, doc: &Document, at: MediaPosition) -> Result<Command, EditError> {
        let item = media_at(doc, at)?;
        if !matches!(self, Nudge::CycleFit) && !item.is_image() {
            return Err(EditError::NotAnImage {
                block: at.block,
                index: at.index,
            });
        }
        let t = item.transform;
        Ok(match self {
            Nudge::CycleFit => Command::SetFit {
                at,
                fit: item.fit.next(),
            },
            Nudge::QuarterTurn => Command::Rotate {
                at,
                degrees: rotated(t, 90),
            },
            Nudge::RotateBy(delta) => Command::Rotate {
                at,
                degrees: rotated(t, delta),
            },
            Nudge::ZoomBy(delta) => Command::Zoom {
                at,
                percent: i64::from(t.zoom_percent()).saturating_add(delta),
            },
            Nudge::PanBy { dx, dy } => Command::Pan {
                at,
                x: i64::from(t.pan_x_percent()).saturating_add(dx),
                y: i64::from(t.pan_y_percent()).saturating_add(dy),
            },
        })
    }
}

/// Rotation of `t` turned by `delta` degrees, reduced modulo 360.
fn rotated(t: ImageTransform, delta: i64) -> i64 {
    i64::from(t.rotate_degrees()) + delta.rem_euclid(360)
}

impl Command {
    /// Apply to a copy of `doc`, leaving `doc` untouched on error.
    pub fn apply_to(&self, doc: &Document) -> Result<Document, EditError> {
        let mut next = doc.clone();
        match self {
            Command::InsertMedia { target, item } => insert_media(&mut next, *target, item)?,
            Command::RemoveMedia { at } => {
                let row = row_mut(&mut next, at.block)?;
                if at.index >= row.items.len() {
                    return Err(no_media(*at));
                }
                row.items.remove(at.index);
                if row.items.is_empty() {
                    next.blocks.remove(at.block);
                }
            }
            Command::SplitRow { block, at } => {
                let row = row_mut(&mut next, *block)?;
                let len = row.items.len();
                if *at == 0 || *at >= len {
                    return Err(EditError::InvalidSplit { at: *at, len });
                }
                let tail: Vec<MediaItem> = row.items.drain(*at..).collect();
                if let Some(tail) = MediaRow::new(tail) {
                    next.blocks.insert(block + 1, Block::MediaRow(tail));
                }
            }
            Command::SetFit { at, fit } => media_mut(&mut next, *at)?.fit = *fit,
            Command::Rotate { at, degrees } => {
                let item = image_mut(&mut next, *at)?;
                item.transform = item.transform.with_rotate(*degrees);
            }
            Command::Zoom { at, percent } => {
                let item = image_mut(&mut next, *at)?;
                item.transform = item.transform.with_zoom(*percent);
            }
            Command::Pan { at, x, y } => {
                let item = image_mut(&mut next, *at)?;
                item.transform = item.transform.with_pan(*x, *y);
            }
            Command::SetAlt { at, alt } => media_mut(&mut next, *at)?.alt = alt.trim().to_string(),
            Command::SetDimensions { at, dimensions } => {
                let item = media_mut(&mut next, *at)?;
                if item.dimensions.is_some() {
                    return Err(EditError::DimensionsAlreadyKnown {
                        block: at.block,
                        index: at.index,
                    });
                }
                item.dimensions = Some(*dimensions);
            }
            Command::CommitAsset { at, asset_id } => {
                let item = media_mut(&mut next, *at)?;
                if !item.pending {
                    return Err(EditError::NotPending {
                        block: at.block,
                        index: at.index,
                    });
                }
                item.asset_id = asset_id.clone();
                item.pending = false;
                item.preview_ref = None;
            }
        }
        Ok(next)
    }
}

fn insert_media(doc: &mut Document, target: InsertTarget, item: &MediaItem) -> Result<(), EditError> {
    let mut item = item.clone();
    if !item.is_image() {
        item.transform = ImageTransform::default();
    }
    match target {
        InsertTarget::Row(at) => {
            let row = row_mut(doc, at.block)?;
            if at.index > row.items.len() {
                return Err(no_media(at));
            }
            row.items.insert(at.index, item);
        }
        InsertTarget::NewRow { block } => {
            if block > doc.blocks.len() {
                return Err(EditError::NoSuchBlock { block });
            }
            if let Some(row) = MediaRow::new([item]) {
                doc.blocks.insert(block, Block::MediaRow(row));
            }
        }
    }
    Ok(())
}

fn no_media(at: MediaPosition) -> EditError {
    EditError::NoSuchMedia {
        block: at.block,
        index: at.index,
    }
}

fn row_mut(doc: &mut Document, block: usize) -> Result<&mut MediaRow, EditError> {
    doc.blocks
        .get_mut(block)
        .ok_or(EditError::NoSuchBlock { block })?
        .as_media_row_mut()
        .ok_or(EditError::NotAMediaRow { block })
}

fn media_mut(doc: &mut Document, at: MediaPosition) -> Result<&mut MediaItem, EditError> {
    row_mut(doc, at.block)?
        .items
        .get_mut(at.index)
        .ok_or_else(|| no_media(at))
}

fn image_mut(doc: &mut Document, at: MediaPosition) -> Result<&mut MediaItem, EditError> {
    let item = media_mut(doc, at)?;
    if item.is_image() {
        Ok(item)
    } else {
        Err(EditError::NotAnImage {
            block: at.block,
            index: at.index,
        })
    }
}

/// Look up a media item by position.
pub fn media_at(doc: &Document, at: MediaPosition) -> Result<&MediaItem, EditError> {
    doc.blocks
        .get(at.block)
        .ok_or(EditError::NoSuchBlock { block: at.block })?
        .as_media_row()
        .ok_or(EditError::NotAMediaRow { block: at.block })?
        .items
        .get(at.index)
        .ok_or_else(|| no_media(at))
}

/// Versioned history of document snapshots.
#[derive(Debug, Clone)]
pub struct EditLog {
    snapshots: Vec<Arc<Document>>,
    current: usize,
}

impl EditLog {
    pub fn new(doc: Document) -> Self {
        Self {
            snapshots: vec![Arc::new(doc)],
            current: 0,
        }
    }

    /// The current snapshot.
    pub fn current(&self) -> &Arc<Document> {
        &self.snapshots[self.current]
    }

    /// Number of commands applied to reach the current snapshot.
    pub fn version(&self) -> usize {
        self.current
    }

    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current + 1 < self.snapshots.len()
    }

    /// Apply a command, discarding any redo history.
    pub fn apply(&mut self, command: Command) -> Result<&Arc<Document>, EditError> {
        let next = command.apply_to(self.current())?;
        log::debug!("applied {:?} at version {}", command, self.current);
        self.snapshots.truncate(self.current + 1);
        self.snapshots.push(Arc::new(next));
        self.current += 1;
        Ok(self.current())
    }

    /// Resolve a nudge against the current snapshot and apply it.
    pub fn nudge(&mut self, at: MediaPosition, nudge: Nudge) -> Result<&Arc<Document>, EditError> {
        let command = nudge.resolve(self.current(), at)?;
        self.apply(command)
    }

    pub fn undo(&mut self) -> Result<&Arc<Document>, EditError> {
        if !self.can_undo() {
            return Err(EditError::EmptyHistory { action: "undo" });
        }
        self.current -= 1;
        Ok(self.current())
    }

    pub fn redo(&mut self) -> Result<&Arc<Document>, EditError> {
        if !self.can_redo() {
            return Err(EditError::EmptyHistory { action: "redo" });
        }
        self.current += 1;
        Ok(self.current())
    }
}
