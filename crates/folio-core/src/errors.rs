//! Error types for Folio.

use thiserror::Error;

/// Errors constructing asset identities.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Invalid content hash '{value}': expected 12 lowercase hex characters")]
    InvalidHash { value: String },
}

/// Errors applying an edit command to a document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("No block at index {block}")]
    NoSuchBlock { block: usize },

    #[error("Block {block} is not a media row")]
    NotAMediaRow { block: usize },

    #[error("No media item at index {index} in block {block}")]
    NoSuchMedia { block: usize, index: usize },

    #[error("Media item {index} in block {block} is a video; transforms apply to images only")]
    NotAnImage { block: usize, index: usize },

    #[error("Media item {index} in block {block} already has dimensions")]
    DimensionsAlreadyKnown { block: usize, index: usize },

    #[error("Media item {index} in block {block} is not pending")]
    NotPending { block: usize, index: usize },

    #[error("Cannot split row at {at}: row has {len} items")]
    InvalidSplit { at: usize, len: usize },

    #[error("Nothing to {action}")]
    EmptyHistory { action: &'static str },
}

/// Errors loading or saving persisted documents.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path escapes the store root: {path}")]
    PathNotAllowed { path: String },

    #[error("Only index.html pages can be stored: {path}")]
    UnsupportedPath { path: String },
}
