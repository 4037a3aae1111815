//! Core types for Folio documents.
//!
//! This crate provides the foundational types used across all other folio crates:
//! - Document tree (blocks, inline runs, media rows)
//! - Typed media state (content hashes, fit modes, image transforms)
//! - Edit commands with undo/redo over immutable snapshots
//! - Cursor and selection model
//! - Error types

pub mod ast;
pub mod cursor;
pub mod edit;
pub mod errors;
pub mod types;

pub use ast::*;
pub use cursor::*;
pub use edit::*;
pub use errors::*;
pub use types::*;
