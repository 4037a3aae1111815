//! Layout computation for Folio documents.
//!
//! This crate turns a document's media rows into a render plan: a uniform
//! column grid per gallery and concrete crop/scale/translate geometry per
//! media item.
//!
//! # Architecture
//!
//! 1. **Row packing**: rows of unequal length share one grid through
//!    least-common-multiple column spans
//! 2. **Transform resolution**: fit mode, rotation, zoom and pan become
//!    container aspect, content scale and translation
//! 3. **Plan assembly**: geometry plus responsive asset renditions per cell
//!
//! # Example
//!
//! ```ignore
//! use folio_layout::{compute_plan, LayoutOptions};
//!
//! let doc = folio_markup::parse(source);
//! let plan = compute_plan(&doc, &LayoutOptions::default());
//! ```

mod grid;
mod plan;
mod transform;

pub use grid::{gcd, lcm, pack, pack_rows, Grid, Row};
pub use plan::{compute_plan, AssetVariant, Gallery, LayoutOptions, PlanBlock, PlanCell, PlanRow, RenderPlan};
pub use transform::{
    effective_aspect, reference_aspect, resolve, resolve_in_row, RenderGeometry, SOURCE_HEADROOM,
};
