//! Render plan assembly.

use folio_assets::{select_image_variant, select_video_variant, ImageVariant, VideoVariant};
use folio_core::{Block, Document, MediaKind, MediaPosition, MediaRow};

use crate::grid::pack_rows;
use crate::transform::{resolve_in_row, RenderGeometry};

/// Options for plan computation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct LayoutOptions {
    /// Maximum width of the content column in CSS pixels
    pub container_max_px: f64,
    /// Width of the viewport, when known; narrows video selection
    pub viewport_width_px: Option<f64>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            container_max_px: 1000.0,
            viewport_width_px: None,
        }
    }
}

impl LayoutOptions {
    fn container_px(&self) -> f64 {
        if self.container_max_px.is_finite() && self.container_max_px > 0.0 {
            self.container_max_px
        } else {
            Self::default().container_max_px
        }
    }

    /// Width available to a video row: the container, narrowed by the viewport.
    fn video_px(&self) -> f64 {
        let container = self.container_px();
        match self.viewport_width_px {
            Some(viewport) if viewport.is_finite() && viewport > 0.0 => container.min(viewport),
            _ => container,
        }
    }
}

/// Everything a renderer needs to draw a document.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderPlan {
    pub blocks: Vec<PlanBlock>,
}

impl RenderPlan {
    pub fn galleries(&self) -> impl Iterator<Item = &Gallery> {
        self.blocks.iter().filter_map(|b| match b {
            PlanBlock::Gallery(g) => Some(g),
            PlanBlock::Content { .. } => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlanBlock {
    /// A text block, rendered from the document as-is.
    Content { block: usize },
    /// A run of consecutive media rows.
    Gallery(Gallery),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gallery {
    pub columns: usize,
    pub rows: Vec<PlanRow>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanRow {
    pub block: usize,
    pub cells: Vec<PlanCell>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanCell {
    pub position: MediaPosition,
    pub column_span: usize,
    pub geometry: RenderGeometry,
    pub variant: AssetVariant,
}

/// Renditions chosen for a cell.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AssetVariant {
    Image(ImageVariant),
    Video(VideoVariant),
}

/// Compute the render plan for a document.
pub fn compute_plan(doc: &Document, options: &LayoutOptions) -> RenderPlan {
    let mut blocks = Vec::new();
    let mut run: Vec<(usize, &MediaRow)> = Vec::new();

    for (index, block) in doc.blocks.iter().enumerate() {
        match block {
            Block::MediaRow(row) => {
                if !row.is_empty() {
                    run.push((index, row));
                }
            }
            _ => {
                flush_gallery(&mut run, options, &mut blocks);
                blocks.push(PlanBlock::Content { block: index });
            }
        }
    }
    flush_gallery(&mut run, options, &mut blocks);

    log::debug!(
        "planned {} blocks ({} galleries)",
        blocks.len(),
        blocks.iter().filter(|b| matches!(b, PlanBlock::Gallery(_))).count()
    );
    RenderPlan { blocks }
}

fn flush_gallery(run: &mut Vec<(usize, &MediaRow)>, options: &LayoutOptions, out: &mut Vec<PlanBlock>) {
    if run.is_empty() {
        return;
    }
    let rows: Vec<&MediaRow> = run.iter().map(|(_, row)| *row).collect();
    let grid = pack_rows(&rows);

    let rows = run
        .iter()
        .zip(&grid.rows)
        .map(|(&(block, row), packed)| plan_row(block, row, packed.column_span, options))
        .collect();
    out.push(PlanBlock::Gallery(Gallery {
        columns: grid.columns,
        rows,
    }));
    run.clear();
}

fn plan_row(block: usize, row: &MediaRow, column_span: usize, options: &LayoutOptions) -> PlanRow {
    let count = row.len().max(1) as f64;
    let column_px = (options.container_px() / count).round();
    let video_px = options.video_px() / count;

    let cells = row
        .items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let geometry = resolve_in_row(&row.items, index, column_px)?;
            let variant = match item.kind {
                MediaKind::Image => AssetVariant::Image(select_image_variant(
                    &item.asset_id,
                    geometry.recommended_source_width_px,
                )),
                MediaKind::Video => AssetVariant::Video(select_video_variant(&item.asset_id, video_px)),
            };
            Some(PlanCell {
                position: MediaPosition::new(block, index),
                column_span,
                geometry,
                variant,
            })
        })
        .collect();
    PlanRow { block, cells }
}
