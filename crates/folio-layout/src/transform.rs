//! Media transform resolution.
//!
//! Turns an item's fit mode, rotation, zoom and pan into the geometry a
//! renderer needs: the aspect ratio of the cell, how far to scale the
//! content so it covers the cell, and where to translate it.
//!
//! Content is laid out centered in its cell at `content_width_percent` of
//! the cell width, then translated, rotated by `rotate_degrees` and scaled
//! by `content_scale`.

use glam::DVec2;

use folio_core::{FitMode, MediaItem};

/// Oversampling factor applied to the recommended source width.
pub const SOURCE_HEADROOM: f64 = 1.2;

/// Concrete rendering geometry for one media item.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderGeometry {
    /// Width over height of the cell.
    pub container_aspect: f64,
    /// Uniform scale: cover, rotation fill and zoom combined.
    pub content_scale: f64,
    /// Unscaled content width relative to the cell width.
    pub content_width_percent: f64,
    /// Stored rotation, applied as-is by the renderer.
    pub rotate_degrees: f64,
    pub translate_x_percent: f64,
    pub translate_y_percent: f64,
    pub recommended_source_width_px: f64,
}

/// Intrinsic width and height, with unknown or non-positive sides as 1.
fn sides(item: &MediaItem) -> (f64, f64) {
    item.dimensions.map_or((1.0, 1.0), |d| {
        (f64::from(d.width.max(1)), f64::from(d.height.max(1)))
    })
}

/// Rotation of an item in degrees; videos never rotate.
fn rotation(item: &MediaItem) -> u16 {
    if item.is_image() {
        item.transform.rotate_degrees() % 360
    } else {
        0
    }
}

/// Nearest multiple of 90 to `degrees`, in `[0, 360]`.
fn nearest_right_angle(degrees: u16) -> u16 {
    (degrees + 45) / 90 * 90
}

/// True when the nearest right angle is 90 or 270, so width and height swap.
fn is_quarter_turned(degrees: u16) -> bool {
    matches!(nearest_right_angle(degrees) % 360, 90 | 270)
}

/// Aspect ratio after rotating to the nearest right angle.
pub fn effective_aspect(item: &MediaItem) -> f64 {
    let (w, h) = sides(item);
    if is_quarter_turned(rotation(item)) {
        h / w
    } else {
        w / h
    }
}

/// Effective aspect of the reference sibling for the item at `index`.
///
/// The reference is the nearest item whose own fit is `None`, searching
/// leftwards from `index` first and then rightwards.
pub fn reference_aspect(row: &[MediaItem], index: usize) -> Option<f64> {
    let left = row.get(..index).unwrap_or(&[]).iter().rev();
    let right = row.get(index + 1..).unwrap_or(&[]).iter();
    left.chain(right)
        .find(|sibling| sibling.fit == FitMode::None)
        .map(effective_aspect)
}

/// Scale on top of `cover` needed so content rotated by `theta` radians
/// still covers every corner of the cell.
///
/// Works in units of the cell width: the cell has half extents
/// `(1/2, 1/(2 * target))` and the covered content
/// `(cover/2, cover/(2 * effective))`.
fn rotation_fill_scale(theta: f64, effective: f64, target: f64, cover: f64) -> f64 {
    if theta == 0.0 {
        return 1.0;
    }
    let cell = DVec2::new(0.5, 0.5 / target);
    let content = DVec2::new(0.5 * cover, 0.5 * cover / effective);
    let into_content = DVec2::from_angle(-theta);
    [cell, DVec2::new(cell.x, -cell.y)]
        .into_iter()
        .map(|corner| {
            let reach = into_content.rotate(corner).abs() / content;
            reach.max_element()
        })
        .fold(1.0, f64::max)
}

/// Resolve render geometry for `item` in a column `column_width_px` wide.
///
/// `sibling_ref_aspect` is the effective aspect of the reference sibling
/// (see [`reference_aspect`]); a `TooWide`/`TooTall` item without one is
/// left uncropped.
pub fn resolve(
    item: &MediaItem,
    sibling_ref_aspect: Option<f64>,
    column_width_px: f64,
) -> RenderGeometry {
    let angle = rotation(item);
    let (w, h) = sides(item);
    let swapped = is_quarter_turned(angle);
    let effective = if swapped { h / w } else { w / h };

    let target = match item.fit {
        FitMode::Square => 1.0,
        FitMode::TooWide | FitMode::TooTall => sibling_ref_aspect
            .filter(|a| a.is_finite() && *a > 0.0)
            .unwrap_or(effective),
        FitMode::None => effective,
    };

    let cover = (effective / target).max(1.0);

    let offset = f64::from(angle.abs_diff(nearest_right_angle(angle)));
    let fill = rotation_fill_scale(offset.to_radians(), effective, target, cover);

    let (zoom, pan_x, pan_y) = if item.is_image() {
        let t = item.transform;
        (
            f64::from(t.zoom_percent()) / 100.0,
            f64::from(t.pan_x_percent()),
            f64::from(t.pan_y_percent()),
        )
    } else {
        (1.0, 0.0, 0.0)
    };

    let total = cover * fill * zoom;
    let max_pan = if total > 1.0 {
        (total - 1.0) / total * 50.0
    } else {
        0.0
    };

    let column_width_px = if column_width_px.is_finite() {
        column_width_px.max(0.0)
    } else {
        0.0
    };

    RenderGeometry {
        container_aspect: target,
        content_scale: total,
        content_width_percent: if swapped { w / h * 100.0 } else { 100.0 },
        rotate_degrees: f64::from(angle),
        translate_x_percent: -50.0 + pan_x.clamp(-max_pan, max_pan),
        translate_y_percent: -50.0 + pan_y.clamp(-max_pan, max_pan),
        recommended_source_width_px: column_width_px * total * SOURCE_HEADROOM,
    }
}

/// Resolve the item at `index` of `row`, finding its reference sibling.
pub fn resolve_in_row(row: &[MediaItem], index: usize, column_width_px: f64) -> Option<RenderGeometry> {
    let item = row.get(index)?;
    let reference = if item.fit.needs_reference() {
        let found = reference_aspect(row, index);
        if found.is_none() {
            log::debug!("no reference sibling for {} fit at {index}; leaving uncropped", item.asset_id);
        }
        found
    } else {
        None
    };
    Some(resolve(item, reference, column_width_px))
}
