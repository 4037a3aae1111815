//! Property tests for transform resolution and row packing.

use folio_core::{ContentHash, FitMode, ImageTransform, MediaItem};
use folio_layout::{pack, resolve, resolve_in_row, RenderGeometry};
use glam::DVec2;
use proptest::prelude::*;

fn image(w: u32, h: u32, transform: ImageTransform, fit: FitMode) -> MediaItem {
    MediaItem::image(ContentHash::parse("a1b2c3d4e5f6").unwrap())
        .with_dimensions(w, h)
        .with_transform(transform)
        .with_fit(fit)
}

/// Check, in units of the cell width, that the rotated content covers every
/// corner of the cell when unpanned.
fn covers_cell(w: u32, h: u32, g: &RenderGeometry) -> bool {
    let width = g.content_width_percent / 100.0 * g.content_scale;
    let height = width * f64::from(h) / f64::from(w);
    let half = DVec2::new(width / 2.0, height / 2.0);
    let into_content = DVec2::from_angle(-g.rotate_degrees.to_radians());
    let cell = DVec2::new(0.5, 0.5 / g.container_aspect);
    [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)]
        .into_iter()
        .all(|(sx, sy)| {
            let p = into_content.rotate(cell * DVec2::new(sx, sy)).abs();
            p.x <= half.x + 1e-9 && p.y <= half.y + 1e-9
        })
}

fn fit_mode() -> impl Strategy<Value = FitMode> {
    prop_oneof![
        Just(FitMode::None),
        Just(FitMode::TooWide),
        Just(FitMode::TooTall),
        Just(FitMode::Square),
    ]
}

proptest! {
    #[test]
    fn rotated_content_covers_cell(
        w in 1u32..4000,
        h in 1u32..4000,
        rotate in 0i64..360,
        zoom in 100i64..=200,
        fit in fit_mode(),
        reference in 0.2f64..5.0,
    ) {
        let item = image(w, h, ImageTransform::new(rotate, zoom, 0, 0), fit);
        let g = resolve(&item, Some(reference), 500.0);
        prop_assert!(covers_cell(w, h, &g), "{g:?}");
    }

    #[test]
    fn pan_never_exceeds_clamp(
        w in 1u32..4000,
        h in 1u32..4000,
        rotate in 0i64..360,
        zoom in 100i64..=200,
        pan_x in -200i64..200,
        pan_y in -200i64..200,
    ) {
        let item = image(w, h, ImageTransform::new(rotate, zoom, pan_x, pan_y), FitMode::Square);
        let g = resolve(&item, None, 500.0);
        let max_pan = if g.content_scale > 1.0 {
            (g.content_scale - 1.0) / g.content_scale * 50.0
        } else {
            0.0
        };
        prop_assert!((g.translate_x_percent + 50.0).abs() <= max_pan + 1e-9);
        prop_assert!((g.translate_y_percent + 50.0).abs() <= max_pan + 1e-9);
    }

    #[test]
    fn near_right_angle_offsets_are_symmetric(
        w in 1u32..4000,
        h in 1u32..4000,
        quarter in 0i64..4,
        offset in 1i64..45,
    ) {
        let base = quarter * 90;
        let before = image(w, h, ImageTransform::new(base - offset, 100, 0, 0), FitMode::None);
        let after = image(w, h, ImageTransform::new(base + offset, 100, 0, 0), FitMode::None);
        let a = resolve(&before, None, 400.0);
        let b = resolve(&after, None, 400.0);
        prop_assert!((a.content_scale - b.content_scale).abs() < 1e-9);
        prop_assert!((a.container_aspect - b.container_aspect).abs() < 1e-9);
    }

    #[test]
    fn every_row_spans_the_grid(len in 0usize..24, breaks in prop::collection::vec(0usize..30, 0..8)) {
        let run: Vec<MediaItem> = (0..len)
            .map(|i| MediaItem::image(ContentHash::parse(&format!("{i:012x}")).unwrap()))
            .collect();
        let grid = pack(&run, &breaks);
        let total: usize = grid.rows.iter().map(|r| r.len()).sum();
        prop_assert_eq!(total, len);
        for row in &grid.rows {
            prop_assert!(!row.is_empty());
            prop_assert_eq!(row.column_span * row.len(), grid.columns);
        }
    }
}

#[test]
fn test_scenario_too_wide_matches_reference() {
    let row = [
        image(1600, 1200, ImageTransform::default(), FitMode::None),
        image(1200, 1600, ImageTransform::default(), FitMode::TooWide),
    ];
    let g = resolve_in_row(&row, 1, 500.0).unwrap();
    assert!((g.container_aspect - 4.0 / 3.0).abs() < 1e-9);
    assert!(covers_cell(1200, 1600, &g));
}
