//! Triangle view painting.

use foldrec_core::color::{color_for, BACKGROUND};
use foldrec_core::index::CellLookup;
use foldrec_core::triangle::{TriangleHalf, TriangleLayout, TriangleShading};
use foldrec_core::{ColorScaleRange, InteractionRecord, Rgb, ValueMode};
use serde::{Deserialize, Serialize};

use crate::painter::{record_color, Coverage, PaintStats};
use crate::CellSink;

/// Visibility toggles of the triangle view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TriangleStyle {
    #[serde(default)]
    pub half: TriangleHalf,
    #[serde(default)]
    pub shading: TriangleShading,
}

/// Significant shading applies the same per-mode gate as the heatmap, so
/// ungated modes (distance, binary presence) show every record.
fn shaded_color(
    record: &InteractionRecord,
    mode: ValueMode,
    scale: &ColorScaleRange,
    shading: TriangleShading,
) -> Option<Rgb> {
    match shading {
        TriangleShading::Significant => record_color(record, mode, scale),
        TriangleShading::Full => {
            if record.is_absent_sentinel() {
                return None;
            }
            Some(color_for(mode.profile().extract(record), scale, mode))
        }
    }
}

/// Paint the visible half of the matrix as rotated quads.
///
/// The lower half is read transposed so it lands in the same silhouette as
/// the upper one; cells outside the chosen half are never drawn.
pub fn paint_triangle<S, L>(
    sink: &mut S,
    layout: &TriangleLayout,
    lookup: &L,
    mode: ValueMode,
    scale: &ColorScaleRange,
    coverage: Coverage<'_>,
    style: TriangleStyle,
) -> PaintStats
where
    S: CellSink + ?Sized,
    L: CellLookup + ?Sized,
{
    let mut stats = PaintStats::default();
    let axis = layout.axis();
    for &i in axis {
        for &j in axis {
            if !layout.in_visible_half(i, j, style.half) {
                continue;
            }
            if !coverage.allows(i, j) {
                stats.uncovered += 1;
                continue;
            }
            let Some(record) = lookup.get(i, j) else {
                continue;
            };
            let quad = match style.half {
                TriangleHalf::Upper => layout.cell_quad(i, j),
                TriangleHalf::Lower => layout.cell_quad(j, i),
            };
            match shaded_color(record, mode, scale, style.shading) {
                Some(color) => {
                    sink.fill_polygon(&quad, color);
                    stats.painted += 1;
                }
                None => {
                    sink.fill_polygon(&quad, BACKGROUND);
                    stats.gated += 1;
                }
            }
        }
    }
    log::debug!(
        "Triangle pass over {} bins ({:?}, {:?}): {} painted, {} gated",
        axis.len(),
        style.half,
        style.shading,
        stats.painted,
        stats.gated
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Raster;
    use foldrec_core::color::reds;
    use foldrec_core::index::{InteractionIndex, MergedIndex};
    use foldrec_core::GenomicRange;

    fn layout() -> TriangleLayout {
        let range = GenomicRange::new(0, 50_000).unwrap();
        TriangleLayout::new(410.0, 410.0, range, 5_000).unwrap().unwrap()
    }

    fn raster_for(layout: &TriangleLayout) -> Raster {
        Raster::new(layout.canvas_width().ceil() as u32, layout.canvas_height().ceil() as u32)
    }

    fn quad_centre(layout: &TriangleLayout, i: u64, j: u64) -> (u32, u32) {
        let q = layout.cell_quad(i, j);
        let x = q.iter().map(|p| p.0).sum::<f64>() / 4.0;
        let y = q.iter().map(|p| p.1).sum::<f64>() / 4.0;
        (x as u32, y as u32)
    }

    #[test]
    fn test_significant_hides_insignificant() {
        let l = layout();
        let records = vec![
            InteractionRecord::new(10_000, 30_000, 0.8, 5.0).with_fdr(0.01),
            InteractionRecord::new(5_000, 40_000, 0.8, 5.0).with_fdr(0.3),
        ];
        let index = InteractionIndex::build(&records);
        let scale = ColorScaleRange::new(0.0, 0.8, 0.0, 1.0);

        let mut gated = raster_for(&l);
        let stats = paint_triangle(&mut gated, &l, &index, ValueMode::Probability, &scale, Coverage::unrestricted(), TriangleStyle::default());
        assert_eq!((stats.painted, stats.gated), (1, 1));
        let (x, y) = quad_centre(&l, 10_000, 30_000);
        assert_eq!(gated.pixel(x, y), Some(reds(1.0)));
        let (x, y) = quad_centre(&l, 5_000, 40_000);
        assert_eq!(gated.pixel(x, y), Some(BACKGROUND));

        let full_style = TriangleStyle { shading: TriangleShading::Full, ..TriangleStyle::default() };
        let mut full = raster_for(&l);
        let stats = paint_triangle(&mut full, &l, &index, ValueMode::Probability, &scale, Coverage::unrestricted(), full_style);
        assert_eq!(stats.painted, 2);
        assert_eq!(full.pixel(x, y), Some(reds(1.0)));
    }

    #[test]
    fn test_ungated_modes_ignore_fdr() {
        let l = layout();
        let records = vec![InteractionRecord::new(10_000, 30_000, 1.5, 0.0).with_fdr(0.3)];
        let index = InteractionIndex::build(&records);
        let (x, y) = quad_centre(&l, 10_000, 30_000);

        for mode in [ValueMode::Distance, ValueMode::BinaryPresence] {
            let scale = ColorScaleRange::for_mode(mode, Some((0.5, 1.5)));
            let mut raster = raster_for(&l);
            let stats = paint_triangle(&mut raster, &l, &index, mode, &scale, Coverage::unrestricted(), TriangleStyle::default());
            assert_eq!((stats.painted, stats.gated), (1, 0), "{mode}");
            assert_eq!(raster.pixel(x, y), Some(color_for(1.5, &scale, mode)), "{mode}");
        }
    }

    #[test]
    fn test_lower_half_reads_comparison() {
        let l = layout();
        let primary = vec![InteractionRecord::new(10_000, 30_000, 0.8, 1.0)];
        let comparison = vec![InteractionRecord::new(10_000, 30_000, 0.0, 1.0)];
        let merged = MergedIndex::build(&primary, &comparison);
        let scale = ColorScaleRange::new(0.0, 0.8, 0.0, 1.0);
        let (x, y) = quad_centre(&l, 10_000, 30_000);

        let mut upper = raster_for(&l);
        paint_triangle(&mut upper, &l, &merged, ValueMode::Probability, &scale, Coverage::unrestricted(), TriangleStyle::default());
        assert_eq!(upper.pixel(x, y), Some(reds(1.0)));

        let lower_style = TriangleStyle { half: TriangleHalf::Lower, ..TriangleStyle::default() };
        let mut lower = raster_for(&l);
        paint_triangle(&mut lower, &l, &merged, ValueMode::Probability, &scale, Coverage::unrestricted(), lower_style);
        assert_eq!(lower.pixel(x, y), Some(reds(0.2)));
    }

    #[test]
    fn test_empty_lookup_paints_nothing() {
        let l = layout();
        let index = InteractionIndex::new();
        let scale = ColorScaleRange::for_mode(ValueMode::RawCount, None);
        let mut raster = raster_for(&l);
        let stats = paint_triangle(&mut raster, &l, &index, ValueMode::RawCount, &scale, Coverage::unrestricted(), TriangleStyle::default());
        assert_eq!(stats, PaintStats::default());
        assert!(raster.image().pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }
}
