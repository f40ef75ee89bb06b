//! Heatmap painting strategies.
//!
//! The dense strategy walks the full axis cross product and queries a
//! [`CellLookup`]; the sparse one walks the records themselves. A cell with
//! data paints the same color under both.

use foldrec_core::color::{color_for, BACKGROUND};
use foldrec_core::index::{CellLookup, InteractionIndex};
use foldrec_core::{ColorScaleRange, GenomicPos, GenomicRange, InteractionRecord, Rgb, ValueMode};

use crate::geometry::HeatmapGeometry;
use crate::CellSink;

/// Ranges with sequencing coverage. A cell is drawn only when both of its
/// coordinates fall inside one range; no ranges means no restriction.
#[derive(Debug, Clone, Copy, Default)]
pub struct Coverage<'a> {
    ranges: &'a [GenomicRange],
}

impl<'a> Coverage<'a> {
    pub fn new(ranges: &'a [GenomicRange]) -> Self {
        Self { ranges }
    }

    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn allows(&self, i: GenomicPos, j: GenomicPos) -> bool {
        self.ranges.is_empty() || self.ranges.iter().any(|r| r.contains_pair(i, j))
    }
}

/// Counters from one paint pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaintStats {
    /// Cells with a record that received a data color.
    pub painted: usize,
    /// Cells with a record that were gated to background.
    pub gated: usize,
    /// Cells skipped for lack of coverage.
    pub uncovered: usize,
}

/// Color for a record under `mode`, background when the mode gates it out.
pub(crate) fn record_color(
    record: &InteractionRecord,
    mode: ValueMode,
    scale: &ColorScaleRange,
) -> Option<Rgb> {
    mode.profile()
        .cell_value(record)
        .map(|v| color_for(v, scale, mode))
}

fn paint_cell<S: CellSink + ?Sized>(
    sink: &mut S,
    geometry: &HeatmapGeometry,
    (i, j): (GenomicPos, GenomicPos),
    color: Option<Rgb>,
    stats: &mut PaintStats,
) {
    let Some((x, y, w, h)) = geometry.cell_rect(i, j) else {
        return;
    };
    match color {
        Some(color) => {
            sink.fill_rect(x, y, w, h, color);
            stats.painted += 1;
        }
        None => {
            sink.fill_rect(x, y, w, h, BACKGROUND);
            stats.gated += 1;
        }
    }
}

/// Paint every `(i, j)` of the axis cross product. O(|axis|²).
pub fn paint_dense<S, L>(
    sink: &mut S,
    geometry: &HeatmapGeometry,
    lookup: &L,
    mode: ValueMode,
    scale: &ColorScaleRange,
    coverage: Coverage<'_>,
) -> PaintStats
where
    S: CellSink + ?Sized,
    L: CellLookup + ?Sized,
{
    let mut stats = PaintStats::default();
    let axis = geometry.axis();
    for &i in axis {
        for &j in axis {
            if !coverage.allows(i, j) {
                stats.uncovered += 1;
                continue;
            }
            if let Some(record) = lookup.get(i, j) {
                let color = record_color(record, mode, scale);
                paint_cell(sink, geometry, (i, j), color, &mut stats);
            }
        }
    }
    log::debug!(
        "Dense pass over {} bins: {} painted, {} gated, {} uncovered",
        axis.len(),
        stats.painted,
        stats.gated,
        stats.uncovered
    );
    stats
}

/// Paint each record at `(i, j)` and `(j, i)`. O(records).
pub fn paint_sparse<S>(
    sink: &mut S,
    geometry: &HeatmapGeometry,
    records: &[InteractionRecord],
    mode: ValueMode,
    scale: &ColorScaleRange,
    coverage: Coverage<'_>,
) -> PaintStats
where
    S: CellSink + ?Sized,
{
    let mut stats = PaintStats::default();
    for record in records {
        if !coverage.allows(record.i, record.j) {
            stats.uncovered += 2;
            continue;
        }
        let color = record_color(record, mode, scale);
        paint_cell(sink, geometry, (record.i, record.j), color, &mut stats);
        paint_cell(sink, geometry, (record.j, record.i), color, &mut stats);
    }
    log::debug!(
        "Sparse pass over {} records: {} painted, {} gated, {} uncovered",
        records.len(),
        stats.painted,
        stats.gated,
        stats.uncovered
    );
    stats
}

/// Pick the strategy `mode` calls for. Dense passes index the records
/// first.
pub fn paint_heatmap<S>(
    sink: &mut S,
    geometry: &HeatmapGeometry,
    records: &[InteractionRecord],
    mode: ValueMode,
    scale: &ColorScaleRange,
    coverage: Coverage<'_>,
) -> PaintStats
where
    S: CellSink + ?Sized,
{
    if mode.profile().sparse {
        paint_sparse(sink, geometry, records, mode, scale, coverage)
    } else {
        let index = InteractionIndex::build(records);
        paint_dense(sink, geometry, &index, mode, scale, coverage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HeatmapMargin, Raster};
    use foldrec_core::axis::compute_axis;
    use foldrec_core::color::{reds, PRESENT};
    use foldrec_core::index::MergedIndex;

    /// Records every fill instead of rasterizing.
    #[derive(Default)]
    struct Recorder {
        rects: Vec<(f64, f64, f64, f64, Rgb)>,
    }

    impl CellSink for Recorder {
        fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb) {
            self.rects.push((x, y, width, height, color));
        }

        fn fill_polygon(&mut self, _points: &[(f64, f64)], _color: Rgb) {}
    }

    fn geometry(range: &GenomicRange) -> HeatmapGeometry {
        let axis = compute_axis(range, 5_000).unwrap();
        HeatmapGeometry::new(600.0, 600.0, &axis, HeatmapMargin::default()).unwrap()
    }

    fn centre(g: &HeatmapGeometry, i: GenomicPos, j: GenomicPos) -> (u32, u32) {
        let (x, y, w, h) = g.cell_rect(i, j).unwrap();
        ((x + w / 2.0) as u32, (y + h / 2.0) as u32)
    }

    #[test]
    fn test_coverage_requires_one_range() {
        let ranges = [
            GenomicRange::new(0, 100).unwrap(),
            GenomicRange::new(200, 300).unwrap(),
        ];
        let coverage = Coverage::new(&ranges);
        assert!(coverage.allows(10, 90));
        assert!(coverage.allows(250, 300));
        assert!(!coverage.allows(50, 250));
        assert!(!coverage.allows(150, 150));
        assert!(Coverage::unrestricted().allows(150, 9_999));
    }

    #[test]
    fn test_dense_scenario() {
        let range = GenomicRange::new(100_000, 150_000).unwrap();
        let g = geometry(&range);
        assert_eq!(g.axis().len(), 11);

        let records = vec![
            InteractionRecord::new(100_000, 105_000, 0.4, 3.0).with_fdr(0.01),
            InteractionRecord::new(110_000, 120_000, 0.6, 9.0).with_fdr(0.2),
        ];
        let scale = ColorScaleRange::new(0.0, 0.8, 0.0, 1.0);
        let mut raster = Raster::new(600, 600);
        let stats = paint_heatmap(&mut raster, &g, &records, ValueMode::Probability, &scale, Coverage::unrestricted());

        assert_eq!(stats.painted, 2);
        assert_eq!(stats.gated, 2);
        let expected = reds(0.2 + 0.8 * 0.5);
        let (x, y) = centre(&g, 100_000, 105_000);
        assert_eq!(raster.pixel(x, y), Some(expected));
        let (x, y) = centre(&g, 105_000, 100_000);
        assert_eq!(raster.pixel(x, y), Some(expected));
        let (x, y) = centre(&g, 110_000, 120_000);
        assert_eq!(raster.pixel(x, y), Some(BACKGROUND));
        let (x, y) = centre(&g, 130_000, 140_000);
        assert_eq!(raster.pixel(x, y), Some(BACKGROUND));
    }

    #[test]
    fn test_sentinel_paints_background() {
        let range = GenomicRange::new(0, 20_000).unwrap();
        let g = geometry(&range);
        let records = vec![InteractionRecord::new(5_000, 10_000, 0.9, -1.0).with_fdr(-1.0)];
        let scale = ColorScaleRange::new(0.0, 30.0, 0.0, 200.0);
        let mut rec = Recorder::default();
        let stats = paint_heatmap(&mut rec, &g, &records, ValueMode::RawCount, &scale, Coverage::unrestricted());
        assert_eq!(stats.painted, 0);
        assert!(rec.rects.iter().all(|r| r.4 == BACKGROUND));
    }

    #[test]
    fn test_binary_presence_scenario() {
        let records = vec![
            InteractionRecord::new(0, 5_000, 1.5, 0.0),
            InteractionRecord::new(0, 10_000, 0.9, 0.0),
        ];
        let axis = foldrec_core::compute_sparse_axis(&records);
        let g = HeatmapGeometry::new(400.0, 400.0, &axis, HeatmapMargin::default()).unwrap();
        let wide = ColorScaleRange::new(5.0, 100.0, 0.0, 200.0);
        let mut raster = Raster::new(400, 400);
        paint_heatmap(&mut raster, &g, &records, ValueMode::BinaryPresence, &wide, Coverage::unrestricted());

        let (x, y) = centre(&g, 0, 5_000);
        assert_eq!(raster.pixel(x, y), Some(PRESENT));
        let (x, y) = centre(&g, 5_000, 0);
        assert_eq!(raster.pixel(x, y), Some(PRESENT));
        let (x, y) = centre(&g, 0, 10_000);
        assert_eq!(raster.pixel(x, y), Some(BACKGROUND));
    }

    #[test]
    fn test_dense_and_sparse_agree() {
        let range = GenomicRange::new(0, 50_000).unwrap();
        let g = geometry(&range);
        let records = vec![
            InteractionRecord::new(0, 10_000, 120.0, 0.0),
            InteractionRecord::new(5_000, 45_000, 480.0, 0.0),
            InteractionRecord::new(20_000, 20_000, 300.0, 0.0),
        ];
        let scale = ColorScaleRange::new(100.0, 500.0, 0.0, 1_000.0);
        let index = InteractionIndex::build(&records);

        let mut dense = Raster::new(600, 600);
        let mut sparse = Raster::new(600, 600);
        paint_dense(&mut dense, &g, &index, ValueMode::Distance, &scale, Coverage::unrestricted());
        paint_sparse(&mut sparse, &g, &records, ValueMode::Distance, &scale, Coverage::unrestricted());
        assert_eq!(dense.image().as_raw(), sparse.image().as_raw());
    }

    #[test]
    fn test_empty_records_leave_background() {
        let range = GenomicRange::new(0, 50_000).unwrap();
        let g = geometry(&range);
        let scale = ColorScaleRange::for_mode(ValueMode::Probability, None);
        let mut raster = Raster::new(600, 600);
        let stats = paint_heatmap(&mut raster, &g, &[], ValueMode::Probability, &scale, Coverage::unrestricted());
        assert_eq!(stats, PaintStats::default());
        assert!(raster.image().pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_uncovered_cells_skipped() {
        let range = GenomicRange::new(0, 20_000).unwrap();
        let g = geometry(&range);
        let records = vec![
            InteractionRecord::new(0, 5_000, 0.5, 1.0),
            InteractionRecord::new(5_000, 20_000, 0.5, 1.0),
        ];
        let covered = [GenomicRange::new(0, 10_000).unwrap()];
        let scale = ColorScaleRange::new(0.0, 0.8, 0.0, 1.0);
        let mut rec = Recorder::default();
        let stats = paint_heatmap(&mut rec, &g, &records, ValueMode::Probability, &scale, Coverage::new(&covered));
        assert_eq!(stats.painted, 2);
        assert_eq!(rec.rects.len(), 2);
    }

    #[test]
    fn test_merged_halves() {
        let range = GenomicRange::new(0, 10_000).unwrap();
        let g = geometry(&range);
        let primary = vec![InteractionRecord::new(0, 5_000, 0.8, 1.0)];
        let comparison = vec![InteractionRecord::new(0, 5_000, 0.0, 1.0)];
        let merged = MergedIndex::build(&primary, &comparison);
        let scale = ColorScaleRange::new(0.0, 0.8, 0.0, 1.0);
        let mut raster = Raster::new(600, 600);
        paint_dense(&mut raster, &g, &merged, ValueMode::Probability, &scale, Coverage::unrestricted());

        let (x, y) = centre(&g, 0, 5_000);
        assert_eq!(raster.pixel(x, y), Some(reds(1.0)));
        let (x, y) = centre(&g, 5_000, 0);
        assert_eq!(raster.pixel(x, y), Some(reds(0.2)));
    }
}
