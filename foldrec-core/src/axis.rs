//! Coordinate axes and tick selection.
//!
//! Every panel that shares a range must derive its axis and ticks from the
//! functions here so that labels line up across independently drawn surfaces.

use std::collections::BTreeSet;

use crate::types::{GenomicPos, GenomicRange, InteractionRecord, RangeError, ValueMode};

/// Smallest and largest dense tick stride.
pub const MIN_DENSE_STRIDE: usize = 5;
pub const MAX_DENSE_STRIDE: usize = 30;

/// Roughly one sparse label per this many pixels.
pub const SPARSE_LABEL_SPACING_PX: f64 = 45.0;
pub const MIN_SPARSE_TICKS: usize = 8;

/// Ticks picked from an axis, plus the stride they were picked with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSet {
    pub values: Vec<GenomicPos>,
    pub stride: usize,
}

impl TickSet {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn labels(&self) -> Vec<String> {
        self.values.iter().map(|&v| format_tick_label(v)).collect()
    }
}

/// Dense axis: every bin boundary from `floor(start/step)*step` to
/// `ceil(end/step)*step`, inclusive.
pub fn compute_axis(range: &GenomicRange, step: GenomicPos) -> Result<Vec<GenomicPos>, RangeError> {
    if range.start >= range.end {
        return Err(RangeError::Inverted { start: range.start, end: range.end });
    }
    let snapped = range.snapped(step)?;
    let len = ((snapped.end - snapped.start) / step) as usize + 1;
    Ok((0..len as u64).map(|k| snapped.start + k * step).collect())
}

/// Sparse axis: the distinct positions that actually occur in `records`.
pub fn compute_sparse_axis(records: &[InteractionRecord]) -> Vec<GenomicPos> {
    let positions: BTreeSet<GenomicPos> = records.iter().flat_map(|r| [r.i, r.j]).collect();
    positions.into_iter().collect()
}

/// Axis of one view and the tick policy that goes with it.
///
/// Sparse modes draw only the positions of records inside the range; with
/// no such records they fall back to the dense grid and dense ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewAxis {
    pub values: Vec<GenomicPos>,
    pub sparse: bool,
}

impl ViewAxis {
    /// `record_sets` holds every record set drawn over the range (a second
    /// cell line shares the axis of the first).
    pub fn resolve(
        range: &GenomicRange,
        step: GenomicPos,
        mode: ValueMode,
        record_sets: &[&[InteractionRecord]],
    ) -> Result<Self, RangeError> {
        if mode.profile().sparse {
            let visible: Vec<InteractionRecord> = record_sets
                .iter()
                .flat_map(|set| set.iter())
                .filter(|r| range.contains_pair(r.i, r.j))
                .copied()
                .collect();
            if !visible.is_empty() {
                return Ok(Self { values: compute_sparse_axis(&visible), sparse: true });
            }
        }
        Ok(Self { values: compute_axis(range, step)?, sparse: false })
    }

    pub fn ticks(&self, available_px: f64, range: &GenomicRange) -> TickSet {
        compute_ticks(&self.values, available_px, range, self.sparse)
    }
}

/// Stride used by dense axes, derived from the genomic span alone.
pub fn dense_stride(range: &GenomicRange) -> usize {
    let span = range.end.saturating_sub(range.start);
    let raw = if span < 1_000_000 {
        span / 20_000
    } else if span <= 10_000_000 {
        span / 50_000
    } else {
        MAX_DENSE_STRIDE as u64
    };
    (raw as usize).clamp(MIN_DENSE_STRIDE, MAX_DENSE_STRIDE)
}

/// Stride used by sparse axes, derived from the pixel budget.
pub fn sparse_stride(n: usize, available_px: f64) -> usize {
    if n == 0 {
        return 1;
    }
    let by_width = if available_px.is_finite() && available_px > 0.0 {
        (available_px / SPARSE_LABEL_SPACING_PX).floor() as usize
    } else {
        0
    };
    let max_ticks = n.min(MIN_SPARSE_TICKS.max(by_width));
    n.div_ceil(max_ticks).max(1)
}

/// Pick display ticks from `axis`.
///
/// Dense axes use a span-derived stride; sparse axes use a pixel-derived one
/// and only append the final value when it sits at least half a stride past
/// the last stepped tick. Pure: the same inputs always give the same ticks.
pub fn compute_ticks(
    axis: &[GenomicPos],
    available_px: f64,
    range: &GenomicRange,
    sparse: bool,
) -> TickSet {
    if !sparse {
        let stride = dense_stride(range);
        let values = axis.iter().step_by(stride).copied().collect();
        return TickSet { values, stride };
    }

    let n = axis.len();
    let stride = sparse_stride(n, available_px);
    let mut values: Vec<GenomicPos> = axis.iter().step_by(stride).copied().collect();
    if n > 0 {
        let last_index = n - 1;
        let last_stepped = (last_index / stride) * stride;
        if last_index - last_stepped >= (stride / 2).max(1) {
            values.push(axis[last_index]);
        }
    }
    TickSet { values, stride }
}

/// Shared label format: `M` for millions, `W` for ten-thousands.
pub fn format_tick_label(value: GenomicPos) -> String {
    format_tick_label_with(value, 1)
}

/// Same rules as [`format_tick_label`] with a caller-chosen precision.
pub fn format_tick_label_with(value: GenomicPos, precision: usize) -> String {
    if value >= 1_000_000 {
        format!("{:.*}M", precision, value as f64 / 1_000_000.0)
    } else if value > 10_000 {
        format!("{:.*}W", precision, value as f64 / 10_000.0)
    } else {
        value.to_string()
    }
}

/// Triangle axis labels are always in megabases.
pub fn format_megabase(value: f64) -> String {
    format!("{:.3}M", value / 1_000_000.0)
}

/// Round a positive length to 1, 2 or 5 times a power of ten.
pub fn nice_step(raw: f64) -> f64 {
    if !(raw > 0.0) || !raw.is_finite() {
        return 1.0;
    }
    let base = 10f64.powf(raw.log10().floor());
    let mant = raw / base;
    let nice = if mant >= 50f64.sqrt() {
        10.0
    } else if mant >= 10f64.sqrt() {
        5.0
    } else if mant >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    nice * base
}

/// Evenly spaced round values inside `[min, max]` for continuous axes.
pub fn nice_ticks(min: f64, max: f64, desired: usize) -> Vec<f64> {
    if !(max > min) || desired == 0 {
        return Vec::new();
    }
    let step = nice_step((max - min) / desired as f64);
    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: u64, end: u64) -> GenomicRange {
        GenomicRange::new(start, end).unwrap()
    }

    #[test]
    fn test_dense_axis_example() {
        let axis = compute_axis(&range(100_000, 150_000), 5_000).unwrap();
        assert_eq!(axis.len(), 11);
        assert_eq!(axis.first(), Some(&100_000));
        assert_eq!(axis.last(), Some(&150_000));
    }

    #[test]
    fn test_dense_axis_snaps_outward() {
        let axis = compute_axis(&range(101_000, 149_000), 5_000).unwrap();
        assert_eq!(axis.first(), Some(&100_000));
        assert_eq!(axis.last(), Some(&150_000));
    }

    #[test]
    fn test_axis_rejects_bad_input() {
        let bad = GenomicRange { start: 10, end: 5 };
        assert!(compute_axis(&bad, 5_000).is_err());
        assert_eq!(compute_axis(&range(0, 10), 0), Err(RangeError::ZeroStep));
    }

    #[test]
    fn test_sparse_axis_dedups_and_sorts() {
        let records = vec![
            InteractionRecord::new(30, 10, 1.0, 0.0),
            InteractionRecord::new(10, 20, 1.0, 0.0),
            InteractionRecord::new(20, 30, 1.0, 0.0),
        ];
        assert_eq!(compute_sparse_axis(&records), vec![10, 20, 30]);
        assert!(compute_sparse_axis(&[]).is_empty());
    }

    #[test]
    fn test_dense_stride_bounds() {
        assert_eq!(dense_stride(&range(0, 5_000)), 5);
        assert_eq!(dense_stride(&range(0, 400_000)), 20);
        assert_eq!(dense_stride(&range(0, 1_000_000)), 20);
        assert_eq!(dense_stride(&range(0, 5_000_000)), 30);
        assert_eq!(dense_stride(&range(0, 250_000_000)), 30);
    }

    #[test]
    fn test_dense_ticks_take_every_stride() {
        let r = range(100_000, 150_000);
        let axis = compute_axis(&r, 5_000).unwrap();
        let ticks = compute_ticks(&axis, 600.0, &r, false);
        assert_eq!(ticks.stride, 5);
        assert_eq!(ticks.values, vec![100_000, 125_000, 150_000]);
    }

    #[test]
    fn test_sparse_stride_example() {
        let axis: Vec<u64> = (0..1000).map(|k| k * 30_000).collect();
        let r = range(0, axis[999]);
        let ticks = compute_ticks(&axis, 450.0, &r, true);
        // max(8, 450/45) = 10 ticks budget
        assert_eq!(ticks.stride, 100);
        // index 999 is 99 past the last stepped index 900, so it is kept
        assert_eq!(ticks.values.len(), 11);
        assert_eq!(ticks.values[9], 900 * 30_000);
        assert_eq!(ticks.values.last(), Some(&(999 * 30_000)));
    }

    #[test]
    fn test_sparse_final_tick_rule() {
        // 11 values, stride 2 -> last index is itself stepped, nothing appended
        let axis: Vec<u64> = (0..11).collect();
        let r = range(0, 10);
        let ticks = compute_ticks(&axis, 0.0, &r, true);
        assert_eq!(ticks.stride, 2);
        assert_eq!(ticks.values, vec![0, 2, 4, 6, 8, 10]);

        // 12 values, stride 2 -> last index one past stepped, appended
        let axis: Vec<u64> = (0..12).collect();
        let ticks = compute_ticks(&axis, 0.0, &range(0, 11), true);
        assert_eq!(ticks.stride, 2);
        assert_eq!(ticks.values.last(), Some(&11));

        // 25 values, stride 4 -> last index is stepped
        let axis: Vec<u64> = (0..25).collect();
        let ticks = compute_ticks(&axis, 0.0, &range(0, 24), true);
        assert_eq!(ticks.stride, 4);
        assert_eq!(ticks.values, vec![0, 4, 8, 12, 16, 20, 24]);
    }

    #[test]
    fn test_sparse_empty_axis() {
        let ticks = compute_ticks(&[], 300.0, &range(0, 1), true);
        assert!(ticks.is_empty());
    }

    #[test]
    fn test_labels() {
        assert_eq!(format_tick_label(9_999), "9999");
        assert_eq!(format_tick_label(10_000), "10000");
        assert_eq!(format_tick_label(125_000), "12.5W");
        assert_eq!(format_tick_label(1_000_000), "1.0M");
        assert_eq!(format_tick_label(2_360_000), "2.4M");
        assert_eq!(format_tick_label_with(2_345_000, 3), "2.345M");
        assert_eq!(format_megabase(12_600.0), "0.013M");
    }

    #[test]
    fn test_nice_ticks() {
        assert_eq!(nice_ticks(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(nice_ticks(100_000.0, 150_000.0, 5), vec![100_000.0, 110_000.0, 120_000.0, 130_000.0, 140_000.0, 150_000.0]);
        assert!(nice_ticks(5.0, 5.0, 5).is_empty());
    }

    #[test]
    fn test_view_axis_keeps_in_range_records() {
        let r = range(0, 300_000);
        let records = [
            InteractionRecord::new(0, 30_000, 1.0, 0.0),
            InteractionRecord::new(30_000, 90_000, 1.0, 0.0),
            InteractionRecord::new(0, 1_200_000, 1.0, 0.0),
        ];
        let axis = ViewAxis::resolve(&r, 30_000, ValueMode::Distance, &[&records[..]]).unwrap();
        assert!(axis.sparse);
        assert_eq!(axis.values, vec![0, 30_000, 90_000]);
        assert!(axis.ticks(539.0, &r).values.iter().all(|&v| v <= r.end));
    }

    #[test]
    fn test_view_axis_fallback_uses_dense_ticks() {
        let r = range(0, 3_000_000);
        let axis = ViewAxis::resolve(&r, 30_000, ValueMode::Distance, &[]).unwrap();
        assert!(!axis.sparse);
        let ticks = axis.ticks(539.0, &r);
        assert_eq!(ticks.stride, MAX_DENSE_STRIDE);
        assert_eq!(ticks.values, vec![0, 900_000, 1_800_000, 2_700_000]);
    }

}
