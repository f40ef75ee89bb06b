//! Band and linear scales mapping genomic positions to pixels.

use crate::axis::nice_ticks;
use crate::types::GenomicPos;

/// Padding used by every heatmap band scale, as a fraction of the step.
pub const DEFAULT_BAND_PADDING: f64 = 0.1;

/// Ordinal scale assigning each axis value an equal-width band.
///
/// Equal inner and outer padding, bands centred in the range. A range whose
/// first end is larger than its second (a y axis growing upwards) gives the
/// first domain value the largest pixel position.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<GenomicPos>,
    start: f64,
    step: f64,
    bandwidth: f64,
    reversed: bool,
}

impl BandScale {
    pub fn new(domain: &[GenomicPos], range: (f64, f64)) -> Self {
        Self::with_padding(domain, range, DEFAULT_BAND_PADDING)
    }

    pub fn with_padding(domain: &[GenomicPos], range: (f64, f64), padding: f64) -> Self {
        let mut domain = domain.to_vec();
        domain.sort_unstable();
        domain.dedup();

        let (r0, r1) = range;
        let reversed = r1 < r0;
        let (lo, hi) = if reversed { (r1, r0) } else { (r0, r1) };
        let n = domain.len() as f64;
        let padding = padding.clamp(0.0, 1.0);

        let step = (hi - lo) / (n - padding + padding * 2.0).max(1.0);
        let start = lo + (hi - lo - step * (n - padding)) * 0.5;
        let bandwidth = step * (1.0 - padding);

        Self { domain, start, step, bandwidth, reversed }
    }

    pub fn domain(&self) -> &[GenomicPos] {
        &self.domain
    }

    pub fn len(&self) -> usize {
        self.domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn index_of(&self, value: GenomicPos) -> Option<usize> {
        self.domain.binary_search(&value).ok()
    }

    /// Leading edge of the band at `index`.
    pub fn position_at(&self, index: usize) -> f64 {
        let slot = if self.reversed {
            self.domain.len().saturating_sub(1 + index)
        } else {
            index
        };
        self.start + self.step * slot as f64
    }

    /// Leading edge of the band for `value`, or `None` off the domain.
    pub fn position(&self, value: GenomicPos) -> Option<f64> {
        self.index_of(value).map(|i| self.position_at(i))
    }

    pub fn center(&self, value: GenomicPos) -> Option<f64> {
        self.position(value).map(|p| p + self.bandwidth / 2.0)
    }

    /// Domain values whose band centre lies in `[x0, x1]`, ascending.
    pub fn values_in(&self, x0: f64, x1: f64) -> Vec<GenomicPos> {
        let (lo, hi) = if x1 < x0 { (x1, x0) } else { (x0, x1) };
        self.domain
            .iter()
            .enumerate()
            .filter(|(i, _)| {
                let c = self.position_at(*i) + self.bandwidth / 2.0;
                c >= lo && c <= hi
            })
            .map(|(_, v)| *v)
            .collect()
    }
}

/// Continuous linear map between two intervals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    pub fn invert(&self, pixel: f64) -> f64 {
        LinearScale::new(self.range, self.domain).apply(pixel)
    }

    pub fn ticks(&self, desired: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        nice_ticks(d0.min(d1), d0.max(d1), desired)
    }
}
