//! Value to color mapping and the user-adjustable color range.
//!
//! The color controls span fixed bounds per mode: `[0, 1]` for probability
//! and binary presence, `[0, 200]` for raw counts and distances. Observed
//! values outside those bounds widen them; they never narrow them.

use serde::{Deserialize, Serialize};

use crate::types::{ColorStrategy, ValueMode};

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const WHITE: Rgb = Rgb([255, 255, 255]);
    pub const BLACK: Rgb = Rgb([0, 0, 0]);

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.0;
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    pub fn from_hex(s: &str) -> Option<Rgb> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Rgb([r, g, b]))
    }
}

/// Background for absent, gated and "not present" cells.
pub const BACKGROUND: Rgb = Rgb::WHITE;

/// Cell color for BinaryPresence values above one.
pub const PRESENT: Rgb = Rgb([0xcb, 0x18, 0x1d]);

/// Nine-stop sequential red scheme, light to dark.
const REDS: [[u8; 3]; 9] = [
    [0xff, 0xf5, 0xf0],
    [0xfe, 0xe0, 0xd2],
    [0xfc, 0xbb, 0xa1],
    [0xfc, 0x92, 0x72],
    [0xfb, 0x6a, 0x4a],
    [0xef, 0x3b, 0x2c],
    [0xcb, 0x18, 0x1d],
    [0xa5, 0x0f, 0x15],
    [0x67, 0x00, 0x0d],
];

fn basis(t1: f64, v0: f64, v1: f64, v2: f64, v3: f64) -> f64 {
    let t2 = t1 * t1;
    let t3 = t2 * t1;
    ((1.0 - 3.0 * t1 + 3.0 * t2 - t3) * v0
        + (4.0 - 6.0 * t2 + 3.0 * t3) * v1
        + (1.0 + 3.0 * t1 + 3.0 * t2 - 3.0 * t3) * v2
        + t3 * v3)
        / 6.0
}

/// Uniform B-spline through the red scheme. `t` is clamped to `[0, 1]`;
/// the endpoints hit the first and last scheme colors exactly.
pub fn reds(t: f64) -> Rgb {
    let n = REDS.len() - 1;
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let i = if t >= 1.0 { n - 1 } else { (t * n as f64).floor() as usize };
    let local = (t - i as f64 / n as f64) * n as f64;

    let mut out = [0u8; 3];
    for (c, slot) in out.iter_mut().enumerate() {
        let v1 = REDS[i][c] as f64;
        let v2 = REDS[i + 1][c] as f64;
        let v0 = if i > 0 { REDS[i - 1][c] as f64 } else { 2.0 * v1 - v2 };
        let v3 = if i < n - 1 { REDS[i + 2][c] as f64 } else { 2.0 * v2 - v1 };
        *slot = basis(local, v0, v1, v2, v3).round().clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}

/// Active `[min, max]` color range and the data bounds it must stay in.
///
/// Every mutation returns a new value; `data_min <= min <= max <= data_max`
/// holds for every value produced here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorScaleRange {
    pub min: f64,
    pub max: f64,
    pub data_min: f64,
    pub data_max: f64,
}

impl ColorScaleRange {
    pub fn new(min: f64, max: f64, data_min: f64, data_max: f64) -> Self {
        let (data_min, data_max) = ordered(data_min, data_max);
        let base = Self { min: data_min, max: data_max, data_min, data_max };
        base.with_bounds(min, max)
    }

    /// Starting range for `mode`. `observed` is the value bounds of the
    /// loaded records; it widens the data bounds and fills in the range for
    /// modes without a fixed default.
    pub fn for_mode(mode: ValueMode, observed: Option<(f64, f64)>) -> Self {
        let (slider_lo, slider_hi) = slider_bounds(mode);
        let (data_min, data_max) = match observed {
            Some((lo, hi)) if lo.is_finite() && hi.is_finite() => (slider_lo.min(lo), slider_hi.max(hi)),
            _ => (slider_lo, slider_hi),
        };
        let (min, max) = mode
            .default_scale()
            .or(observed)
            .unwrap_or((data_min, data_max));
        Self::new(min, max, data_min, data_max)
    }

    /// Lower the floor. Values above the current max land on the max.
    pub fn with_min(self, value: f64) -> Self {
        if value.is_nan() {
            return self;
        }
        Self { min: value.clamp(self.data_min, self.max), ..self }
    }

    /// Raise the ceiling. Values below the current min land on the min.
    pub fn with_max(self, value: f64) -> Self {
        if value.is_nan() {
            return self;
        }
        Self { max: value.clamp(self.min, self.data_max), ..self }
    }

    /// Set both ends at once; swapped input is put back in order.
    pub fn with_bounds(self, min: f64, max: f64) -> Self {
        let (lo, hi) = ordered(min, max);
        let lo = if lo.is_nan() { self.data_min } else { lo.clamp(self.data_min, self.data_max) };
        let hi = if hi.is_nan() { self.data_max } else { hi.clamp(lo, self.data_max) };
        Self { min: lo, max: hi, ..self }
    }

    /// Position of `value` inside the range, clamped to `[0, 1]`.
    /// A zero-width range maps values at or above it to 1.
    pub fn normalize(&self, value: f64) -> f64 {
        if value.is_nan() {
            return 0.0;
        }
        let span = self.max - self.min;
        if span <= 0.0 {
            return if value >= self.max { 1.0 } else { 0.0 };
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if b < a { (b, a) } else { (a, b) }
}

/// Range the user can drag the color controls across.
pub fn slider_bounds(mode: ValueMode) -> (f64, f64) {
    match mode {
        ValueMode::Probability | ValueMode::BinaryPresence => (0.0, 1.0),
        ValueMode::RawCount | ValueMode::Distance => (0.0, 200.0),
    }
}

/// Map one cell value to a color.
///
/// BinaryPresence ignores `scale` entirely: values above one are present,
/// anything else is background.
pub fn color_for(value: f64, scale: &ColorScaleRange, mode: ValueMode) -> Rgb {
    match mode.profile().strategy {
        ColorStrategy::Ramp => reds(scale.normalize(value) * 0.8 + 0.2),
        ColorStrategy::InvertedRamp => reds(1.0 - scale.normalize(value)),
        ColorStrategy::TwoTone => {
            if value > 1.0 {
                PRESENT
            } else {
                BACKGROUND
            }
        }
    }
}

/// One stop of a legend gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendStop {
    /// Position along the legend in `[0, 1]`.
    pub offset: f64,
    pub value: f64,
    pub color: Rgb,
}

/// `intervals + 1` evenly spaced stops across the active range.
pub fn legend_stops(scale: &ColorScaleRange, mode: ValueMode, intervals: usize) -> Vec<LegendStop> {
    if mode == ValueMode::BinaryPresence {
        return vec![
            LegendStop { offset: 0.0, value: 0.0, color: BACKGROUND },
            LegendStop { offset: 1.0, value: 2.0, color: PRESENT },
        ];
    }
    let intervals = intervals.max(1);
    (0..=intervals)
        .map(|k| {
            let offset = k as f64 / intervals as f64;
            let value = scale.min + offset * (scale.max - scale.min);
            LegendStop { offset, value, color: color_for(value, scale, mode) }
        })
        .collect()
}
