//! Rotated half-matrix projection.
//!
//! The matrix is drawn in a local square frame, then mirrored vertically,
//! moved to the canvas centre and turned by 45 degrees so the diagonal lies
//! along the bottom edge and only one half of the matrix fits on the canvas.
//! Everything here is pure geometry; `foldrec-render` does the painting.

use std::f64::consts::SQRT_2;

use serde::{Deserialize, Serialize};

use crate::axis::{compute_axis, format_megabase};
use crate::scale::LinearScale;
use crate::types::{GenomicPos, GenomicRange, RangeError};

/// Gap between the container edge and the local square.
pub const TRIANGLE_MARGIN: f64 = 5.0;

/// Largest rendered cell edge in local pixels.
pub const MAX_CELL_SIZE: f64 = 10.0;

pub type Point = (f64, f64);

/// Which half of the matrix is shown inside the silhouette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriangleHalf {
    /// Cells with `i <= j`.
    #[default]
    Upper,
    /// Cells with `i >= j`.
    Lower,
}

/// How cells in the visible half are shaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriangleShading {
    /// Insignificant and absent cells paint as background.
    #[default]
    Significant,
    /// Every measured value is shown; the hidden half is forced to background.
    Full,
}

/// Maps local square coordinates to canvas pixels and back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleTransform {
    center_x: f64,
    baseline: f64,
}

impl TriangleTransform {
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self { center_x: canvas_width / 2.0, baseline: canvas_height * 2.0 }
    }

    pub fn forward(&self, local: Point) -> Point {
        let (x, y) = local;
        (self.center_x + (x - y) / SQRT_2, self.baseline - (x + y) / SQRT_2)
    }

    pub fn inverse(&self, screen: Point) -> Point {
        let (sx, sy) = screen;
        let diff = (sx - self.center_x) * SQRT_2;
        let sum = (self.baseline - sy) * SQRT_2;
        ((sum + diff) / 2.0, (sum - diff) / 2.0)
    }
}

/// Sub-range picked by clicking inside the triangle, plus the highlight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleSubRegion {
    pub start: GenomicPos,
    pub end: GenomicPos,
    /// Apex, bottom-left and bottom-right in canvas pixels.
    pub highlight: [Point; 3],
}

/// Geometry of one triangle view, a pure function of the container size,
/// range and bin size.
#[derive(Debug, Clone)]
pub struct TriangleLayout {
    range: GenomicRange,
    step: GenomicPos,
    axis: Vec<GenomicPos>,
    side: f64,
    canvas_width: f64,
    canvas_height: f64,
    cell_size: f64,
    x_scale: LinearScale,
    y_scale: LinearScale,
    axis_scale: LinearScale,
    transform: TriangleTransform,
}

impl TriangleLayout {
    /// `Ok(None)` when the container is too small to hold any cells.
    pub fn new(
        container_width: f64,
        container_height: f64,
        range: GenomicRange,
        step: GenomicPos,
    ) -> Result<Option<Self>, RangeError> {
        let axis = compute_axis(&range, step)?;
        let side = container_width.min(container_height) - 2.0 * TRIANGLE_MARGIN;
        let inner = side - 2.0 * TRIANGLE_MARGIN;
        if !inner.is_finite() || inner <= 0.0 {
            return Ok(None);
        }

        let canvas_width = side * SQRT_2;
        let canvas_height = side / SQRT_2;
        let span = range.span() as f64;
        let x_scale = LinearScale::new((range.start as f64, range.end as f64), (0.0, inner));
        let y_scale = LinearScale::new((range.start as f64, range.end as f64), (inner, 0.0));

        let axis_min = axis.first().copied().unwrap_or(range.start) as f64;
        let axis_max = axis.last().copied().unwrap_or(range.end) as f64;
        let axis_scale = LinearScale::new((axis_min, axis_max), (0.0, canvas_width));

        let raw_cell = step as f64 * inner / span;
        let cell_size = raw_cell.min(MAX_CELL_SIZE).round();

        Ok(Some(Self {
            range,
            step,
            axis,
            side,
            canvas_width,
            canvas_height,
            cell_size,
            x_scale,
            y_scale,
            axis_scale,
            transform: TriangleTransform::new(canvas_width, canvas_height),
        }))
    }

    pub fn range(&self) -> GenomicRange {
        self.range
    }

    pub fn step(&self) -> GenomicPos {
        self.step
    }

    pub fn axis(&self) -> &[GenomicPos] {
        &self.axis
    }

    pub fn side(&self) -> f64 {
        self.side
    }

    pub fn canvas_width(&self) -> f64 {
        self.canvas_width
    }

    pub fn canvas_height(&self) -> f64 {
        self.canvas_height
    }

    /// Rounded cell edge, also the click snapping unit.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn transform(&self) -> TriangleTransform {
        self.transform
    }

    pub fn axis_scale(&self) -> LinearScale {
        self.axis_scale
    }

    /// Local-frame corner of the cell at row `i`, column `j`.
    pub fn cell_origin(&self, i: GenomicPos, j: GenomicPos) -> Point {
        (
            TRIANGLE_MARGIN + self.x_scale.apply(j as f64),
            TRIANGLE_MARGIN + self.y_scale.apply(i as f64),
        )
    }

    /// Canvas-space corners of the rotated cell, in drawing order.
    pub fn cell_quad(&self, i: GenomicPos, j: GenomicPos) -> [Point; 4] {
        let (x, y) = self.cell_origin(i, j);
        let s = self.cell_size;
        [
            self.transform.forward((x, y)),
            self.transform.forward((x + s, y)),
            self.transform.forward((x + s, y + s)),
            self.transform.forward((x, y + s)),
        ]
    }

    /// Whether `(i, j)` lies in the half the view exposes. The diagonal
    /// belongs to both halves.
    pub fn in_visible_half(&self, i: GenomicPos, j: GenomicPos, half: TriangleHalf) -> bool {
        match half {
            TriangleHalf::Upper => j >= i,
            TriangleHalf::Lower => i >= j,
        }
    }

    /// Clickable silhouette: apex, bottom-left, bottom-right.
    pub fn hit_polygon(&self) -> [Point; 3] {
        [
            (self.canvas_width / 2.0, TRIANGLE_MARGIN),
            (0.0, self.canvas_height),
            (self.canvas_width, self.canvas_height - TRIANGLE_MARGIN),
        ]
    }

    /// Snap a click to the cell grid: column centre, row top.
    pub fn snap(&self, click: Point) -> Point {
        let unit = self.cell_size;
        if unit < 1.0 {
            return click;
        }
        let (mx, my) = click;
        ((mx / unit).floor() * unit + unit / 2.0, (my / unit).floor() * unit)
    }

    /// Sub-triangle under a click, or `None` when the click misses the
    /// silhouette or leaves no room for a base.
    pub fn pick(&self, click: Point) -> Option<TriangleSubRegion> {
        let (sx, sy) = self.snap(click);
        if !point_in_polygon((sx, sy), &self.hit_polygon()) {
            return None;
        }

        let offset = self.cell_size * SQRT_2 / 2.0;
        let length = self.canvas_height - sy - offset;
        if length <= 0.0 {
            return None;
        }
        let base_y = (sy + length).min(self.canvas_height - offset);
        let left = ((sx - length).max(0.0), base_y);
        let right = ((sx + length).min(self.canvas_width), base_y);

        let start = to_pos(self.axis_scale.invert(left.0));
        let end = to_pos(self.axis_scale.invert(right.0));
        if start >= end {
            return None;
        }
        Some(TriangleSubRegion { start, end, highlight: [(sx, sy), left, right] })
    }

    /// Axis x positions of a picked region's ends, for range markers.
    pub fn marker_positions(&self, region: &TriangleSubRegion) -> (f64, f64) {
        (
            self.axis_scale.apply(region.start as f64),
            self.axis_scale.apply(region.end as f64),
        )
    }

    /// Round-numbered ticks along the bottom axis with megabase labels.
    pub fn axis_ticks(&self, desired: usize) -> Vec<(f64, String)> {
        self.axis_scale
            .ticks(desired)
            .into_iter()
            .map(|v| (self.axis_scale.apply(v), format_megabase(v)))
            .collect()
    }
}

fn to_pos(value: f64) -> GenomicPos {
    if value.is_finite() && value > 0.0 {
        value.round() as GenomicPos
    } else {
        0
    }
}

/// Even-odd ray casting; points exactly on an edge may fall either way.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    let Some(&last) = polygon.last() else {
        return false;
    };
    let (x, y) = point;
    let (mut x0, mut y0) = last;
    let mut inside = false;
    for &(x1, y1) in polygon {
        if (y1 > y) != (y0 > y) && x < (x0 - x1) * (y - y1) / (y0 - y1) + x1 {
            inside = !inside;
        }
        x0 = x1;
        y0 = y1;
    }
    inside
}

/// Holds the current triangle selection across clicks.
#[derive(Debug, Clone, Default)]
pub struct TrianglePicker {
    selection: Option<TriangleSubRegion>,
}

impl TrianglePicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection from a click. A miss clears it.
    pub fn click(&mut self, layout: &TriangleLayout, click: Point) -> Option<&TriangleSubRegion> {
        self.selection = layout.pick(click);
        match &self.selection {
            Some(region) => log::debug!("Triangle selection {}-{}", region.start, region.end),
            None => log::debug!("Triangle selection cleared"),
        }
        self.selection.as_ref()
    }

    pub fn selection(&self) -> Option<&TriangleSubRegion> {
        self.selection.as_ref()
    }

    /// Layout or range changes invalidate the selection.
    pub fn clear(&mut self) {
        self.selection = None;
    }
}
