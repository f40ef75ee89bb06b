//! Square heatmap layout.

use foldrec_core::axis::{format_tick_label_with, TickSet};
use foldrec_core::scale::BandScale;
use foldrec_core::{GenomicPos, GenomicRange};
use serde::{Deserialize, Serialize};

/// Space kept free around the heatmap for axes and labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatmapMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for HeatmapMargin {
    fn default() -> Self {
        Self { top: 45.0, right: 1.0, bottom: 45.0, left: 60.0 }
    }
}

/// Decimal places on heatmap tick labels.
pub const HEATMAP_LABEL_PRECISION: usize = 3;

/// Pixel layout of one heatmap: a square of side `min(width, height)` with
/// the plot inset by the margin. Column `j` maps through the x scale, row
/// `i` through the y scale, so the first axis value sits bottom-left.
#[derive(Debug, Clone)]
pub struct HeatmapGeometry {
    side: f64,
    margin: HeatmapMargin,
    plot_width: f64,
    plot_height: f64,
    x: BandScale,
    y: BandScale,
}

impl HeatmapGeometry {
    /// `None` when the container leaves no room for the plot or the axis
    /// is empty; callers skip painting in that case.
    pub fn new(
        container_width: f64,
        container_height: f64,
        axis: &[GenomicPos],
        margin: HeatmapMargin,
    ) -> Option<Self> {
        if axis.is_empty() {
            return None;
        }
        let side = container_width.min(container_height);
        let plot_width = side - margin.left - margin.right;
        let plot_height = side - margin.top - margin.bottom;
        if !(plot_width > 0.0 && plot_height > 0.0) {
            return None;
        }

        let x = BandScale::new(axis, (margin.left, margin.left + plot_width));
        let y = BandScale::new(axis, (margin.top + plot_height, margin.top));
        Some(Self { side, margin, plot_width, plot_height, x, y })
    }

    pub fn side(&self) -> f64 {
        self.side
    }

    pub fn margin(&self) -> HeatmapMargin {
        self.margin
    }

    pub fn plot_width(&self) -> f64 {
        self.plot_width
    }

    pub fn plot_height(&self) -> f64 {
        self.plot_height
    }

    /// Column scale; also the scale brush selections are resolved against.
    pub fn x_scale(&self) -> &BandScale {
        &self.x
    }

    pub fn y_scale(&self) -> &BandScale {
        &self.y
    }

    pub fn axis(&self) -> &[GenomicPos] {
        self.x.domain()
    }

    /// Rectangle `(x, y, width, height)` of the cell at row `i`, column `j`.
    pub fn cell_rect(&self, i: GenomicPos, j: GenomicPos) -> Option<(f64, f64, f64, f64)> {
        let x = self.x.position(j)?;
        let y = self.y.position(i)?;
        Some((x, y, self.x.bandwidth(), self.y.bandwidth()))
    }

    /// Vertical marker x positions for a gene span, snapped outward to
    /// bins. `None` unless both snapped ends are on the axis.
    pub fn gene_markers(&self, gene: &GenomicRange, step: GenomicPos) -> Option<(f64, f64)> {
        let snapped = gene.snapped(step).ok()?;
        let x0 = self.x.position(snapped.start)?;
        let x1 = self.x.position(snapped.end)?;
        Some((x0, x1 + self.x.bandwidth()))
    }

    /// Tick centres and labels along the bottom axis.
    pub fn x_ticks(&self, ticks: &TickSet) -> Vec<(f64, String)> {
        place_ticks(&self.x, ticks)
    }

    /// Tick centres and labels along the left axis.
    pub fn y_ticks(&self, ticks: &TickSet) -> Vec<(f64, String)> {
        place_ticks(&self.y, ticks)
    }
}

fn place_ticks(scale: &BandScale, ticks: &TickSet) -> Vec<(f64, String)> {
    ticks
        .values
        .iter()
        .filter_map(|&v| {
            scale
                .center(v)
                .map(|c| (c, format_tick_label_with(v, HEATMAP_LABEL_PRECISION)))
        })
        .collect()
}
