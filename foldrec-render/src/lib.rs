/*!
# FoldRec Rendering

Paints contact maps computed by `foldrec-core` onto pixel or vector surfaces.

## Architecture

Geometry and painting are separate steps:
1. **Geometry**: [`HeatmapGeometry`] and `foldrec_core::TriangleLayout` are
   pure functions of container size, range and bin size.
2. **Painting**: the dense and sparse heatmap strategies and the triangle
   painter push colored rectangles and quads into any [`CellSink`].
3. **Export**: [`Raster`] writes PNG, [`export::SvgDocument`] writes SVG with
   axes and a legend.
*/

use std::path::Path;

use anyhow::{Context, Result};
use foldrec_core::color::BACKGROUND;
use foldrec_core::triangle::{point_in_polygon, Point};
use foldrec_core::Rgb;
use image::{Rgba, RgbaImage};
use thiserror::Error;

pub mod geometry;
pub mod painter;
pub mod triangle;
pub mod export;

pub use export::{ExportConfig, HeatmapScene, MapExporter, SvgDocument, TriangleScene};
pub use geometry::{HeatmapGeometry, HeatmapMargin};
pub use painter::{paint_dense, paint_heatmap, paint_sparse, Coverage, PaintStats};
pub use triangle::{paint_triangle, TriangleStyle};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Container too small to draw: {width}x{height}")]
    EmptyGeometry { width: f64, height: f64 },
    #[error("Invalid range: {0}")]
    Range(#[from] foldrec_core::RangeError),
}

/// Destination for painted cells.
pub trait CellSink {
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb);

    fn fill_polygon(&mut self, points: &[Point], color: Rgb);
}

/// CPU pixel buffer, white unless another background is given.
#[derive(Debug, Clone)]
pub struct Raster {
    image: RgbaImage,
}

impl Raster {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, BACKGROUND)
    }

    pub fn filled(width: u32, height: u32, background: Rgb) -> Self {
        let [r, g, b] = background.0;
        Self { image: RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255])) }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Color at a pixel, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let p = self.image.get_pixel(x, y);
        Some(Rgb([p[0], p[1], p[2]]))
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.image
            .save(path)
            .with_context(|| format!("Failed to write PNG: {}", path.display()))?;
        log::info!("Wrote {}x{} PNG to {}", self.width(), self.height(), path.display());
        Ok(())
    }

    fn put(&mut self, x: i64, y: i64, color: Rgb) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        let [r, g, b] = color.0;
        self.image.put_pixel(x as u32, y as u32, Rgba([r, g, b, 255]));
    }
}

/// First and one-past-last pixel whose centre lies in `[lo, hi)`.
fn pixel_span(lo: f64, hi: f64) -> (i64, i64) {
    ((lo - 0.5).ceil() as i64, (hi - 0.5).ceil() as i64)
}

impl CellSink for Raster {
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb) {
        if !(width > 0.0 && height > 0.0) {
            return;
        }
        let (x0, x1) = pixel_span(x, x + width);
        let (y0, y1) = pixel_span(y, y + height);
        for py in y0.max(0)..y1.min(self.height() as i64) {
            for px in x0.max(0)..x1.min(self.width() as i64) {
                self.put(px, py, color);
            }
        }
    }

    fn fill_polygon(&mut self, points: &[Point], color: Rgb) {
        if points.len() < 3 {
            return;
        }
        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(x, y) in points {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
        let (x0, x1) = pixel_span(min_x, max_x);
        let (y0, y1) = pixel_span(min_y, max_y);
        for py in y0.max(0)..y1.min(self.height() as i64) {
            for px in x0.max(0)..x1.min(self.width() as i64) {
                if point_in_polygon((px as f64 + 0.5, py as f64 + 0.5), points) {
                    self.put(px, py, color);
                }
            }
        }
    }
}
