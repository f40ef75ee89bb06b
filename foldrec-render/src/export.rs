/*!
# Map Export

PNG and SVG output for the heatmap and triangle views. SVG output carries
axis ticks, a color legend, gene or selection markers and an optional
provenance footer.
*/

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use foldrec_core::axis::{TickSet, ViewAxis};
use foldrec_core::color::{legend_stops, LegendStop};
use foldrec_core::index::{CellLookup, InteractionIndex, MergedIndex};
use foldrec_core::triangle::{Point, TriangleLayout, TriangleSubRegion};
use foldrec_core::{
    ColorScaleRange, GenomicPos, GenomicRange, InteractionRecord, Rgb, ValueMode, ViewContext,
};

use crate::geometry::{HeatmapGeometry, HeatmapMargin};
use crate::painter::{paint_dense, paint_heatmap, Coverage, PaintStats};
use crate::triangle::{paint_triangle, TriangleStyle};
use crate::{CellSink, Raster, RenderError};

/// Extra room under the triangle for its axis.
const TRIANGLE_AXIS_HEIGHT: f64 = 30.0;

/// Export configuration
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub width: u32,
    pub height: u32,
    pub margin: HeatmapMargin,
    pub show_legend: bool,
    pub show_axes: bool,
    pub show_footer: bool,
    pub title: Option<String>,
    pub background_color: String,
    pub font_family: String,
    pub font_size: u32,
    /// Gradient intervals in the legend; the legend has one more stop.
    pub legend_intervals: usize,
    /// Desired tick count on the triangle axis.
    pub triangle_ticks: usize,
    pub provenance_comment: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            margin: HeatmapMargin::default(),
            show_legend: true,
            show_axes: true,
            show_footer: true,
            title: None,
            background_color: "#ffffff".to_string(),
            font_family: "Arial, sans-serif".to_string(),
            font_size: 12,
            legend_intervals: 10,
            triangle_ticks: 6,
            provenance_comment: None,
        }
    }
}

/// Everything one heatmap picture depends on.
#[derive(Debug, Clone)]
pub struct HeatmapScene<'a> {
    pub records: &'a [InteractionRecord],
    /// Second cell line drawn in the lower half.
    pub comparison: Option<&'a [InteractionRecord]>,
    pub range: GenomicRange,
    pub step: GenomicPos,
    pub mode: ValueMode,
    pub scale: ColorScaleRange,
    pub coverage: &'a [GenomicRange],
    pub gene: Option<GenomicRange>,
}

impl<'a> HeatmapScene<'a> {
    pub fn from_view(view: &'a ViewContext) -> Self {
        Self {
            records: view.records(),
            comparison: None,
            range: view.active_range(),
            step: view.step(),
            mode: view.mode(),
            scale: view.color_scale(),
            coverage: view.coverage(),
            gene: None,
        }
    }

    fn in_range(&self, records: &[InteractionRecord]) -> Vec<InteractionRecord> {
        records
            .iter()
            .filter(|r| self.range.contains_pair(r.i, r.j))
            .copied()
            .collect()
    }

    /// Axis and tick policy, resolved the same way as
    /// [`ViewContext::view_axis`] with the comparison set included.
    pub fn view_axis(&self) -> Result<ViewAxis, RenderError> {
        let mut sets = vec![self.records];
        if let Some(comparison) = self.comparison {
            sets.push(comparison);
        }
        Ok(ViewAxis::resolve(&self.range, self.step, self.mode, &sets)?)
    }

    pub fn axis(&self) -> Result<Vec<GenomicPos>, RenderError> {
        Ok(self.view_axis()?.values)
    }

    /// Ticks along both heatmap axes for `geometry`.
    pub fn ticks(&self, geometry: &HeatmapGeometry) -> Result<TickSet, RenderError> {
        Ok(self.view_axis()?.ticks(geometry.plot_width(), &self.range))
    }

    pub fn geometry(&self, config: &ExportConfig) -> Result<HeatmapGeometry, RenderError> {
        let axis = self.axis()?;
        HeatmapGeometry::new(config.width as f64, config.height as f64, &axis, config.margin)
            .ok_or(RenderError::EmptyGeometry {
                width: config.width as f64,
                height: config.height as f64,
            })
    }

    pub fn paint<S: CellSink + ?Sized>(&self, sink: &mut S, geometry: &HeatmapGeometry) -> PaintStats {
        let coverage = Coverage::new(self.coverage);
        let primary = self.in_range(self.records);
        match self.comparison {
            Some(comparison) => {
                let merged = MergedIndex::build(&primary, &self.in_range(comparison));
                paint_dense(sink, geometry, &merged, self.mode, &self.scale, coverage)
            }
            None => paint_heatmap(sink, geometry, &primary, self.mode, &self.scale, coverage),
        }
    }
}

/// Everything one triangle picture depends on.
#[derive(Debug, Clone)]
pub struct TriangleScene<'a> {
    pub records: &'a [InteractionRecord],
    pub comparison: Option<&'a [InteractionRecord]>,
    pub range: GenomicRange,
    pub step: GenomicPos,
    pub mode: ValueMode,
    pub scale: ColorScaleRange,
    pub coverage: &'a [GenomicRange],
    pub style: TriangleStyle,
    pub selection: Option<TriangleSubRegion>,
}

impl<'a> TriangleScene<'a> {
    pub fn layout(&self, config: &ExportConfig) -> Result<TriangleLayout, RenderError> {
        TriangleLayout::new(config.width as f64, config.height as f64, self.range, self.step)?.ok_or(
            RenderError::EmptyGeometry {
                width: config.width as f64,
                height: config.height as f64,
            },
        )
    }

    fn lookup(&self) -> Box<dyn CellLookup> {
        match self.comparison {
            Some(comparison) => Box::new(MergedIndex::build(self.records, comparison)),
            None => Box::new(InteractionIndex::build_in_range(self.records, &self.range)),
        }
    }

    pub fn paint<S: CellSink + ?Sized>(&self, sink: &mut S, layout: &TriangleLayout) -> PaintStats {
        let lookup = self.lookup();
        paint_triangle(
            sink,
            layout,
            lookup.as_ref(),
            self.mode,
            &self.scale,
            Coverage::new(self.coverage),
            self.style,
        )
    }
}

/// SVG document built element by element.
pub struct SvgDocument {
    width: f64,
    height: f64,
    font_family: String,
    font_size: u32,
    defs: Vec<String>,
    elements: Vec<String>,
    top_comments: Vec<String>,
}

impl SvgDocument {
    pub fn new(width: f64, height: f64, config: &ExportConfig) -> Self {
        Self {
            width,
            height,
            font_family: config.font_family.clone(),
            font_size: config.font_size,
            defs: Vec::new(),
            elements: Vec::new(),
            top_comments: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn add_background(&mut self, color: &str) {
        self.elements.push(format!(
            r#"<rect width="{:.3}" height="{:.3}" fill="{}"/>"#,
            self.width,
            self.height,
            escape(color)
        ));
    }

    pub fn add_comment(&mut self, text: &str) {
        self.top_comments.push(text.replace("--", "- -"));
    }

    pub fn add_title(&mut self, title: &str) {
        self.elements.push(format!(
            r#"<text x="{:.3}" y="{}" font-family="{}" font-size="{}px" text-anchor="middle" font-weight="bold">{}</text>"#,
            self.width / 2.0,
            self.font_size,
            self.font_family,
            self.font_size + 2,
            escape(title)
        ));
    }

    pub fn add_line(&mut self, from: Point, to: Point, stroke: &str, dashed: bool) {
        let dash = if dashed { r#" stroke-dasharray="4 3""# } else { "" };
        self.elements.push(format!(
            r#"<line x1="{:.3}" y1="{:.3}" x2="{:.3}" y2="{:.3}" stroke="{}" stroke-width="1"{}/>"#,
            from.0, from.1, to.0, to.1, stroke, dash
        ));
    }

    pub fn add_text(&mut self, at: Point, anchor: &str, text: &str) {
        self.elements.push(format!(
            r#"<text x="{:.3}" y="{:.3}" font-family="{}" font-size="{}px" text-anchor="{}">{}</text>"#,
            at.0,
            at.1,
            self.font_family,
            self.font_size.saturating_sub(2),
            anchor,
            escape(text)
        ));
    }

    pub fn add_outline(&mut self, points: &[Point], stroke: &str) {
        self.elements.push(format!(
            r#"<polygon points="{}" fill="none" stroke="{}" stroke-width="2"/>"#,
            format_points(points),
            stroke
        ));
    }

    /// Horizontal gradient bar with the range ends labelled.
    pub fn add_legend(&mut self, stops: &[LegendStop], origin: Point, size: (f64, f64)) {
        let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
            return;
        };
        let id = format!("legend-{}", self.defs.len());
        let mut gradient = format!(r#"<linearGradient id="{}" x1="0" y1="0" x2="1" y2="0">"#, id);
        for stop in stops {
            let _ = write!(
                gradient,
                r#"<stop offset="{:.3}" stop-color="{}"/>"#,
                stop.offset,
                stop.color.to_hex()
            );
        }
        gradient.push_str("</linearGradient>");
        self.defs.push(gradient);

        let (x, y) = origin;
        let (w, h) = size;
        self.elements.push(format!(
            r#"<rect x="{:.3}" y="{:.3}" width="{:.3}" height="{:.3}" fill="url(#{})" stroke="black" stroke-width="0.5"/>"#,
            x, y, w, h, id
        ));
        self.add_text((x - 4.0, y + h), "end", &format_value(first.value));
        self.add_text((x + w + 4.0, y + h), "start", &format_value(last.value));
    }

    pub fn add_footer(&mut self, text: &str) {
        self.elements.push(format!(
            r#"<text x="10" y="{:.3}" font-family="{}" font-size="{}px" fill="gray">{}</text>"#,
            self.height - 4.0,
            self.font_family,
            self.font_size.saturating_sub(2),
            escape(text)
        ));
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        let _ = writeln!(
            out,
            r#"<svg width="{:.3}" height="{:.3}" viewBox="0 0 {:.3} {:.3}" xmlns="http://www.w3.org/2000/svg">"#,
            self.width, self.height, self.width, self.height
        );
        for c in &self.top_comments {
            for line in c.lines() {
                let _ = writeln!(out, "  <!-- {} -->", line);
            }
        }
        if !self.defs.is_empty() {
            out.push_str("  <defs>\n");
            for def in &self.defs {
                let _ = writeln!(out, "    {}", def);
            }
            out.push_str("  </defs>\n");
        }
        for element in &self.elements {
            let _ = writeln!(out, "  {}", element);
        }
        out.push_str("</svg>\n");
        out
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.render())
            .with_context(|| format!("Failed to write SVG: {}", path.display()))?;
        log::info!("Wrote SVG with {} elements to {}", self.elements.len(), path.display());
        Ok(())
    }
}

impl CellSink for SvgDocument {
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb) {
        self.elements.push(format!(
            r#"<rect x="{:.3}" y="{:.3}" width="{:.3}" height="{:.3}" fill="{}"/>"#,
            x,
            y,
            width,
            height,
            color.to_hex()
        ));
    }

    fn fill_polygon(&mut self, points: &[Point], color: Rgb) {
        self.elements.push(format!(
            r#"<polygon points="{}" fill="{}"/>"#,
            format_points(points),
            color.to_hex()
        ));
    }
}

fn format_points(points: &[Point]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{:.3},{:.3}", x, y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        format!("{:.2}", v)
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Writes heatmap and triangle pictures.
pub struct MapExporter {
    config: ExportConfig,
}

impl MapExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Raster filled with the configured background color.
    fn raster(&self, width: u32, height: u32) -> Raster {
        let background = Rgb::from_hex(&self.config.background_color).unwrap_or_else(|| {
            log::warn!("Unrecognised background color '{}', using white", self.config.background_color);
            Rgb::WHITE
        });
        Raster::filled(width, height, background)
    }

    /// Heatmap cells on a raster of the configured size.
    pub fn render_heatmap(&self, scene: &HeatmapScene<'_>) -> Result<Raster, RenderError> {
        let geometry = scene.geometry(&self.config)?;
        let mut raster = self.raster(self.config.width, self.config.height);
        scene.paint(&mut raster, &geometry);
        Ok(raster)
    }

    pub fn heatmap_svg(&self, scene: &HeatmapScene<'_>) -> Result<SvgDocument, RenderError> {
        let geometry = scene.geometry(&self.config)?;
        let mut svg = SvgDocument::new(self.config.width as f64, self.config.height as f64, &self.config);
        svg.add_background(&self.config.background_color);
        if let Some(comment) = &self.config.provenance_comment {
            svg.add_comment(comment);
        }
        scene.paint(&mut svg, &geometry);

        let m = geometry.margin();
        let (left, top) = (m.left, m.top);
        let (right, bottom) = (left + geometry.plot_width(), top + geometry.plot_height());

        if let Some(gene) = &scene.gene {
            match geometry.gene_markers(gene, scene.step) {
                Some((x0, x1)) => {
                    svg.add_line((x0, top), (x0, bottom), "#1f77b4", true);
                    svg.add_line((x1, top), (x1, bottom), "#1f77b4", true);
                }
                None => log::debug!("Gene {} is not on the axis, no markers", gene),
            }
        }

        if self.config.show_axes {
            let ticks = scene.ticks(&geometry)?;

            svg.add_line((left, bottom), (right, bottom), "black", false);
            for (x, label) in geometry.x_ticks(&ticks) {
                svg.add_line((x, bottom), (x, bottom + 5.0), "black", false);
                svg.add_text((x, bottom + 17.0), "middle", &label);
            }
            svg.add_line((left, top), (left, bottom), "black", false);
            for (y, label) in geometry.y_ticks(&ticks) {
                svg.add_line((left - 5.0, y), (left, y), "black", false);
                svg.add_text((left - 7.0, y + 4.0), "end", &label);
            }
        }

        if self.config.show_legend {
            let stops = legend_stops(&scene.scale, scene.mode, self.config.legend_intervals);
            let width = (geometry.plot_width() * 0.4).max(40.0);
            svg.add_legend(&stops, (left + 40.0, top - 20.0), (width, 10.0));
        }

        if let Some(title) = &self.config.title {
            svg.add_title(title);
        }
        if self.config.show_footer {
            svg.add_footer(&footer_text(scene.mode, &scene.range, scene.step));
        }
        Ok(svg)
    }

    pub fn export_heatmap_png<P: AsRef<Path>>(&self, path: P, scene: &HeatmapScene<'_>) -> Result<()> {
        let raster = self.render_heatmap(scene)?;
        raster.save_png(path)
    }

    pub fn export_heatmap_svg<P: AsRef<Path>>(&self, path: P, scene: &HeatmapScene<'_>) -> Result<()> {
        self.heatmap_svg(scene)?.write_to_file(path)
    }

    /// Triangle cells on a raster exactly the canvas size.
    pub fn render_triangle(&self, scene: &TriangleScene<'_>) -> Result<Raster, RenderError> {
        let layout = scene.layout(&self.config)?;
        let mut raster = self.raster(
            layout.canvas_width().ceil() as u32,
            layout.canvas_height().ceil() as u32,
        );
        scene.paint(&mut raster, &layout);
        Ok(raster)
    }

    pub fn triangle_svg(&self, scene: &TriangleScene<'_>) -> Result<SvgDocument, RenderError> {
        let layout = scene.layout(&self.config)?;
        let (cw, ch) = (layout.canvas_width(), layout.canvas_height());
        let mut svg = SvgDocument::new(cw, ch + TRIANGLE_AXIS_HEIGHT, &self.config);
        svg.add_background(&self.config.background_color);
        if let Some(comment) = &self.config.provenance_comment {
            svg.add_comment(comment);
        }
        scene.paint(&mut svg, &layout);

        if let Some(region) = &scene.selection {
            svg.add_outline(&region.highlight, "#1f77b4");
            let (x0, x1) = layout.marker_positions(region);
            svg.add_line((x0, ch), (x0, ch + 8.0), "#1f77b4", false);
            svg.add_line((x1, ch), (x1, ch + 8.0), "#1f77b4", false);
        }

        if self.config.show_axes {
            svg.add_line((0.0, ch), (cw, ch), "black", false);
            for (x, label) in layout.axis_ticks(self.config.triangle_ticks) {
                svg.add_line((x, ch), (x, ch + 5.0), "black", false);
                svg.add_text((x, ch + 17.0), "middle", &label);
            }
        }

        if self.config.show_legend {
            let stops = legend_stops(&scene.scale, scene.mode, self.config.legend_intervals);
            svg.add_legend(&stops, (40.0, 10.0), ((cw * 0.2).max(40.0), 10.0));
        }
        if let Some(title) = &self.config.title {
            svg.add_title(title);
        }
        if self.config.show_footer {
            svg.add_footer(&footer_text(scene.mode, &scene.range, scene.step));
        }
        Ok(svg)
    }

    pub fn export_triangle_png<P: AsRef<Path>>(&self, path: P, scene: &TriangleScene<'_>) -> Result<()> {
        let raster = self.render_triangle(scene)?;
        raster.save_png(path)
    }

    pub fn export_triangle_svg<P: AsRef<Path>>(&self, path: P, scene: &TriangleScene<'_>) -> Result<()> {
        self.triangle_svg(scene)?.write_to_file(path)
    }
}

fn footer_text(mode: ValueMode, range: &GenomicRange, step: GenomicPos) -> String {
    format!(
        "FoldRec v{} | Mode: {} | Range: {} | Bin: {} bp | Generated: {}",
        foldrec_core::VERSION,
        mode,
        range,
        step,
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<InteractionRecord> {
        vec![
            InteractionRecord::new(100_000, 105_000, 0.4, 3.0).with_fdr(0.01),
            InteractionRecord::new(110_000, 120_000, 0.6, 9.0).with_fdr(0.2),
            InteractionRecord::new(900_000, 905_000, 0.6, 9.0),
        ]
    }

    fn scene(records: &[InteractionRecord], mode: ValueMode) -> HeatmapScene<'_> {
        HeatmapScene {
            records,
            comparison: None,
            range: GenomicRange::new(100_000, 150_000).unwrap(),
            step: 5_000,
            mode,
            scale: ColorScaleRange::for_mode(mode, None),
            coverage: &[],
            gene: None,
        }
    }

    fn quiet_config() -> ExportConfig {
        ExportConfig { width: 600, height: 600, show_footer: false, ..ExportConfig::default() }
    }

    #[test]
    fn test_sparse_axis_ignores_out_of_range() {
        let recs = records();
        let s = scene(&recs, ValueMode::Distance);
        assert_eq!(s.axis().unwrap(), vec![100_000, 105_000, 110_000, 120_000]);
        let dense = scene(&recs, ValueMode::Probability);
        assert_eq!(dense.axis().unwrap().len(), 11);
    }

    #[test]
    fn test_empty_sparse_scene_uses_grid() {
        let s = scene(&[], ValueMode::BinaryPresence);
        assert!(!s.view_axis().unwrap().sparse);
        assert_eq!(s.axis().unwrap().len(), 11);
    }

    #[test]
    fn test_heatmap_ticks_match_view_context() {
        let cases = [
            (
                GenomicRange::new(0, 300_000).unwrap(),
                vec![
                    InteractionRecord::new(0, 30_000, 150.0, 0.0),
                    InteractionRecord::new(30_000, 90_000, 400.0, 0.0),
                    InteractionRecord::new(0, 1_200_000, 900.0, 0.0),
                ],
            ),
            (GenomicRange::new(0, 3_000_000).unwrap(), Vec::new()),
        ];
        for (base, recs) in cases {
            let mut view = ViewContext::new(base, 30_000, ValueMode::Distance).unwrap();
            let req = view.refresh();
            view.apply_response(req.id, recs);

            let s = HeatmapScene::from_view(&view);
            let geometry = s.geometry(&quiet_config()).unwrap();
            let rendered = s.ticks(&geometry).unwrap();
            assert_eq!(rendered, view.ticks(geometry.plot_width()).unwrap());
            assert!(rendered.values.iter().all(|&v| v <= base.end));
        }
    }

    #[test]
    fn test_png_background_follows_config() {
        let recs = records();
        let dark = MapExporter::new(ExportConfig { background_color: "#202020".to_string(), ..quiet_config() });
        let raster = dark.render_heatmap(&scene(&recs, ValueMode::Probability)).unwrap();
        assert_eq!(raster.pixel(0, 0), Some(Rgb([0x20, 0x20, 0x20])));

        let bad = MapExporter::new(ExportConfig { background_color: "dark".to_string(), ..quiet_config() });
        let raster = bad.render_heatmap(&scene(&recs, ValueMode::Probability)).unwrap();
        assert_eq!(raster.pixel(0, 0), Some(Rgb::WHITE));
    }

    #[test]
    fn test_heatmap_svg_contents() {
        let recs = records();
        let exporter = MapExporter::new(quiet_config());
        let svg = exporter.heatmap_svg(&scene(&recs, ValueMode::Probability)).unwrap().render();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("<linearGradient"));
        assert_eq!(svg.matches("<stop ").count(), 11);
        assert!(svg.contains(">10.000W</text>"));
        assert!(svg.contains(">12.500W</text>"));
        assert!(!svg.contains("Generated"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_gene_markers_drawn() {
        let recs = records();
        let mut s = scene(&recs, ValueMode::Probability);
        s.gene = Some(GenomicRange::new(112_000, 118_000).unwrap());
        let exporter = MapExporter::new(quiet_config());
        let svg = exporter.heatmap_svg(&s).unwrap().render();
        assert_eq!(svg.matches("stroke-dasharray").count(), 2);
    }

    #[test]
    fn test_too_small_is_error() {
        let recs = records();
        let exporter = MapExporter::new(ExportConfig { width: 50, height: 50, ..ExportConfig::default() });
        assert!(matches!(
            exporter.render_heatmap(&scene(&recs, ValueMode::Probability)),
            Err(RenderError::EmptyGeometry { .. })
        ));
    }

    #[test]
    fn test_triangle_svg_highlight() {
        let recs = records();
        let range = GenomicRange::new(100_000, 150_000).unwrap();
        let config = quiet_config();
        let mut tri = TriangleScene {
            records: &recs,
            comparison: None,
            range,
            step: 5_000,
            mode: ValueMode::Probability,
            scale: ColorScaleRange::for_mode(ValueMode::Probability, None),
            coverage: &[],
            style: TriangleStyle::default(),
            selection: None,
        };
        let layout = tri.layout(&config).unwrap();
        tri.selection = layout.pick((layout.canvas_width() / 2.0, layout.canvas_height() / 2.0));
        assert!(tri.selection.is_some());

        let svg = MapExporter::new(config).triangle_svg(&tri).unwrap().render();
        assert!(svg.contains(r##"fill="none" stroke="#1f77b4""##));
        assert!(svg.contains(">0.100M</text>"));
        assert!(svg.contains(">0.150M</text>"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
