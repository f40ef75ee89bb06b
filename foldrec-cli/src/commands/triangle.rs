//! Rotated half-matrix rendering command

use anyhow::Result;
use std::path::PathBuf;

use foldrec_core::triangle::{TriangleHalf, TriangleShading};
use foldrec_core::TrianglePicker;
use foldrec_render::{MapExporter, TriangleScene, TriangleStyle};

use super::{detect_render_format, load_records, load_view, parse_pair};
use crate::config::Config;
use crate::error::CliError;
use crate::{RenderFormat, ViewArgs};

pub struct TriangleArgs {
    pub view: ViewArgs,
    pub out: PathBuf,
    pub format: Option<RenderFormat>,
    pub comparison: Option<PathBuf>,
    pub size: Option<u32>,
    pub half: Option<TriangleHalf>,
    pub shading: Option<TriangleShading>,
    pub click: Option<String>,
}

pub fn execute(config: &Config, args: TriangleArgs) -> Result<()> {
    let view = load_view(config, &args.view)?;
    let comparison = args.comparison.as_ref().map(load_records).transpose()?;
    let click = args.click.as_deref().map(|c| parse_pair(c, "click")).transpose()?;

    let size = args.size.unwrap_or(config.triangle.size);
    let mut export = config.export_config(size, size);
    export.provenance_comment = Some(format!(
        "foldrec triangle {} ({})",
        args.view.input.display(),
        args.view.range
    ));
    let exporter = MapExporter::new(export);

    let mut scene = TriangleScene {
        records: view.records(),
        comparison: comparison.as_deref(),
        range: view.active_range(),
        step: view.step(),
        mode: view.mode(),
        scale: view.color_scale(),
        coverage: view.coverage(),
        style: TriangleStyle {
            half: args.half.unwrap_or(config.triangle.half),
            shading: args.shading.unwrap_or(config.triangle.shading),
        },
        selection: None,
    };

    if let Some(click) = click {
        let layout = scene.layout(exporter.config()).map_err(CliError::from)?;
        let mut picker = TrianglePicker::new();
        match picker.click(&layout, click) {
            Some(region) => println!("Selected {}-{}", region.start, region.end),
            None => println!("Click ({}, {}) is outside the triangle", click.0, click.1),
        }
        scene.selection = picker.selection().cloned();
    }

    let format = args.format.unwrap_or_else(|| detect_render_format(&args.out));
    log::info!(
        "Rendering {:?} triangle of {} to {}",
        scene.style.half,
        scene.range,
        args.out.display()
    );

    match format {
        RenderFormat::Svg => {
            let svg = exporter.triangle_svg(&scene).map_err(CliError::from)?;
            svg.write_to_file(&args.out)?;
        }
        RenderFormat::Png => {
            if scene.selection.is_some() {
                log::warn!("PNG output carries cells only; the selection outline is SVG-only");
            }
            let raster = exporter.render_triangle(&scene).map_err(CliError::from)?;
            raster.save_png(&args.out)?;
        }
    }

    println!("Triangle written to {}", args.out.display());
    Ok(())
}
