//! Square heatmap rendering command

use anyhow::Result;
use std::path::PathBuf;

use foldrec_render::{HeatmapScene, MapExporter};

use super::{detect_render_format, load_records, load_view, parse_range};
use crate::config::Config;
use crate::error::CliError;
use crate::{RenderFormat, ViewArgs};

pub struct RenderArgs {
    pub view: ViewArgs,
    pub out: PathBuf,
    pub format: Option<RenderFormat>,
    pub comparison: Option<PathBuf>,
    pub gene: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub title: Option<String>,
}

pub fn execute(config: &Config, args: RenderArgs) -> Result<()> {
    let view = load_view(config, &args.view)?;
    let comparison = args.comparison.as_ref().map(load_records).transpose()?;
    let gene = args.gene.as_deref().map(parse_range).transpose()?;

    let mut scene = HeatmapScene::from_view(&view);
    scene.comparison = comparison.as_deref();
    scene.gene = gene;

    let mut export = config.export_config(
        args.width.unwrap_or(config.render.width),
        args.height.unwrap_or(config.render.height),
    );
    export.title = args.title;
    export.provenance_comment = Some(format!(
        "foldrec render {} ({})",
        args.view.input.display(),
        args.view.range
    ));
    let exporter = MapExporter::new(export);

    let format = args.format.unwrap_or_else(|| detect_render_format(&args.out));
    log::info!("Rendering heatmap of {} to {}", scene.range, args.out.display());

    match format {
        RenderFormat::Svg => {
            let svg = exporter.heatmap_svg(&scene).map_err(CliError::from)?;
            svg.write_to_file(&args.out)?;
        }
        RenderFormat::Png => {
            let raster = exporter.render_heatmap(&scene).map_err(CliError::from)?;
            raster.save_png(&args.out)?;
        }
    }

    println!("Heatmap written to {}", args.out.display());
    Ok(())
}
