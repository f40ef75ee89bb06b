//! Brush-to-zoom command

use anyhow::Result;

use foldrec_render::HeatmapScene;

use super::{load_view, parse_pair};
use crate::config::Config;
use crate::error::CliError;
use crate::ViewArgs;

pub fn execute(config: &Config, view_args: ViewArgs, brush: Option<String>, width: Option<u32>) -> Result<()> {
    let mut view = load_view(config, &view_args)?;
    let selection = brush.as_deref().map(|b| parse_pair(b, "brush")).transpose()?;

    let width = width.unwrap_or(config.render.width);
    let export = config.export_config(width, width);
    let scale = HeatmapScene::from_view(&view)
        .geometry(&export)
        .map_err(CliError::from)?
        .x_scale()
        .clone();

    let request = match selection {
        Some(selection) => view.finish_brush(Some(selection), &scale),
        None => view.reset(),
    };

    println!("{}", request.range);
    Ok(())
}
