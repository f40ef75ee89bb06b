//! Command implementations for the FoldRec CLI

pub mod render;
pub mod triangle;
pub mod zoom;
pub mod ticks;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use foldrec_core::io::{read_coverage, read_records};
use foldrec_core::{GenomicPos, GenomicRange, InteractionRecord, ValueMode, ViewContext};

use crate::config::Config;
use crate::error::{CliError, CliResult};
use crate::{RenderFormat, ViewArgs};

/// Parse a position with an optional K/M/G suffix.
pub(crate) fn parse_position(pos: &str) -> Option<u64> {
    let pos = pos.trim().replace('_', "").replace(',', "").to_uppercase();
    let (num, scale) = if let Some(n) = pos.strip_suffix('K') {
        (n, 1_000.0)
    } else if let Some(n) = pos.strip_suffix('M') {
        (n, 1_000_000.0)
    } else if let Some(n) = pos.strip_suffix('G') {
        (n, 1_000_000_000.0)
    } else {
        return pos.parse::<u64>().ok();
    };
    let num: f64 = num.parse().ok()?;
    if !num.is_finite() || num < 0.0 {
        return None;
    }
    Some((num * scale).round() as u64)
}

/// Parse `start-end`, optionally prefixed with a contig name (`chr1:`).
pub(crate) fn parse_range(input: &str) -> CliResult<GenomicRange> {
    let body = input.rsplit_once(':').map_or(input, |(_, r)| r);
    let (start, end) = body
        .split_once('-')
        .ok_or_else(|| CliError::range(input, "expected 'start-end'"))?;
    let start = parse_position(start).ok_or_else(|| CliError::range(input, "invalid start"))?;
    let end = parse_position(end).ok_or_else(|| CliError::range(input, "invalid end"))?;
    GenomicRange::new(start, end).map_err(|e| CliError::range(input, e.to_string()))
}

/// Parse two comma-separated numbers such as a click or brush interval.
pub(crate) fn parse_pair(input: &str, what: &str) -> CliResult<(f64, f64)> {
    let parsed = input.split_once(',').and_then(|(a, b)| {
        let a: f64 = a.trim().parse().ok()?;
        let b: f64 = b.trim().parse().ok()?;
        Some((a, b))
    });
    match parsed {
        Some((a, b)) if a.is_finite() && b.is_finite() => Ok((a, b)),
        _ => Err(CliError::pair(what, input)),
    }
}

pub(crate) fn detect_render_format(path: &Path) -> RenderFormat {
    if let Some(extension) = path.extension() {
        match extension.to_string_lossy().to_lowercase().as_str() {
            "svg" => RenderFormat::Svg,
            "png" => RenderFormat::Png,
            _ => {
                log::warn!("Unknown output format, defaulting to SVG");
                RenderFormat::Svg
            }
        }
    } else {
        log::warn!("No file extension found, defaulting to SVG");
        RenderFormat::Svg
    }
}

pub(crate) fn resolve_step(config: &Config, step: Option<GenomicPos>) -> CliResult<GenomicPos> {
    match step.unwrap_or(config.view.step) {
        0 => Err(CliError::config("bin size (step) must be positive")),
        step => Ok(step),
    }
}

pub(crate) fn load_records(path: &PathBuf) -> Result<Vec<InteractionRecord>> {
    if !path.exists() {
        return Err(CliError::file_not_found(path.clone()).into());
    }
    read_records(path).with_context(|| format!("Failed to load records from {}", path.display()))
}

/// Build the shared view state for `args` and install its records as the
/// response to the initial fetch.
pub(crate) fn load_view(config: &Config, args: &ViewArgs) -> Result<ViewContext> {
    let range = parse_range(&args.range)?;
    let step = resolve_step(config, args.step)?;
    let mode: ValueMode = args.mode.map(Into::into).unwrap_or(config.view.mode);

    let mut view = ViewContext::new(range, step, mode)?;
    if let Some(path) = &args.coverage {
        if !path.exists() {
            return Err(CliError::file_not_found(path.clone()).into());
        }
        view.set_coverage(read_coverage(path)?);
    }

    let records = load_records(&args.input)?;
    let request = view.refresh();
    view.apply_response(request.id, records);
    log::info!(
        "Loaded {} records for {} ({} mode, {} bp bins)",
        view.records().len(),
        range,
        mode,
        step
    );

    let min = args.color_min.or(config.color.min);
    let max = args.color_max.or(config.color.max);
    match (min, max) {
        (Some(lo), Some(hi)) => view.set_color_bounds(lo, hi),
        (Some(lo), None) => view.set_color_min(lo),
        (None, Some(hi)) => view.set_color_max(hi),
        (None, None) => {}
    }
    Ok(view)
}
