//! Axis tick listing command

use anyhow::Result;
use std::path::PathBuf;

use foldrec_core::{ValueMode, ViewContext};

use super::{load_records, parse_range, resolve_step};
use crate::config::Config;
use crate::ModeArg;

pub fn execute(
    config: &Config,
    range: &str,
    step: Option<u64>,
    width: f64,
    input: Option<PathBuf>,
    mode: Option<ModeArg>,
) -> Result<()> {
    let range = parse_range(range)?;
    let step = resolve_step(config, step)?;
    let mode: ValueMode = mode.map(Into::into).unwrap_or(config.view.mode);

    let mut view = ViewContext::new(range, step, mode)?;
    if let Some(path) = &input {
        let records = load_records(path)?;
        let request = view.refresh();
        view.apply_response(request.id, records);
    }

    let ticks = view.ticks(width)?;
    log::debug!("{} ticks with stride {}", ticks.len(), ticks.stride);
    for (value, label) in ticks.values.iter().zip(ticks.labels()) {
        println!("{}\t{}", value, label);
    }
    Ok(())
}
