//! Brush-to-zoom state machine.

use serde::{Deserialize, Serialize};

use crate::scale::BandScale;
use crate::types::{GenomicPos, GenomicRange};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BrushState {
    #[default]
    Idle,
    Brushing { origin: f64, current: f64 },
}

/// What a finished brush did to the active range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrushOutcome {
    Zoomed(GenomicRange),
    Reset(GenomicRange),
}

impl BrushOutcome {
    pub fn range(&self) -> GenomicRange {
        match self {
            BrushOutcome::Zoomed(r) | BrushOutcome::Reset(r) => *r,
        }
    }
}

/// Axis values under `[x0, x1]` turned into a range.
///
/// A single hit has nothing to span, so it widens to one bin.
pub fn range_from_selection(
    scale: &BandScale,
    x0: f64,
    x1: f64,
    step: GenomicPos,
) -> Option<GenomicRange> {
    let hits = scale.values_in(x0, x1);
    let first = *hits.first()?;
    let last = *hits.last()?;
    let end = if last > first { last } else { first.saturating_add(step.max(1)) };
    GenomicRange::new(first, end).ok()
}

/// Holds the base and active ranges and turns drags into range changes.
#[derive(Debug, Clone)]
pub struct ZoomController {
    base: GenomicRange,
    active: GenomicRange,
    step: GenomicPos,
    state: BrushState,
}

impl ZoomController {
    pub fn new(base: GenomicRange, step: GenomicPos) -> Self {
        Self { base, active: base, step, state: BrushState::Idle }
    }

    pub fn base(&self) -> GenomicRange {
        self.base
    }

    pub fn active(&self) -> GenomicRange {
        self.active
    }

    pub fn state(&self) -> BrushState {
        self.state
    }

    /// Start a drag. Any unfinished drag is dropped.
    pub fn begin(&mut self, x: f64) {
        self.state = BrushState::Brushing { origin: x, current: x };
    }

    pub fn drag(&mut self, x: f64) {
        if let BrushState::Brushing { origin, .. } = self.state {
            self.state = BrushState::Brushing { origin, current: x };
        }
    }

    /// Finish the current drag with the pixel selection it produced.
    /// `None`, or a selection covering no band centre, returns to the base
    /// range rather than stepping back one zoom level.
    pub fn end(&mut self, selection: Option<(f64, f64)>, scale: &BandScale) -> BrushOutcome {
        self.state = BrushState::Idle;
        let zoomed = selection.and_then(|(x0, x1)| range_from_selection(scale, x0, x1, self.step));
        match zoomed {
            Some(range) => {
                log::debug!("Brush zoomed to {}", range);
                self.active = range;
                BrushOutcome::Zoomed(range)
            }
            None => self.reset(),
        }
    }

    /// Finish the drag using the pixels recorded by `begin`/`drag`.
    pub fn end_drag(&mut self, scale: &BandScale) -> BrushOutcome {
        let selection = match self.state {
            BrushState::Brushing { origin, current } if origin != current => Some((origin, current)),
            _ => None,
        };
        self.end(selection, scale)
    }

    pub fn reset(&mut self) -> BrushOutcome {
        self.state = BrushState::Idle;
        self.active = self.base;
        BrushOutcome::Reset(self.base)
    }
}
