//! Shared view state for every panel drawn over one range.
//!
//! Panels never keep their own copy of the range, mode or color scale; they
//! read them from a [`ViewContext`] and recompute whenever it changes.

use crate::axis::{TickSet, ViewAxis};
use crate::brush::{BrushOutcome, ZoomController};
use crate::color::ColorScaleRange;
use crate::index::value_bounds;
use crate::scale::BandScale;
use crate::types::{GenomicPos, GenomicRange, InteractionRecord, RangeError, ValueMode};

/// Records wanted for a range, tagged so late responses can be recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub id: u64,
    pub range: GenomicRange,
}

/// Tags outgoing fetches and rejects any response that is not for the
/// newest one.
#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    next_id: u64,
    latest: Option<u64>,
    applied: Option<u64>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, range: GenomicRange) -> FetchRequest {
        self.next_id += 1;
        self.latest = Some(self.next_id);
        FetchRequest { id: self.next_id, range }
    }

    /// True only for the first response to the newest request.
    pub fn accept(&mut self, id: u64) -> bool {
        if self.latest != Some(id) || self.applied == Some(id) {
            return false;
        }
        self.applied = Some(id);
        true
    }

    /// A request is outstanding; the last raster stays on screen meanwhile.
    pub fn is_pending(&self) -> bool {
        self.latest.is_some() && self.latest != self.applied
    }
}

#[derive(Debug, Clone)]
pub struct ViewContext {
    zoom: ZoomController,
    step: GenomicPos,
    mode: ValueMode,
    color: ColorScaleRange,
    records: Vec<InteractionRecord>,
    coverage: Vec<GenomicRange>,
    sequencer: RequestSequencer,
}

impl ViewContext {
    pub fn new(base: GenomicRange, step: GenomicPos, mode: ValueMode) -> Result<Self, RangeError> {
        if step == 0 {
            return Err(RangeError::ZeroStep);
        }
        Ok(Self {
            zoom: ZoomController::new(base, step),
            step,
            mode,
            color: ColorScaleRange::for_mode(mode, None),
            records: Vec::new(),
            coverage: Vec::new(),
            sequencer: RequestSequencer::new(),
        })
    }

    pub fn base_range(&self) -> GenomicRange {
        self.zoom.base()
    }

    pub fn active_range(&self) -> GenomicRange {
        self.zoom.active()
    }

    pub fn step(&self) -> GenomicPos {
        self.step
    }

    pub fn mode(&self) -> ValueMode {
        self.mode
    }

    pub fn color_scale(&self) -> ColorScaleRange {
        self.color
    }

    pub fn records(&self) -> &[InteractionRecord] {
        &self.records
    }

    pub fn coverage(&self) -> &[GenomicRange] {
        &self.coverage
    }

    pub fn is_fetch_pending(&self) -> bool {
        self.sequencer.is_pending()
    }

    /// Axis and tick policy shared by every panel over this view.
    pub fn view_axis(&self) -> Result<ViewAxis, RangeError> {
        ViewAxis::resolve(&self.active_range(), self.step, self.mode, &[self.records.as_slice()])
    }

    pub fn axis(&self) -> Result<Vec<GenomicPos>, RangeError> {
        Ok(self.view_axis()?.values)
    }

    pub fn ticks(&self, available_px: f64) -> Result<TickSet, RangeError> {
        Ok(self.view_axis()?.ticks(available_px, &self.active_range()))
    }

    pub fn set_coverage(&mut self, coverage: Vec<GenomicRange>) {
        self.coverage = coverage;
    }

    /// Switching modes resets the color range to the new mode's default.
    pub fn set_mode(&mut self, mode: ValueMode) {
        self.mode = mode;
        self.color = ColorScaleRange::for_mode(mode, self.observed_bounds());
    }

    pub fn set_color_min(&mut self, value: f64) {
        self.color = self.color.with_min(value);
    }

    pub fn set_color_max(&mut self, value: f64) {
        self.color = self.color.with_max(value);
    }

    pub fn set_color_bounds(&mut self, min: f64, max: f64) {
        self.color = self.color.with_bounds(min, max);
    }

    /// Finish a brush and request records for whatever range it produced.
    pub fn finish_brush(&mut self, selection: Option<(f64, f64)>, scale: &BandScale) -> FetchRequest {
        let outcome = self.zoom.end(selection, scale);
        self.request(outcome)
    }

    pub fn reset(&mut self) -> FetchRequest {
        let outcome = self.zoom.reset();
        self.request(outcome)
    }

    /// Request records for the current active range without changing it.
    pub fn refresh(&mut self) -> FetchRequest {
        self.sequencer.issue(self.active_range())
    }

    /// Install a fetch response. Responses for anything but the newest
    /// request are dropped and the current records stay.
    pub fn apply_response(&mut self, request_id: u64, records: Vec<InteractionRecord>) -> bool {
        if !self.sequencer.accept(request_id) {
            log::debug!("Discarding stale response for request {}", request_id);
            return false;
        }
        log::debug!("Applying {} records for request {}", records.len(), request_id);
        self.records = records;
        if self.mode.default_scale().is_none() {
            self.color = ColorScaleRange::for_mode(self.mode, self.observed_bounds());
        }
        true
    }

    fn request(&mut self, outcome: BrushOutcome) -> FetchRequest {
        let request = self.sequencer.issue(outcome.range());
        log::info!("Requesting records for {} (request {})", request.range, request.id);
        request
    }

    fn observed_bounds(&self) -> Option<(f64, f64)> {
        let profile = self.mode.profile();
        value_bounds(&self.records, |r| profile.extract(r))
    }
}
