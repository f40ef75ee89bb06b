use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Genomic coordinate in base pairs
pub type GenomicPos = u64;

/// Default bin size for dense heatmaps and the triangle view
pub const DEFAULT_STEP: GenomicPos = 5_000;

/// Records with a false-discovery rate above this are not significant
pub const FDR_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("Invalid range: start ({start}) must be less than end ({end})")]
    Inverted { start: GenomicPos, end: GenomicPos },
    #[error("Bin size must be positive")]
    ZeroStep,
}

/// Interval currently displayed on one chromosome.
///
/// Always replaced, never edited: zooming produces a fresh value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenomicRange {
    pub start: GenomicPos,
    pub end: GenomicPos,
}

impl GenomicRange {
    pub fn new(start: GenomicPos, end: GenomicPos) -> Result<Self, RangeError> {
        if start >= end {
            return Err(RangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn span(&self) -> GenomicPos {
        self.end - self.start
    }

    /// Inclusive on both ends, matching how bin positions are filtered.
    pub fn contains(&self, pos: GenomicPos) -> bool {
        pos >= self.start && pos <= self.end
    }

    pub fn contains_pair(&self, i: GenomicPos, j: GenomicPos) -> bool {
        self.contains(i) && self.contains(j)
    }

    /// Snap outward to whole bins.
    pub fn snapped(&self, step: GenomicPos) -> Result<Self, RangeError> {
        if step == 0 {
            return Err(RangeError::ZeroStep);
        }
        let start = (self.start / step) * step;
        let end = self.end.div_ceil(step).saturating_mul(step);
        Self::new(start, end)
    }
}

impl std::fmt::Display for GenomicRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// One measured contact between two bins.
///
/// `fq` carries contact probability for Hi-C payloads and physical distance
/// for imaging payloads; `rawc` is the raw read count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    #[serde(alias = "ibp", alias = "x")]
    pub i: GenomicPos,
    #[serde(alias = "jbp", alias = "y")]
    pub j: GenomicPos,
    #[serde(default, alias = "value", alias = "distance")]
    pub fq: f64,
    #[serde(default)]
    pub rawc: f64,
    #[serde(default)]
    pub fdr: Option<f64>,
}

impl InteractionRecord {
    pub fn new(i: GenomicPos, j: GenomicPos, fq: f64, rawc: f64) -> Self {
        Self { i, j, fq, rawc, fdr: None }
    }

    pub fn with_fdr(mut self, fdr: f64) -> Self {
        self.fdr = Some(fdr);
        self
    }

    /// Backend rows use `fdr == -1 && rawc == -1` for a bin pair that was
    /// never measured.
    pub fn is_absent_sentinel(&self) -> bool {
        self.fdr == Some(-1.0) && self.rawc == -1.0
    }

    /// Significance gate shared by the gated modes. The sentinel and an
    /// insignificant fdr are deliberately treated the same.
    pub fn passes_gate(&self) -> bool {
        if self.is_absent_sentinel() {
            return false;
        }
        !matches!(self.fdr, Some(fdr) if fdr > FDR_THRESHOLD)
    }
}

/// How a cell value is read and colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueMode {
    #[default]
    Probability,
    RawCount,
    Distance,
    BinaryPresence,
}

/// Which record field a mode reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Fq,
    Rawc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorStrategy {
    /// Larger values are darker.
    Ramp,
    /// Larger values are lighter.
    InvertedRamp,
    /// Present or absent, no gradient.
    TwoTone,
}

/// Per-mode behaviour table, resolved once per paint pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeProfile {
    pub channel: Channel,
    pub gated: bool,
    pub strategy: ColorStrategy,
    /// Paint by iterating records instead of the full axis cross product.
    pub sparse: bool,
}

impl ModeProfile {
    pub fn extract(&self, record: &InteractionRecord) -> f64 {
        match self.channel {
            Channel::Fq => record.fq,
            Channel::Rawc => record.rawc,
        }
    }

    /// Value to color, or `None` when the cell paints as background.
    pub fn cell_value(&self, record: &InteractionRecord) -> Option<f64> {
        if self.gated && !record.passes_gate() {
            return None;
        }
        Some(self.extract(record))
    }
}

impl ValueMode {
    pub const ALL: [ValueMode; 4] = [
        ValueMode::Probability,
        ValueMode::RawCount,
        ValueMode::Distance,
        ValueMode::BinaryPresence,
    ];

    pub fn profile(self) -> ModeProfile {
        match self {
            ValueMode::Probability => ModeProfile {
                channel: Channel::Fq,
                gated: true,
                strategy: ColorStrategy::Ramp,
                sparse: false,
            },
            ValueMode::RawCount => ModeProfile {
                channel: Channel::Rawc,
                gated: true,
                strategy: ColorStrategy::Ramp,
                sparse: false,
            },
            ValueMode::Distance => ModeProfile {
                channel: Channel::Fq,
                gated: false,
                strategy: ColorStrategy::InvertedRamp,
                sparse: true,
            },
            ValueMode::BinaryPresence => ModeProfile {
                channel: Channel::Fq,
                gated: false,
                strategy: ColorStrategy::TwoTone,
                sparse: true,
            },
        }
    }

    /// Color range a freshly selected mode starts with. `None` means the
    /// observed data bounds.
    pub fn default_scale(self) -> Option<(f64, f64)> {
        match self {
            ValueMode::Probability => Some((0.0, 0.8)),
            ValueMode::RawCount => Some((0.0, 30.0)),
            ValueMode::Distance => None,
            ValueMode::BinaryPresence => Some((0.0, 1.0)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueMode::Probability => "probability",
            ValueMode::RawCount => "raw_count",
            ValueMode::Distance => "distance",
            ValueMode::BinaryPresence => "binary_presence",
        }
    }
}

impl std::fmt::Display for ValueMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_rejects_inverted() {
        assert!(GenomicRange::new(10, 10).is_err());
        assert_eq!(
            GenomicRange::new(20, 10),
            Err(RangeError::Inverted { start: 20, end: 10 })
        );
        let r = GenomicRange::new(100, 250).unwrap();
        assert_eq!(r.span(), 150);
        assert!(r.contains(100) && r.contains(250) && !r.contains(251));
    }

    #[test]
    fn test_snapped_range() {
        let r = GenomicRange::new(102_000, 148_000).unwrap();
        assert_eq!(r.snapped(5_000).unwrap(), GenomicRange { start: 100_000, end: 150_000 });
        assert_eq!(r.snapped(0), Err(RangeError::ZeroStep));
    }

    #[test]
    fn test_gate() {
        let rec = InteractionRecord::new(0, 5_000, 0.4, 12.0);
        assert!(rec.passes_gate());
        assert!(rec.with_fdr(0.05).passes_gate());
        assert!(!rec.with_fdr(0.051).passes_gate());

        let sentinel = InteractionRecord { rawc: -1.0, ..rec }.with_fdr(-1.0);
        assert!(sentinel.is_absent_sentinel());
        assert!(!sentinel.passes_gate());
    }

    #[test]
    fn test_profiles() {
        let rec = InteractionRecord::new(0, 5_000, 0.4, 12.0).with_fdr(0.2);
        assert_eq!(ValueMode::Probability.profile().cell_value(&rec), None);
        assert_eq!(ValueMode::RawCount.profile().cell_value(&rec), None);
        assert_eq!(ValueMode::Distance.profile().cell_value(&rec), Some(0.4));
        assert!(ValueMode::BinaryPresence.profile().sparse);
        assert!(!ValueMode::RawCount.profile().sparse);
    }

    #[test]
    fn test_record_aliases() {
        let rec: InteractionRecord = serde_json::from_str(
            r#"{"cell_line":"GM12878","chrid":"chr1","ibp":100000,"jbp":105000,"fq":0.42,"fdr":0.01,"rawc":7}"#,
        )
        .unwrap();
        assert_eq!((rec.i, rec.j), (100_000, 105_000));
        assert_eq!(rec.fdr, Some(0.01));
        assert_eq!(rec.rawc, 7.0);

        let sparse: InteractionRecord = serde_json::from_str(r#"{"x":5,"y":9,"value":1.5}"#).unwrap();
        assert_eq!((sparse.i, sparse.j, sparse.fq, sparse.fdr), (5, 9, 1.5, None));
    }
}
