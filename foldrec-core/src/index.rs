//! Symmetric interaction lookup.
//!
//! Absence of a key means the bin pair was never measured, which is distinct
//! from a measured value of zero.

use std::collections::HashMap;

use crate::types::{GenomicPos, GenomicRange, InteractionRecord};

/// Anything a painter can query by bin pair.
pub trait CellLookup {
    fn get(&self, i: GenomicPos, j: GenomicPos) -> Option<&InteractionRecord>;

    /// Number of stored keys.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lookup over one record set where `(i, j)` and `(j, i)` answer alike.
#[derive(Debug, Clone, Default)]
pub struct InteractionIndex {
    cells: HashMap<(GenomicPos, GenomicPos), InteractionRecord>,
}

impl InteractionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert both key orders for every record. Later records overwrite
    /// earlier ones at the same pair.
    pub fn build(records: &[InteractionRecord]) -> Self {
        let mut index = Self {
            cells: HashMap::with_capacity(records.len() * 2),
        };
        for record in records {
            index.insert(*record);
        }
        log::debug!("Indexed {} records into {} cells", records.len(), index.cells.len());
        index
    }

    /// Like [`build`](Self::build) but keeps only records whose two
    /// coordinates both fall inside `range`.
    pub fn build_in_range(records: &[InteractionRecord], range: &GenomicRange) -> Self {
        let kept: Vec<InteractionRecord> = records
            .iter()
            .filter(|r| range.contains_pair(r.i, r.j))
            .copied()
            .collect();
        if kept.len() < records.len() {
            log::debug!("Dropped {} records outside {}", records.len() - kept.len(), range);
        }
        Self::build(&kept)
    }

    pub fn insert(&mut self, record: InteractionRecord) {
        self.cells.insert((record.i, record.j), record);
        self.cells.insert((record.j, record.i), record);
    }

    pub fn contains(&self, i: GenomicPos, j: GenomicPos) -> bool {
        self.cells.contains_key(&(i, j))
    }

    /// Smallest and largest value of `extract` over stored records.
    pub fn value_bounds<F>(&self, extract: F) -> Option<(f64, f64)>
    where
        F: Fn(&InteractionRecord) -> f64,
    {
        value_bounds(self.cells.values(), extract)
    }
}

impl CellLookup for InteractionIndex {
    fn get(&self, i: GenomicPos, j: GenomicPos) -> Option<&InteractionRecord> {
        self.cells.get(&(i, j))
    }

    fn len(&self) -> usize {
        self.cells.len()
    }
}

/// Two cell lines in one matrix: the primary set answers the `i < j` half
/// and the comparison set the `i >= j` half, each falling back to the other
/// when its own half has no record.
#[derive(Debug, Clone, Default)]
pub struct MergedIndex {
    primary: HashMap<(GenomicPos, GenomicPos), InteractionRecord>,
    comparison: HashMap<(GenomicPos, GenomicPos), InteractionRecord>,
}

impl MergedIndex {
    pub fn build(primary: &[InteractionRecord], comparison: &[InteractionRecord]) -> Self {
        let key = |r: &InteractionRecord| (r.i.min(r.j), r.i.max(r.j));
        Self {
            primary: primary.iter().map(|r| (key(r), *r)).collect(),
            comparison: comparison.iter().map(|r| (key(r), *r)).collect(),
        }
    }

    pub fn primary_len(&self) -> usize {
        self.primary.len()
    }

    pub fn comparison_len(&self) -> usize {
        self.comparison.len()
    }
}

impl CellLookup for MergedIndex {
    fn get(&self, i: GenomicPos, j: GenomicPos) -> Option<&InteractionRecord> {
        let key = (i.min(j), i.max(j));
        if i < j {
            self.primary.get(&key).or_else(|| self.comparison.get(&key))
        } else {
            self.comparison.get(&key).or_else(|| self.primary.get(&key))
        }
    }

    fn len(&self) -> usize {
        self.primary.len() + self.comparison.len()
    }
}

/// Min and max of `extract` over `records`, ignoring non-finite values.
pub fn value_bounds<'a, I, F>(records: I, extract: F) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a InteractionRecord>,
    F: Fn(&InteractionRecord) -> f64,
{
    records
        .into_iter()
        .map(extract)
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
