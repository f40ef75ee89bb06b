//! Record and coverage file loading
//!
//! Interaction records arrive either as the backend's JSON rows or as the
//! delimited download format, optionally gzip-compressed.

pub mod records;

pub use records::{parse_delimited, parse_json, write_delimited, RecordError, RecordFormat};

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;

use crate::types::{GenomicRange, InteractionRecord};

/// Open `path`, transparently decompressing `.gz` files.
pub fn open_reader<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader: Box<dyn BufRead> = if is_gzipped(path) {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

fn is_gzipped(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Detect the record format from the file name, ignoring a `.gz` suffix.
pub fn detect_format<P: AsRef<Path>>(path: P) -> Option<RecordFormat> {
    let name = path.as_ref().to_string_lossy().to_lowercase();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    if name.ends_with(".json") {
        Some(RecordFormat::Json)
    } else if name.ends_with(".csv") {
        Some(RecordFormat::Csv)
    } else if name.ends_with(".tsv") || name.ends_with(".txt") {
        Some(RecordFormat::Tsv)
    } else {
        None
    }
}

/// Load interaction records, picking the parser from the extension or, for
/// unknown extensions, from the first non-blank character.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<InteractionRecord>> {
    let path = path.as_ref();
    let mut reader = open_reader(path)?;
    let format = match detect_format(path) {
        Some(format) => format,
        None => sniff_format(&mut reader)?,
    };

    let records = match format {
        RecordFormat::Json => parse_json(reader),
        RecordFormat::Csv => parse_delimited(reader, b','),
        RecordFormat::Tsv => parse_delimited(reader, b'\t'),
    }
    .with_context(|| format!("Failed to parse records from {}", path.display()))?;

    log::info!("Loaded {} records from {} ({:?})", records.len(), path.display(), format);
    Ok(records)
}

fn sniff_format(reader: &mut Box<dyn BufRead>) -> Result<RecordFormat> {
    let buf = reader.fill_buf().context("Failed to read record file")?;
    let first = buf.iter().find(|b| !b.is_ascii_whitespace());
    let format = match first {
        Some(b'[') | Some(b'{') => RecordFormat::Json,
        _ if buf.contains(&b'\t') => RecordFormat::Tsv,
        _ => RecordFormat::Csv,
    };
    log::debug!("Detected record format {:?} from content", format);
    Ok(format)
}

/// Load covered intervals from a JSON array of `{start, end}` objects.
/// Entries with `start >= end` are skipped with a warning.
pub fn read_coverage<P: AsRef<Path>>(path: P) -> Result<Vec<GenomicRange>> {
    let path = path.as_ref();
    let mut content = String::new();
    open_reader(path)?
        .read_to_string(&mut content)
        .with_context(|| format!("Failed to read coverage file {}", path.display()))?;

    #[derive(serde::Deserialize)]
    struct RawRange {
        start: u64,
        end: u64,
    }
    let raw: Vec<RawRange> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse coverage file {}", path.display()))?;

    let mut ranges = Vec::with_capacity(raw.len());
    for r in raw {
        match GenomicRange::new(r.start, r.end) {
            Ok(range) => ranges.push(range),
            Err(e) => log::warn!("Skipping coverage entry: {}", e),
        }
    }
    Ok(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format("chr1.json"), Some(RecordFormat::Json));
        assert_eq!(detect_format("chr1.JSON.gz"), Some(RecordFormat::Json));
        assert_eq!(detect_format("chr1.csv"), Some(RecordFormat::Csv));
        assert_eq!(detect_format("chr1.tsv.gz"), Some(RecordFormat::Tsv));
        assert_eq!(detect_format("chr1.dat"), None);
    }
}
