//! Interaction record parsers.
//!
//! JSON input is an array of backend rows
//! (`{cell_line, chrid, ibp, jbp, fq, fdr, rawc}`; `x`/`y`/`value` also work).
//! Delimited input needs a header row naming the columns.

use std::io::{BufRead, Read, Write};

use thiserror::Error;

use crate::types::InteractionRecord;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Missing header row")]
    MissingHeader,
    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),
    #[error("Line {line}: invalid {column} value '{value}'")]
    InvalidField {
        line: usize,
        column: &'static str,
        value: String,
    },
    #[error("Line {line}: expected {expected} fields, got {got}")]
    ShortRow { line: usize, expected: usize, got: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Json,
    Csv,
    Tsv,
}

pub const DOWNLOAD_HEADER: [&str; 7] = ["cell_line", "chrid", "ibp", "jbp", "fq", "fdr", "rawc"];

pub fn parse_json<R: Read>(reader: R) -> Result<Vec<InteractionRecord>, RecordError> {
    Ok(serde_json::from_reader(reader)?)
}

struct Columns {
    i: usize,
    j: usize,
    fq: Option<usize>,
    rawc: Option<usize>,
    fdr: Option<usize>,
}

impl Columns {
    fn from_header(fields: &[&str]) -> Result<Self, RecordError> {
        let find = |names: &[&str]| {
            fields
                .iter()
                .position(|f| names.iter().any(|n| f.trim().eq_ignore_ascii_case(n)))
        };
        Ok(Self {
            i: find(&["ibp", "i", "x"]).ok_or(RecordError::MissingColumn("ibp"))?,
            j: find(&["jbp", "j", "y"]).ok_or(RecordError::MissingColumn("jbp"))?,
            fq: find(&["fq", "value", "distance"]),
            rawc: find(&["rawc"]),
            fdr: find(&["fdr"]),
        })
    }

    fn width(&self) -> usize {
        [Some(self.i), Some(self.j), self.fq, self.rawc, self.fdr]
            .into_iter()
            .flatten()
            .max()
            .map_or(0, |m| m + 1)
    }
}

/// Parse a header-led delimited file. Blank lines and `#` comments are
/// skipped; an empty `fdr` field means no significance was reported.
pub fn parse_delimited<R: BufRead>(reader: R, delimiter: u8) -> Result<Vec<InteractionRecord>, RecordError> {
    let delimiter = delimiter as char;
    let mut lines = reader.lines().enumerate();

    let columns = loop {
        let Some((_, line)) = lines.next() else {
            return Err(RecordError::MissingHeader);
        };
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = trimmed.split(delimiter).collect();
        break Columns::from_header(&fields)?;
    };
    let width = columns.width();

    let mut records = Vec::new();
    for (idx, line) in lines {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let line_no = idx + 1;
        let fields: Vec<&str> = trimmed.split(delimiter).map(str::trim).collect();
        if fields.len() < width {
            return Err(RecordError::ShortRow { line: line_no, expected: width, got: fields.len() });
        }

        // Coordinates may be written as floats ("105000.0") but must be
        // finite and non-negative.
        let int = |col: usize, name: &'static str| {
            let raw = fields[col];
            if let Ok(v) = raw.parse::<u64>() {
                return Ok(v);
            }
            match raw.parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => Ok(v.round() as u64),
                _ => Err(RecordError::InvalidField { line: line_no, column: name, value: raw.to_string() }),
            }
        };
        let float = |col: Option<usize>, name: &'static str| -> Result<Option<f64>, RecordError> {
            match col.map(|c| fields[c]) {
                None | Some("") => Ok(None),
                Some(raw) => raw.parse::<f64>().map(Some).map_err(|_| RecordError::InvalidField {
                    line: line_no,
                    column: name,
                    value: raw.to_string(),
                }),
            }
        };

        records.push(InteractionRecord {
            i: int(columns.i, "ibp")?,
            j: int(columns.j, "jbp")?,
            fq: float(columns.fq, "fq")?.unwrap_or(0.0),
            rawc: float(columns.rawc, "rawc")?.unwrap_or(0.0),
            fdr: float(columns.fdr, "fdr")?,
        });
    }
    Ok(records)
}

/// Write records in the download layout.
pub fn write_delimited<W: Write>(
    mut writer: W,
    records: &[InteractionRecord],
    cell_line: &str,
    chrid: &str,
    delimiter: u8,
) -> Result<(), RecordError> {
    let d = delimiter as char;
    writeln!(writer, "{}", DOWNLOAD_HEADER.join(&d.to_string()))?;
    for r in records {
        let fdr = r.fdr.map(|v| v.to_string()).unwrap_or_default();
        writeln!(
            writer,
            "{cell_line}{d}{chrid}{d}{}{d}{}{d}{}{d}{}{d}{}",
            r.i, r.j, r.fq, fdr, r.rawc
        )?;
    }
    Ok(())
}
