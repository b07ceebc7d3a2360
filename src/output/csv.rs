//! Delimited text export
//!
//! Writes records as comma-separated lines under a fixed header. String
//! fields are always double-quoted and the reputation is a bare integer.

use crate::record::Record;
use crate::{ExportError, ExportResult};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Header line written before any record
pub const CSV_HEADER: &str = "Id,Name,Location,Reputation,Skill1,Skill2,Skill3";

/// How embedded double quotes in string fields are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuoteMode {
    /// Written as-is; a quote or comma inside a field can break the column layout
    #[default]
    Verbatim,
    /// Doubled, so readers that follow RFC 4180 recover the original text
    Escaped,
}

impl QuoteMode {
    /// Picks the mode from the `escape-quotes` setting
    pub fn from_escape_flag(escape_quotes: bool) -> Self {
        if escape_quotes {
            Self::Escaped
        } else {
            Self::Verbatim
        }
    }

    fn apply<'a>(&self, field: &'a str) -> Cow<'a, str> {
        match self {
            Self::Escaped if field.contains('"') => Cow::Owned(field.replace('"', "\"\"")),
            _ => Cow::Borrowed(field),
        }
    }
}

/// Writes `records` to `path`, replacing any existing content
///
/// Ids are 1-based and follow input order. The first failing write aborts the
/// export; lines already written stay in the file.
///
/// # Arguments
///
/// * `records` - Records in output order
/// * `path` - Destination file
/// * `mode` - Treatment of embedded quotes
pub fn write_records(records: &[Record], path: &Path, mode: QuoteMode) -> ExportResult<()> {
    let io_error = |source| ExportError::Io {
        path: path.display().to_string(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);

    write_csv(records, &mut writer, mode).map_err(io_error)?;
    writer.flush().map_err(io_error)?;

    tracing::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Writes the header and one line per record to `out`
pub fn write_csv<W: Write>(
    records: &[Record],
    out: &mut W,
    mode: QuoteMode,
) -> std::io::Result<()> {
    writeln!(out, "{}", CSV_HEADER)?;

    for (index, record) in records.iter().enumerate() {
        writeln!(
            out,
            "{},\"{}\",\"{}\",{},\"{}\",\"{}\",\"{}\"",
            index + 1,
            mode.apply(&record.name),
            mode.apply(&record.location),
            record.reputation,
            mode.apply(&record.tags[0]),
            mode.apply(&record.tags[1]),
            mode.apply(&record.tags[2]),
        )?;
    }

    Ok(())
}

/// Formats records as a CSV document in memory
pub fn format_csv(records: &[Record], mode: QuoteMode) -> String {
    let mut buffer = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_csv(records, &mut buffer, mode);
    String::from_utf8_lossy(&buffer).into_owned()
}
