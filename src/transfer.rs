//! Import and Export Formats

use std::{path::Path, str::FromStr};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::{
    csv,
    effects::{Clock, IdGenerator},
    normalize::{RawFields, normalize},
    records::{Record, iso_timestamp},
};

/// Column order of CSV exports.
pub const CSV_HEADER: [&str; 6] = ["createdAt", "name", "phone", "price", "car", "reg"];

/// Errors raised while reading an import file.
#[derive(Debug, Error)]
pub enum ImportError {
    /// File extension is neither `.json` nor `.csv`.
    #[error("Unsupported file type {0:?}, use .json or .csv")]
    UnsupportedFormat(String),

    /// JSON text could not be parsed.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON parsed but was not an array of records.
    #[error("Invalid JSON: expected an array of records")]
    NotASequence,
}

/// Supported import file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    /// Array of record-like objects
    Json,
    /// Header row plus data rows
    Csv,
}

impl ImportFormat {
    /// Pick the format from a file extension, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .unwrap_or_default();

        extension.parse()
    }
}

impl FromStr for ImportFormat {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(ImportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Records recovered from an import file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedImport {
    /// Rows that normalized into records
    pub records: Vec<Record>,

    /// Rows rejected by the normalizer or not shaped like objects
    pub rejected: usize,
}

/// Parse and normalize an import file's contents.
///
/// A leading UTF-8 byte-order mark is ignored. Rejected rows are counted,
/// never fatal.
///
/// # Errors
///
/// Returns an [`ImportError`] when JSON text is malformed or not an array.
pub fn parse_import(
    format: ImportFormat,
    text: &str,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
) -> Result<ParsedImport, ImportError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut parsed = ParsedImport {
        records: Vec::new(),
        rejected: 0,
    };

    match format {
        ImportFormat::Json => {
            let Value::Array(elements) = serde_json::from_str::<Value>(text)? else {
                return Err(ImportError::NotASequence);
            };

            for element in elements {
                match element {
                    Value::Object(object) => parsed.accept(&object, clock, ids),
                    _ => parsed.rejected += 1,
                }
            }
        }
        ImportFormat::Csv => {
            for row in csv::parse(text) {
                parsed.accept(&row, clock, ids);
            }
        }
    }

    Ok(parsed)
}

impl ParsedImport {
    fn accept<R: RawFields + ?Sized>(
        &mut self,
        raw: &R,
        clock: &dyn Clock,
        ids: &dyn IdGenerator,
    ) {
        match normalize(raw, clock, ids) {
            Ok(record) => self.records.push(record),
            Err(error) => {
                debug!(%error, "rejected import row");
                self.rejected += 1;
            }
        }
    }
}

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Pretty-printed JSON array
    Json,
    /// CSV with a `createdAt,name,phone,price,car,reg` header
    Csv,
}

impl ExportFormat {
    /// Conventional file extension.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

/// Errors raised while exporting.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Records could not be encoded as JSON.
    #[error("failed to encode records")]
    Json(#[from] serde_json::Error),
}

/// Render records in the given export format.
///
/// # Errors
///
/// Returns an [`ExportError`] when JSON encoding fails.
pub fn export(records: &[Record], format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        ExportFormat::Csv => Ok(export_csv(records)),
    }
}

fn export_csv(records: &[Record]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);

    lines.push(CSV_HEADER.join(","));

    for record in records {
        let created_at = iso_timestamp(record.created_at);
        let price = record.price_text();

        lines.push(csv::serialize_row([
            created_at.as_str(),
            record.name.as_str(),
            record.phone.as_str(),
            price.as_str(),
            record.car.as_str(),
            record.reg.as_str(),
        ]));
    }

    lines.join("\n")
}
