//! CSV Codec
//!
//! A deliberately lenient reader for hand-edited spreadsheets: one record per
//! physical line, a header row naming the columns, and double-quoted fields
//! with doubled quotes for escapes. Unterminated quotes simply run to the end
//! of the line.

use std::borrow::Cow;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// A data row keyed by header name.
pub type CsvRow = FxHashMap<String, String>;

/// Tokenized fields of a single line.
pub type CsvFields = SmallVec<[String; 8]>;

/// Parse CSV text into rows keyed by the trimmed header names.
///
/// Blank lines are skipped. Data rows shorter than the header map the missing
/// columns to empty strings; surplus fields are dropped.
pub fn parse(text: &str) -> Vec<CsvRow> {
    let mut lines = text
        .split(['\r', '\n'])
        .filter(|line| !line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };

    let headers: Vec<String> = parse_line(header_line)
        .into_iter()
        .map(|name| name.trim().to_string())
        .collect();

    lines
        .map(|line| {
            let mut fields = parse_line(line).into_iter();

            headers
                .iter()
                .map(|name| (name.clone(), fields.next().unwrap_or_default()))
                .collect()
        })
        .collect()
}

/// Split one line into raw field values.
pub fn parse_line(line: &str) -> CsvFields {
    let mut fields = CsvFields::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if quoted && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }

    fields.push(current);

    fields
}

/// Quote a value when it contains a comma, quote or line break.
pub fn serialize_cell(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Join cells into a single CSV line, quoting where needed.
pub fn serialize_row<'a>(cells: impl IntoIterator<Item = &'a str>) -> String {
    cells
        .into_iter()
        .map(serialize_cell)
        .collect::<Vec<_>>()
        .join(",")
}
