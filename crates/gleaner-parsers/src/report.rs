//! Generic flat-report parsing.
//!
//! A flat report is one header line naming fields, then one line per
//! record, with fields separated by an explicit delimiter.

use std::collections::BTreeMap;
use thiserror::Error;

/// Default field delimiter for flat reports.
///
/// Values routinely contain single punctuation characters (node
/// feature strings, reservation names), so the delimiter is a
/// multi-character sequence unlikely to appear in free-form cluster
/// configuration, never a single character like `|`.
pub const DEFAULT_DELIMITER: &str = "<|>";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Empty report: no header line")]
    MissingHeader,
    #[error("Line {line}: expected {expected} fields, got {actual}")]
    FieldCountMismatch {
        line: usize,
        expected: usize,
        actual: usize,
    },
}

/// Split one line on the delimiter, tolerating at most one trailing
/// empty field (a trailing delimiter with nothing after it).
fn split_line<'a>(line: &'a str, delimiter: &str, expected: usize) -> Vec<&'a str> {
    let mut values: Vec<&str> = line.split(delimiter).collect();
    if values.len() == expected + 1 && values.last() == Some(&"") {
        values.pop();
    }
    values
}

/// Parse a flat report into one field-name -> value map per record,
/// in encounter order.
///
/// Pure function of its input; each call re-parses from the start of
/// the provided text. Blank lines are skipped. Any field-count
/// mismatch beyond a single trailing empty field is fatal for the
/// whole report.
pub fn parse_flat_report(
    text: &str,
    delimiter: &str,
) -> Result<Vec<BTreeMap<String, String>>, ReportError> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header) = lines.next().ok_or(ReportError::MissingHeader)?;
    let mut fields: Vec<&str> = header.split(delimiter).collect();
    if fields.last() == Some(&"") {
        fields.pop();
    }

    let mut records = Vec::new();
    for (index, line) in lines {
        let values = split_line(line, delimiter, fields.len());
        if values.len() != fields.len() {
            return Err(ReportError::FieldCountMismatch {
                line: index + 1,
                expected: fields.len(),
                actual: values.len(),
            });
        }
        let record = fields
            .iter()
            .zip(values)
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        records.push(record);
    }
    Ok(records)
}
