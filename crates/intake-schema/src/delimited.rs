//! CSV / TSV record-shape validation.

use csv::{ErrorKind, ReaderBuilder};

use crate::validator::SchemaViolation;

/// Every record must have the first record's field count. Quoted fields may
/// span lines and escape quotes by doubling; an odd number of quote
/// characters means a field was left open.
pub(crate) fn validate_delimited(content: &str, delimiter: u8) -> Vec<SchemaViolation> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(false)
        .from_reader(content.as_bytes());

    let mut errors: Vec<SchemaViolation> = reader
        .records()
        .filter_map(|record| record.err())
        .map(|e| violation(&e))
        .collect();

    if content.matches('"').count() % 2 == 1 {
        errors.push(SchemaViolation::document("unbalanced quotes"));
    }

    errors
}

fn violation(err: &csv::Error) -> SchemaViolation {
    let message = match err.kind() {
        ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {} fields, found {}", expected_len, len),
        _ => err.to_string(),
    };
    match err.position() {
        Some(pos) => SchemaViolation::at_line(pos.line() as usize, message),
        None => SchemaViolation::document(message),
    }
}
