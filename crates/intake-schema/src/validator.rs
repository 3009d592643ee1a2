//! # Schema Validation
//!
//! Structured content must be well-formed before its values are trusted.
//! The gate only depends on the [`SchemaValidator`] trait; the shipped
//! [`StructuralValidator`] is deliberately narrow and fails fast: anything
//! outside a small, predictable grammar is rejected rather than guessed at.
//!
//! | Syntax | Accepted |
//! |--------|----------|
//! | JSON | any document, nesting depth ≤ 64 |
//! | JSON Lines | one JSON document per non-blank line |
//! | TOML | any document the `toml` crate parses |
//! | YAML | every document `serde_yaml` loads, no duplicate keys; no tabs in indentation, anchors, aliases, tags or directives |
//! | INI | sections, `key = value` / `key: value`, comments, indented continuations |
//! | .env | `[export ]NAME=value`, comments |
//! | CSV / TSV | every record `csv` reads with the first record's field count, balanced quotes |

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::delimited;
use crate::format::{Classification, Syntax};
use crate::narrow;
use crate::yaml;

/// Maximum JSON nesting depth accepted.
pub const MAX_JSON_DEPTH: usize = 64;

/// One reason a document was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SchemaViolation {
    /// A problem tied to a 1-based line.
    #[error("line {line}: {message}")]
    AtLine { line: usize, message: String },

    /// A problem with the document as a whole.
    #[error("{message}")]
    Document { message: String },
}

impl SchemaViolation {
    pub fn at_line(line: usize, message: impl Into<String>) -> Self {
        SchemaViolation::AtLine {
            line,
            message: message.into(),
        }
    }

    pub fn document(message: impl Into<String>) -> Self {
        SchemaViolation::Document {
            message: message.into(),
        }
    }
}

/// Result of validating one document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<SchemaViolation>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    pub fn invalid(errors: Vec<SchemaViolation>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }

    fn from_errors(errors: Vec<SchemaViolation>) -> Self {
        if errors.is_empty() {
            Self::valid()
        } else {
            Self::invalid(errors)
        }
    }
}

/// Validates structured content.
///
/// Implementations must be deterministic and must not panic on hostile
/// input.
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, content: &str, classification: &Classification) -> ValidationOutcome;
}

/// Built-in narrow structural validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl StructuralValidator {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaValidator for StructuralValidator {
    fn validate(&self, content: &str, classification: &Classification) -> ValidationOutcome {
        let Some(syntax) = classification.syntax else {
            // Nothing structural to check.
            return ValidationOutcome::valid();
        };

        let errors = match syntax {
            Syntax::Json => validate_json(content),
            Syntax::JsonLines => validate_json_lines(content),
            Syntax::Toml => validate_toml(content),
            Syntax::Yaml => yaml::validate_yaml(content),
            Syntax::Ini => narrow::validate_ini(content),
            Syntax::Env => narrow::validate_env(content),
            Syntax::Csv => delimited::validate_delimited(content, b','),
            Syntax::Tsv => delimited::validate_delimited(content, b'\t'),
        };

        debug!("{:?} validation produced {} violation(s)", syntax, errors.len());
        ValidationOutcome::from_errors(errors)
    }
}

fn validate_json(content: &str) -> Vec<SchemaViolation> {
    match serde_json::from_str::<serde_json::Value>(content) {
        Ok(value) => check_depth(&value, 1)
            .map(|depth| {
                vec![SchemaViolation::document(format!(
                    "nesting depth {} exceeds {}",
                    depth, MAX_JSON_DEPTH
                ))]
            })
            .unwrap_or_default(),
        Err(e) => vec![SchemaViolation::at_line(e.line().max(1), e.to_string())],
    }
}

fn validate_json_lines(content: &str) -> Vec<SchemaViolation> {
    let mut errors = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<serde_json::Value>(line) {
            Ok(value) => {
                if let Some(depth) = check_depth(&value, 1) {
                    errors.push(SchemaViolation::at_line(
                        idx + 1,
                        format!("nesting depth {} exceeds {}", depth, MAX_JSON_DEPTH),
                    ));
                }
            }
            Err(e) => errors.push(SchemaViolation::at_line(idx + 1, e.to_string())),
        }
    }
    errors
}

/// Returns the offending depth if `value` nests deeper than the limit.
fn check_depth(value: &serde_json::Value, depth: usize) -> Option<usize> {
    if depth > MAX_JSON_DEPTH {
        return Some(depth);
    }
    let children: Box<dyn Iterator<Item = &serde_json::Value>> = match value {
        serde_json::Value::Array(items) => Box::new(items.iter()),
        serde_json::Value::Object(map) => Box::new(map.values()),
        _ => return None,
    };
    children.filter_map(|child| check_depth(child, depth + 1)).next()
}

fn validate_toml(content: &str) -> Vec<SchemaViolation> {
    match toml::from_str::<toml::Table>(content) {
        Ok(_) => Vec::new(),
        Err(e) => {
            let message = e.message().to_string();
            match e.span() {
                Some(span) => vec![SchemaViolation::at_line(line_of(content, span.start), message)],
                None => vec![SchemaViolation::document(message)],
            }
        }
    }
}

/// 1-based line containing `byte_offset`.
fn line_of(content: &str, byte_offset: usize) -> usize {
    let end = byte_offset.min(content.len());
    content.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::classify_identifier;

    fn check(id: &str, content: &str) -> ValidationOutcome {
        StructuralValidator::new().validate(content, &classify_identifier(id))
    }

    #[test]
    fn test_json_valid_and_invalid() {
        assert!(check("a.json", r#"{"name": "svc", "ports": [80, 443]}"#).valid);

        let outcome = check("a.json", "{\n  \"name\": \n}");
        assert!(!outcome.valid);
        assert!(matches!(outcome.errors[0], SchemaViolation::AtLine { line: 3, .. }));
    }

    #[test]
    fn test_json_depth_limit() {
        let ok = format!("{}{}", "[".repeat(MAX_JSON_DEPTH), "]".repeat(MAX_JSON_DEPTH));
        assert!(check("a.json", &ok).valid);

        let deep = format!("{}{}", "[".repeat(MAX_JSON_DEPTH + 1), "]".repeat(MAX_JSON_DEPTH + 1));
        let outcome = check("a.json", &deep);
        assert!(!outcome.valid);
        assert!(matches!(outcome.errors[0], SchemaViolation::Document { .. }));
    }

    #[test]
    fn test_json_lines_reports_each_bad_line() {
        let content = "{\"a\": 1}\n\nnot json\n{\"b\": 2}\n[unterminated";
        let outcome = check("events.jsonl", content);
        assert!(!outcome.valid);
        let lines: Vec<_> = outcome
            .errors
            .iter()
            .map(|e| match e {
                SchemaViolation::AtLine { line, .. } => *line,
                SchemaViolation::Document { .. } => 0,
            })
            .collect();
        assert_eq!(lines, vec![3, 5]);
    }

    #[test]
    fn test_toml_error_carries_line() {
        assert!(check("Cargo.toml", "[package]\nname = \"x\"\n").valid);

        let outcome = check("Cargo.toml", "[package]\nname = \"x\"\nversion = \n");
        assert!(!outcome.valid);
        assert!(matches!(outcome.errors[0], SchemaViolation::AtLine { line: 3, .. }));
    }

    #[test]
    fn test_free_text_not_validated() {
        let outcome = check("notes.md", "{ this is not json");
        assert!(outcome.valid);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_violation_display() {
        assert_eq!(
            SchemaViolation::at_line(4, "tab in indentation").to_string(),
            "line 4: tab in indentation"
        );
    }
}
