//! YAML validation.
//!
//! Grammar is checked by `serde_yaml`; every document in the stream must
//! load, duplicate keys included. A policy pass runs first and rejects the
//! parts of YAML that let a document say more than it appears to:
//!
//! - tabs in indentation
//! - `%` directives
//! - anchors (`&`), aliases (`*`) and tags (`!`) in node position
//!
//! Block-scalar bodies and quoted scalars are content, not structure, and
//! are not subject to the policy pass.

use serde::Deserialize;

use crate::validator::SchemaViolation;

pub(crate) fn validate_yaml(content: &str) -> Vec<SchemaViolation> {
    let errors = policy_violations(content);
    if !errors.is_empty() {
        return errors;
    }
    parse_documents(content)
}

fn parse_documents(content: &str) -> Vec<SchemaViolation> {
    for document in serde_yaml::Deserializer::from_str(content) {
        if let Err(e) = serde_yaml::Value::deserialize(document) {
            let message = e.to_string();
            let violation = match e.location() {
                Some(location) => SchemaViolation::at_line(location.line(), message),
                None => SchemaViolation::document(message),
            };
            return vec![violation];
        }
    }
    Vec::new()
}

fn policy_violations(content: &str) -> Vec<SchemaViolation> {
    let mut errors = Vec::new();
    let mut scanner = NodeScanner::default();
    // Indentation of the line that opened the current block scalar.
    let mut block_scalar: Option<usize> = None;

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end_matches('\r');
        let body = line.trim_start_matches([' ', '\t']);
        if body.is_empty() {
            continue;
        }

        let spaces = line.len() - line.trim_start_matches(' ').len();
        if let Some(opener) = block_scalar {
            if spaces > opener {
                continue;
            }
            block_scalar = None;
        }

        if !scanner.in_quotes() {
            if line[..line.len() - body.len()].contains('\t') {
                errors.push(SchemaViolation::at_line(line_no, "tab in indentation"));
                continue;
            }
            if spaces == 0 && body.starts_with('%') {
                errors.push(SchemaViolation::at_line(line_no, "directives are not accepted"));
                continue;
            }
        }

        match scanner.scan_line(body) {
            Ok(true) => block_scalar = Some(spaces),
            Ok(false) => {}
            Err(message) => errors.push(SchemaViolation::at_line(line_no, message)),
        }
    }

    errors
}

/// Tracks where YAML nodes may begin, carrying quote and flow state across
/// lines.
#[derive(Debug, Default)]
struct NodeScanner {
    quote: Option<char>,
    flow_depth: usize,
}

impl NodeScanner {
    fn in_quotes(&self) -> bool {
        self.quote.is_some()
    }

    /// Scan one line body. Returns whether it opens a block scalar.
    fn scan_line(&mut self, body: &str) -> Result<bool, &'static str> {
        let chars: Vec<char> = body.chars().collect();
        let mut node_start = !self.in_quotes();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();
            let next_blank = next.map_or(true, char::is_whitespace);

            if let Some(q) = self.quote {
                match c {
                    '\'' if q == '\'' && next == Some('\'') => i += 1,
                    '\\' if q == '"' => i += 1,
                    _ if c == q => self.quote = None,
                    _ => {}
                }
                i += 1;
                continue;
            }

            match c {
                ' ' | '\t' => {}
                '#' if i == 0 || chars[i - 1] == ' ' => break,
                '"' | '\'' if node_start => {
                    self.quote = Some(c);
                    node_start = false;
                }
                '&' | '*' | '!' if node_start && !next_blank => {
                    return Err(match c {
                        '&' => "anchors are not accepted",
                        '*' => "aliases are not accepted",
                        _ => "tags are not accepted",
                    });
                }
                '|' | '>' if node_start && self.flow_depth == 0 => return Ok(true),
                '-' | '?' if node_start && next_blank => {}
                ':' if next_blank
                    || (self.flow_depth > 0 && matches!(next, Some(',' | ']' | '}'))) =>
                {
                    node_start = true
                }
                '[' | '{' if node_start => self.flow_depth += 1,
                ']' | '}' if self.flow_depth > 0 => {
                    self.flow_depth -= 1;
                    node_start = false;
                }
                ',' if self.flow_depth > 0 => node_start = true,
                _ => node_start = false,
            }
            i += 1;
        }

        Ok(false)
    }
}
