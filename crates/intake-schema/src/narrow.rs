//! Line grammars for INI and `.env` documents.
//!
//! Neither format has a standard grammar. Each checker accepts the subset
//! that ordinary configuration files use and rejects everything else with a
//! line number.

use crate::validator::SchemaViolation;

pub(crate) fn validate_ini(content: &str) -> Vec<SchemaViolation> {
    let mut errors = Vec::new();
    let mut after_entry = false;

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end_matches('\r');
        let body = line.trim();

        if body.is_empty() {
            after_entry = false;
            continue;
        }
        if body.starts_with('#') || body.starts_with(';') {
            continue;
        }

        // Indented lines continue the previous value.
        if line.starts_with([' ', '\t']) && after_entry {
            continue;
        }

        if body.starts_with('[') {
            let valid = body.ends_with(']') && body.len() > 2 && !body[1..body.len() - 1].trim().is_empty();
            if !valid {
                errors.push(SchemaViolation::at_line(line_no, "malformed section header"));
            }
            after_entry = false;
            continue;
        }

        match body.find(['=', ':']) {
            Some(pos) if !body[..pos].trim().is_empty() => after_entry = true,
            _ => {
                errors.push(SchemaViolation::at_line(
                    line_no,
                    format!("expected `key = value`, found `{}`", truncate(body)),
                ));
                after_entry = false;
            }
        }
    }

    errors
}

pub(crate) fn validate_env(content: &str) -> Vec<SchemaViolation> {
    let mut errors = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let body = raw.trim_end_matches('\r').trim();
        if body.is_empty() || body.starts_with('#') {
            continue;
        }

        let assignment = body.strip_prefix("export ").map(str::trim_start).unwrap_or(body);
        let valid = match assignment.split_once('=') {
            Some((name, value)) => is_env_name(name) && quotes_balanced(value),
            None => false,
        };
        if !valid {
            errors.push(SchemaViolation::at_line(
                idx + 1,
                format!("expected `NAME=value`, found `{}`", truncate(body)),
            ));
        }
    }

    errors
}

fn is_env_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn quotes_balanced(value: &str) -> bool {
    let value = value.trim();
    for quote in ['"', '\''] {
        if value.starts_with(quote) {
            return value.len() >= 2 && value[1..].contains(quote);
        }
    }
    true
}

fn truncate(text: &str) -> String {
    const MAX: usize = 40;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(MAX).collect::<String>())
    }
}
