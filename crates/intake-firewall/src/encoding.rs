//! # Obfuscation Encoding Detector
//!
//! Scans raw text for reversible encodings used to hide payloads from
//! literal pattern matching: base64 blobs, `\uXXXX` and `\xNN` escape runs,
//! percent-escape runs, numeric HTML entities and string-fragment assembly.
//!
//! Content carrying any of these is rejected outright by the gate; it is
//! never decoded and re-scanned. That makes false positives expensive, so two
//! suppression heuristics apply:
//!
//! | Rule kind | Heuristic |
//! |-----------|-----------|
//! | `base64` | Long camelCase/PascalCase/snake_case identifiers are source code, not payloads |
//! | `url-escape` | Percent-escapes inside an `http(s)://` token are ordinary query strings |
//!
//! Every line is scanned independently per rule and every occurrence is
//! reported, not just the first.

use crate::models::{column_of, excerpt, EncodingKind, EncodingMatch, MAX_EXCERPT_CHARS};
use crate::rules::EncodingRule;

/// Minimum number of segments for a candidate to be judged an identifier.
pub const MIN_IDENTIFIER_SEGMENTS: usize = 3;

/// Scan `text` with every encoding rule, returning all hits in line order.
pub fn scan_encodings(text: &str, rules: &[EncodingRule]) -> Vec<EncodingMatch> {
    let mut hits = Vec::new();
    if rules.is_empty() {
        return hits;
    }

    for (idx, line) in text.lines().enumerate() {
        for rule in rules {
            for m in rule.regex().find_iter(line) {
                let candidate = m.as_str();

                if let Some(min) = rule.min_length() {
                    if candidate.chars().count() < min {
                        continue;
                    }
                }

                let suppressed = match rule.kind() {
                    EncodingKind::Base64 => looks_like_identifier(candidate),
                    EncodingKind::UrlEscape => inside_url_token(line, m.start()),
                    _ => false,
                };
                if suppressed {
                    continue;
                }

                hits.push(EncodingMatch {
                    kind: rule.kind(),
                    matched_text: excerpt(candidate, MAX_EXCERPT_CHARS),
                    line: idx + 1,
                    column: column_of(line, m.start()),
                });
            }
        }
    }

    hits
}

/// Returns `true` if a base64-shaped candidate is really a source-code
/// identifier such as `getUserAccountSettingsFromRemoteServer`.
///
/// The candidate must have no `=` padding, no `+` or `/`, no digits, and
/// split into at least [`MIN_IDENTIFIER_SEGMENTS`] word segments, each either
/// all lowercase or a single capital followed by lowercase letters.
pub fn looks_like_identifier(candidate: &str) -> bool {
    if candidate
        .chars()
        .any(|c| matches!(c, '=' | '+' | '/') || c.is_ascii_digit())
    {
        return false;
    }

    let mut segments = 0;
    for part in candidate.split('_').filter(|p| !p.is_empty()) {
        for segment in split_case(part) {
            if !is_word_segment(segment) {
                return false;
            }
            segments += 1;
        }
    }
    segments >= MIN_IDENTIFIER_SEGMENTS
}

/// Split at every uppercase letter.
fn split_case(part: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, c) in part.char_indices() {
        if c.is_ascii_uppercase() && i > start {
            out.push(&part[start..i]);
            start = i;
        }
    }
    if start < part.len() {
        out.push(&part[start..]);
    }
    out
}

fn is_word_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => chars.all(|c| c.is_ascii_lowercase()),
        Some(first) if first.is_ascii_uppercase() => {
            let rest = chars.as_str();
            !rest.is_empty() && rest.chars().all(|c| c.is_ascii_lowercase())
        }
        _ => false,
    }
}

/// Returns `true` if the text immediately before `start` on this line is an
/// unterminated `http://` or `https://` token.
fn inside_url_token(line: &str, start: usize) -> bool {
    let prefix = &line[..start];
    let token_start = prefix
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace() || matches!(c, '"' | '\'' | '<' | '>' | '(' | ')'))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let token = prefix[token_start..].to_ascii_lowercase();
    token.contains("http://") || token.contains("https://")
}
