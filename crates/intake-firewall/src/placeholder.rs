//! Placeholder suppression.
//!
//! Documentation, sample configs and test fixtures are full of dummy
//! credentials (`sk-ant-xxxxxxxx`, `user@example.com`, `changeme`). Treating
//! them as real secrets would block most READMEs. Only `sensitive-data` hits
//! are tested; a command or instruction is never a placeholder. A matched
//! text is judged a placeholder when either:
//!
//! 1. it contains one of [`PLACEHOLDER_TOKENS`] (case-insensitive), or
//! 2. it starts with a known structured-secret prefix and the remainder is
//!    low-entropy filler: at least 80% of its characters drawn from
//!    `{x, X, *, 0}`.

/// Case-insensitive substrings marking dummy values.
pub const PLACEHOLDER_TOKENS: &[&str] = &[
    "test",
    "example",
    "sample",
    "dummy",
    "placeholder",
    "localhost",
    "127.0.0.1",
    "xxxx",
    "changeme",
    "change_me",
    "your-api-key",
    "your_api_key",
    "<your",
    "redacted",
    "fake",
];

/// Prefixes of vendor secrets with a recognisable structure.
///
/// Ordered longest-first within each vendor so the most specific prefix is
/// stripped.
pub const SECRET_PREFIXES: &[&str] = &[
    "sk-ant-api03-",
    "sk-ant-admin01-",
    "sk-ant-",
    "sk-proj-",
    "sk-svcacct-",
    "sk-",
    "github_pat_",
    "ghp_",
    "gho_",
    "ghu_",
    "ghs_",
    "ghr_",
    "xoxb-",
    "xoxp-",
    "xoxa-",
    "AKIA",
    "AIza",
    "glpat-",
    "hf_",
    "gsk_",
    "r8_",
];

/// Fraction of filler characters above which a secret remainder is dummy.
pub const FILLER_RATIO: f64 = 0.8;

/// Returns `true` if the matched text looks like a placeholder value.
pub fn is_placeholder(matched: &str) -> bool {
    let lowered = matched.to_lowercase();
    if PLACEHOLDER_TOKENS.iter().any(|t| lowered.contains(t)) {
        return true;
    }
    has_low_entropy_secret(matched)
}

/// Check whether `matched` contains a structured-secret prefix followed by
/// filler characters.
fn has_low_entropy_secret(matched: &str) -> bool {
    for prefix in SECRET_PREFIXES {
        if let Some(pos) = matched.find(prefix) {
            let remainder = &matched[pos + prefix.len()..];
            // Stop at the first delimiter so trailing context does not dilute the ratio.
            let remainder = remainder
                .split(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | ',' | ';'))
                .next()
                .unwrap_or("");
            return is_filler(remainder);
        }
    }
    false
}

fn is_filler(remainder: &str) -> bool {
    let total = remainder.chars().count();
    if total == 0 {
        return false;
    }
    let filler = remainder
        .chars()
        .filter(|c| matches!(c, 'x' | 'X' | '*' | '0'))
        .count();
    filler as f64 / total as f64 >= FILLER_RATIO
}
