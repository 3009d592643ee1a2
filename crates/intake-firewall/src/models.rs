//! # Core Types for the Intake Firewall
//!
//! This module defines the data types shared by the detectors, the rule
//! loader and the confidence scorer: rule taxonomy, raw hits, scored
//! detections and load errors.
//!
//! ## Design Principles
//!
//! 1. **Exhaustive Classification** - every detection rule maps to exactly one
//!    [`Category`] and one [`RuleSeverity`]
//! 2. **Position Fidelity** - every hit carries a 1-based line and column into
//!    the original, untruncated text
//! 3. **Bounded Excerpts** - matched text is clipped before it leaves the
//!    detector so that verdicts never carry unbounded attacker input
//! 4. **Serializable** - all hit types derive Serde traits for audit trails

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of characters of matched text carried in a hit.
pub const MAX_EXCERPT_CHARS: usize = 80;

/// Marker appended to an excerpt that was clipped.
pub const ELLIPSIS: &str = "...";

/// Threat category of a detection rule.
///
/// | Variant | Attack Class |
/// |---------|--------------|
/// | `Injection` | Instruction override, role hijack, prompt extraction |
/// | `Exfiltration` | Moving data out of the agent's context |
/// | `ToolInvocation` | Unauthorized command or tool execution requests |
/// | `SensitiveData` | Credentials, keys and personal data leaking in |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Injection,
    Exfiltration,
    ToolInvocation,
    SensitiveData,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Injection => write!(f, "injection"),
            Category::Exfiltration => write!(f, "exfiltration"),
            Category::ToolInvocation => write!(f, "tool-invocation"),
            Category::SensitiveData => write!(f, "sensitive-data"),
        }
    }
}

/// Action severity attached to a detection rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    /// A match is sufficient to reject the content.
    Block,
    /// A match is recorded and scored but does not reject on its own.
    Review,
}

impl std::fmt::Display for RuleSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleSeverity::Block => write!(f, "block"),
            RuleSeverity::Review => write!(f, "review"),
        }
    }
}

/// Obfuscation encodings recognised by the encoding detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EncodingKind {
    Base64,
    UnicodeEscape,
    Hex,
    UrlEscape,
    HtmlEntity,
    MultiPartAssembly,
}

impl EncodingKind {
    /// Stable string form, also used to build synthetic detection ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodingKind::Base64 => "base64",
            EncodingKind::UnicodeEscape => "unicode-escape",
            EncodingKind::Hex => "hex",
            EncodingKind::UrlEscape => "url-escape",
            EncodingKind::HtmlEntity => "html-entity",
            EncodingKind::MultiPartAssembly => "multi-part-assembly",
        }
    }
}

impl std::fmt::Display for EncodingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity tier of a scored detection.
///
/// Variants are declared in ascending order so the derived [`Ord`] gives
/// `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityTier {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeverityTier::Low => write!(f, "LOW"),
            SeverityTier::Medium => write!(f, "MEDIUM"),
            SeverityTier::High => write!(f, "HIGH"),
            SeverityTier::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// A detection-rule hit inside scanned text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub rule_id: String,
    pub rule_name: String,
    pub category: Category,
    /// Effective severity. A downgraded placeholder hit reports `Review`.
    pub severity: RuleSeverity,
    /// Matched text, clipped to [`MAX_EXCERPT_CHARS`].
    pub matched_text: String,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
    /// Set when a block-severity hit was downgraded because the matched
    /// text looks like a placeholder value.
    #[serde(default)]
    pub placeholder_suppressed: bool,
}

/// An obfuscation-encoding hit inside scanned text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingMatch {
    pub kind: EncodingKind,
    /// Matched text, clipped to [`MAX_EXCERPT_CHARS`].
    pub matched_text: String,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
}

/// A hit converted to a confidence score and severity tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDetection {
    /// Rule id, or `encoding:<kind>` for encoding hits.
    pub rule_id: String,
    /// Confidence in `[0.0, 1.0]`.
    pub confidence: f64,
    pub severity: SeverityTier,
}

/// Clip `text` to at most `max_chars` characters, appending [`ELLIPSIS`]
/// when anything was removed.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Convert a byte offset within `line` into a 1-based character column.
pub(crate) fn column_of(line: &str, byte_offset: usize) -> usize {
    line[..byte_offset].chars().count() + 1
}

/// Errors raised while loading a rule set.
///
/// Any of these aborts the whole load: a rule set is either fully loaded or
/// not loaded at all.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The rule file could not be read.
    #[error("failed to read rule file: {0}")]
    Io(#[from] std::io::Error),

    /// The rule document is not well-formed TOML or has unknown fields.
    #[error("malformed rule document: {0}")]
    Parse(#[from] toml::de::Error),

    /// A rule entry failed validation.
    #[error("invalid rule '{id}': {reason}")]
    InvalidRule {
        /// Id of the offending rule (or its position when the id is empty)
        id: String,
        /// What was wrong with it
        reason: String,
    },

    /// A rule pattern did not compile.
    #[error("rule '{id}' pattern does not compile: {source}")]
    Compile {
        /// Id of the offending rule
        id: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// Two rules share an id.
    #[error("duplicate rule id '{0}'")]
    DuplicateId(String),
}

/// Result type alias for rule loading.
pub type Result<T> = std::result::Result<T, RuleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_short_text_unchanged() {
        assert_eq!(excerpt("hello", 80), "hello");
    }

    #[test]
    fn test_excerpt_clips_with_ellipsis() {
        let long = "a".repeat(100);
        let clipped = excerpt(&long, MAX_EXCERPT_CHARS);
        assert_eq!(clipped.chars().count(), MAX_EXCERPT_CHARS + ELLIPSIS.len());
        assert!(clipped.ends_with(ELLIPSIS));
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        let text = "é".repeat(90);
        let clipped = excerpt(&text, 80);
        assert!(clipped.starts_with(&"é".repeat(80)));
    }

    #[test]
    fn test_column_counts_characters() {
        let line = "ñandú ignore";
        let offset = line.find("ignore").unwrap();
        assert_eq!(column_of(line, offset), 7);
    }

    #[test]
    fn test_severity_tier_ordering() {
        assert!(SeverityTier::Critical > SeverityTier::High);
        assert!(SeverityTier::High > SeverityTier::Medium);
        assert!(SeverityTier::Medium > SeverityTier::Low);
    }

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&Category::ToolInvocation).unwrap();
        assert_eq!(json, "\"tool-invocation\"");
        let tier = serde_json::to_string(&SeverityTier::Critical).unwrap();
        assert_eq!(tier, "\"CRITICAL\"");
    }
}
