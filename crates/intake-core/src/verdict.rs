//! Verdict types for content gate results.

use serde::{Deserialize, Serialize};

use intake_firewall::{
    EncodingKind, EncodingMatch, OverallScore, PatternMatch, RuleSeverity, ScoreReport,
};
use intake_schema::{Format, SchemaViolation};

/// The gate's decision for one piece of content.
///
/// - `Allowed`: structured, well-formed, no blocking hit. Safe to use.
/// - `Blocked`: obfuscated, malformed, or carrying a blocking signature.
/// - `HumanReview`: needs a person before it reaches the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Allowed,
    Blocked,
    HumanReview,
}

impl Decision {
    /// Returns true if this is an Allowed decision.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Returns true if this is a Blocked decision.
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked)
    }

    /// Returns true if this requires review.
    pub fn requires_review(&self) -> bool {
        matches!(self, Self::HumanReview)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allowed => "ALLOWED",
            Self::Blocked => "BLOCKED",
            Self::HumanReview => "HUMAN_REVIEW",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the decision from detector output alone.
///
/// Encoding hits and schema failures block; a blocking pattern hit blocks;
/// unstructured content always goes to review; everything else passes.
pub fn decide(
    matches: &[PatternMatch],
    encodings: &[EncodingMatch],
    schema_valid: bool,
    format: Format,
) -> Decision {
    if !encodings.is_empty() || !schema_valid {
        return Decision::Blocked;
    }
    if matches.iter().any(|m| m.severity == RuleSeverity::Block) {
        return Decision::Blocked;
    }
    if !format.is_structured() {
        return Decision::HumanReview;
    }
    Decision::Allowed
}

/// Complete, immutable result of one gate evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterVerdict {
    pub decision: Decision,

    /// Identifier the content was evaluated under.
    pub subject: String,

    pub format: Format,

    /// False only when a validator rejected the content.
    pub schema_valid: bool,

    /// Validator findings; informational only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schema_errors: Vec<SchemaViolation>,

    pub matches: Vec<PatternMatch>,

    pub encodings: Vec<EncodingMatch>,

    /// Present only when there is at least one match or encoding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring: Option<ScoreReport>,

    /// Version of the rule set that produced this verdict.
    pub rule_set_version: String,
}

impl FilterVerdict {
    /// Highest confidence and severity, if anything was detected.
    pub fn overall(&self) -> Option<OverallScore> {
        self.scoring.as_ref().and_then(|s| s.overall)
    }

    /// Distinct matched rule ids in first-seen order.
    pub fn matched_rule_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for m in &self.matches {
            if !ids.contains(&m.rule_id) {
                ids.push(m.rule_id.clone());
            }
        }
        ids
    }

    /// Distinct encoding kinds in first-seen order.
    pub fn encoding_kinds(&self) -> Vec<EncodingKind> {
        let mut kinds: Vec<EncodingKind> = Vec::new();
        for e in &self.encodings {
            if !kinds.contains(&e.kind) {
                kinds.push(e.kind);
            }
        }
        kinds
    }

    pub fn has_findings(&self) -> bool {
        !self.matches.is_empty() || !self.encodings.is_empty()
    }
}
