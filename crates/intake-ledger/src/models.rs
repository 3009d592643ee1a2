//! # Data Models for the Intake Ledger
//!
//! Decision vocabulary after human involvement, ledger records, and the
//! error types for each downstream stage.
//!
//! | Decision | Origin | Content may proceed |
//! |----------|--------|---------------------|
//! | `ALLOWED` | gate | yes |
//! | `BLOCKED` | gate | no |
//! | `HUMAN_REVIEW` | gate | no, until resolved |
//! | `OVERRIDE` | reviewer, from `BLOCKED` | yes |
//! | `HUMAN_APPROVED` | reviewer, from `HUMAN_REVIEW` | yes |
//! | `HUMAN_REJECTED` | reviewer, from `HUMAN_REVIEW` | no |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use intake_core::{Decision, EncodingKind, Format};

/// Hex-encoded SHA-256 of the first entry's predecessor.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Hex-encoded SHA-256 fingerprint of `content`.
pub fn fingerprint(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Outcome of a human resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolvedDecision {
    Override,
    HumanApproved,
    HumanRejected,
}

/// Any decision a piece of content can end up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalDecision {
    Allowed,
    Blocked,
    HumanReview,
    Override,
    HumanApproved,
    HumanRejected,
}

impl FinalDecision {
    /// Returns true if content with this decision may reach the agent.
    pub fn permits_use(&self) -> bool {
        matches!(
            self,
            FinalDecision::Allowed | FinalDecision::Override | FinalDecision::HumanApproved
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FinalDecision::Allowed => "ALLOWED",
            FinalDecision::Blocked => "BLOCKED",
            FinalDecision::HumanReview => "HUMAN_REVIEW",
            FinalDecision::Override => "OVERRIDE",
            FinalDecision::HumanApproved => "HUMAN_APPROVED",
            FinalDecision::HumanRejected => "HUMAN_REJECTED",
        }
    }
}

impl std::fmt::Display for FinalDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Decision> for FinalDecision {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Allowed => FinalDecision::Allowed,
            Decision::Blocked => FinalDecision::Blocked,
            Decision::HumanReview => FinalDecision::HumanReview,
        }
    }
}

impl From<ResolvedDecision> for FinalDecision {
    fn from(decision: ResolvedDecision) -> Self {
        match decision {
            ResolvedDecision::Override => FinalDecision::Override,
            ResolvedDecision::HumanApproved => FinalDecision::HumanApproved,
            ResolvedDecision::HumanRejected => FinalDecision::HumanRejected,
        }
    }
}

/// Audit record of one gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictRecord {
    pub subject: String,
    pub decision: Decision,
    pub format: Format,
    pub schema_valid: bool,
    pub matched_rule_ids: Vec<String>,
    pub encoding_kinds: Vec<EncodingKind>,
    pub fingerprint: String,
    pub rule_set_version: String,
}

/// Audit record of one human resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionRecord {
    pub subject: String,
    pub fingerprint: String,
    pub original: Decision,
    pub resolved: ResolvedDecision,
    pub reviewer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Payload of a ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerRecord {
    Verdict(VerdictRecord),
    Resolution(ResolutionRecord),
}

/// One immutable, chained ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Position in the ledger, starting at 0.
    pub sequence: u64,
    pub timestamp: DateTime<Utc>,
    pub record: LedgerRecord,
    /// Hash of the preceding entry, or [`GENESIS_HASH`].
    pub prev_hash: String,
    /// Hash over every other field of this entry.
    pub hash: String,
}

/// Result of walking the hash chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainStatus {
    /// Every entry links to its predecessor and hashes correctly.
    Intact { entries: u64 },
    /// The first entry that fails verification.
    Broken { sequence: u64, reason: String },
}

impl ChainStatus {
    pub fn is_intact(&self) -> bool {
        matches!(self, ChainStatus::Intact { .. })
    }
}

/// Errors from ledger storage.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Failed to open or write the database.
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    /// Failed to serialize or deserialize an entry.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored key is not an 8-byte sequence number.
    #[error("Corrupt ledger key: {0:?}")]
    CorruptKey(Vec<u8>),
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Review requests the workflow refuses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    /// Only BLOCKED and HUMAN_REVIEW verdicts can be reviewed.
    #[error("A {decision} verdict cannot be reviewed")]
    NotReviewable { decision: Decision },

    /// The action does not apply to the verdict's decision.
    #[error("Cannot {action} a {decision} verdict")]
    ActionNotPermitted {
        action: &'static str,
        decision: Decision,
    },

    /// Resolutions must name who made them.
    #[error("Reviewer identity is required")]
    MissingReviewer,
}

/// Bridge refusals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// Content with this decision may not be handed on.
    #[error("Decision {decision} does not permit use of the content")]
    DecisionNotPermitted { decision: FinalDecision },

    /// The content differs from what was evaluated.
    #[error("Content fingerprint {actual} does not match evaluated {expected}")]
    FingerprintMismatch { expected: String, actual: String },
}
