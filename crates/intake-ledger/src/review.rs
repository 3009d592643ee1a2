//! Human review and override.
//!
//! A [`ReviewCase`] is opened from a BLOCKED or HUMAN_REVIEW verdict and
//! closed by exactly one reviewer action:
//!
//! | Verdict | Action | Resolution |
//! |---------|--------|------------|
//! | BLOCKED | `Override` | OVERRIDE |
//! | HUMAN_REVIEW | `Approve` | HUMAN_APPROVED |
//! | HUMAN_REVIEW | `Reject` | HUMAN_REJECTED |
//!
//! Any other pairing is refused with a [`ReviewError`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use intake_core::{Decision, FilterVerdict};

use crate::models::{fingerprint, ResolvedDecision, ReviewError};

/// What a reviewer decided to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    /// Release blocked content anyway.
    Override,
    Approve,
    Reject,
}

impl ReviewAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewAction::Override => "override",
            ReviewAction::Approve => "approve",
            ReviewAction::Reject => "reject",
        }
    }
}

/// A verdict awaiting a human decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewCase {
    pub subject: String,
    pub fingerprint: String,
    pub decision: Decision,
    pub matched_rule_ids: Vec<String>,
    pub opened_at: DateTime<Utc>,
}

/// A closed review case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub subject: String,
    pub fingerprint: String,
    pub original: Decision,
    pub resolved: ResolvedDecision,
    pub reviewer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub matched_rule_ids: Vec<String>,
    pub resolved_at: DateTime<Utc>,
}

impl ReviewCase {
    /// Open a case for `verdict`, evaluated over `content`.
    ///
    /// # Errors
    ///
    /// [`ReviewError::NotReviewable`] for ALLOWED verdicts.
    pub fn open(verdict: &FilterVerdict, content: &str) -> Result<Self, ReviewError> {
        if verdict.decision == Decision::Allowed {
            return Err(ReviewError::NotReviewable {
                decision: verdict.decision,
            });
        }
        Ok(Self {
            subject: verdict.subject.clone(),
            fingerprint: fingerprint(content),
            decision: verdict.decision,
            matched_rule_ids: verdict.matched_rule_ids(),
            opened_at: Utc::now(),
        })
    }

    /// Close the case with `action`.
    ///
    /// # Errors
    ///
    /// - [`ReviewError::MissingReviewer`] if `reviewer` is blank.
    /// - [`ReviewError::ActionNotPermitted`] if the action does not apply to
    ///   this case's decision.
    pub fn resolve(
        self,
        action: ReviewAction,
        reviewer: &str,
        note: Option<String>,
    ) -> Result<Resolution, ReviewError> {
        let reviewer = reviewer.trim();
        if reviewer.is_empty() {
            return Err(ReviewError::MissingReviewer);
        }

        let resolved = match (self.decision, action) {
            (Decision::Blocked, ReviewAction::Override) => ResolvedDecision::Override,
            (Decision::HumanReview, ReviewAction::Approve) => ResolvedDecision::HumanApproved,
            (Decision::HumanReview, ReviewAction::Reject) => ResolvedDecision::HumanRejected,
            (decision, action) => {
                return Err(ReviewError::ActionNotPermitted {
                    action: action.as_str(),
                    decision,
                })
            }
        };

        info!(
            "Review of '{}' resolved {:?} by {}",
            self.subject, resolved, reviewer
        );

        Ok(Resolution {
            subject: self.subject,
            fingerprint: self.fingerprint,
            original: self.decision,
            resolved,
            reviewer: reviewer.to_string(),
            note,
            matched_rule_ids: self.matched_rule_ids,
            resolved_at: Utc::now(),
        })
    }
}
