//! Typed-reference bridge.
//!
//! [`VettedContent`] is the only way content leaves the gate for an agent's
//! context. It can be built from an ALLOWED verdict or from an OVERRIDE /
//! HUMAN_APPROVED resolution; every other decision is refused with
//! [`BridgeError::DecisionNotPermitted`] naming it. The wrapped content and
//! its provenance are immutable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use intake_core::{FilterVerdict, Format};

use crate::models::{fingerprint, BridgeError, FinalDecision};
use crate::review::Resolution;

/// Where vetted content came from and why it was let through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub subject: String,
    pub format: Format,
    pub decision: FinalDecision,
    pub fingerprint: String,
    pub matched_rule_ids: Vec<String>,
    /// Set when a human released the content.
    pub reviewer: Option<String>,
    pub vetted_at: DateTime<Utc>,
}

/// Content cleared for use, with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VettedContent {
    content: String,
    provenance: Provenance,
}

impl VettedContent {
    /// Wrap content the gate allowed outright.
    pub fn from_verdict(
        content: impl Into<String>,
        verdict: &FilterVerdict,
    ) -> Result<Self, BridgeError> {
        let decision = FinalDecision::from(verdict.decision);
        if !decision.permits_use() {
            return Err(BridgeError::DecisionNotPermitted { decision });
        }

        let content = content.into();
        Ok(Self {
            provenance: Provenance {
                subject: verdict.subject.clone(),
                format: verdict.format,
                decision,
                fingerprint: fingerprint(&content),
                matched_rule_ids: verdict.matched_rule_ids(),
                reviewer: None,
                vetted_at: Utc::now(),
            },
            content,
        })
    }

    /// Wrap content a reviewer released. `content` must be exactly what was
    /// evaluated.
    pub fn from_resolution(
        content: impl Into<String>,
        format: Format,
        resolution: &Resolution,
    ) -> Result<Self, BridgeError> {
        let decision = FinalDecision::from(resolution.resolved);
        if !decision.permits_use() {
            return Err(BridgeError::DecisionNotPermitted { decision });
        }

        let content = content.into();
        let actual = fingerprint(&content);
        if actual != resolution.fingerprint {
            return Err(BridgeError::FingerprintMismatch {
                expected: resolution.fingerprint.clone(),
                actual,
            });
        }

        Ok(Self {
            provenance: Provenance {
                subject: resolution.subject.clone(),
                format,
                decision,
                fingerprint: actual,
                matched_rule_ids: resolution.matched_rule_ids.clone(),
                reviewer: Some(resolution.reviewer.clone()),
                vetted_at: Utc::now(),
            },
            content,
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn into_parts(self) -> (String, Provenance) {
        (self.content, self.provenance)
    }
}
