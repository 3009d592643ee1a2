//! Process boundary: exit codes and the failure policy.

use std::process::ExitCode;

use serde::Serialize;
use tracing::{error, warn};

use intake_core::{Decision, FailurePolicy};

/// Exit code for a decision: 0 ALLOWED, 2 BLOCKED, 3 HUMAN_REVIEW.
pub fn exit_code(decision: Decision) -> u8 {
    match decision {
        Decision::Allowed => 0,
        Decision::Blocked => 2,
        Decision::HumanReview => 3,
    }
}

/// Reported instead of a verdict when the gate could not run.
#[derive(Debug, Serialize)]
pub struct BoundaryReport {
    pub decision: Decision,
    pub subject: String,
    pub policy: FailurePolicy,
    pub error: String,
}

impl BoundaryReport {
    pub fn new(policy: FailurePolicy, subject: &str, cause: &dyn std::fmt::Display) -> Self {
        let decision = policy.fallback_decision();
        match policy {
            FailurePolicy::FailClosed => {
                error!("Gate unavailable for '{}', blocking: {}", subject, cause)
            }
            FailurePolicy::FailOpen => {
                warn!("Gate unavailable for '{}', FAILING OPEN: {}", subject, cause)
            }
        }
        Self {
            decision,
            subject: subject.to_string(),
            policy,
            error: cause.to_string(),
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(exit_code(self.decision))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(Decision::Allowed), 0);
        assert_eq!(exit_code(Decision::Blocked), 2);
        assert_eq!(exit_code(Decision::HumanReview), 3);
    }

    #[test]
    fn test_fail_closed_report_blocks() {
        let report = BoundaryReport::new(FailurePolicy::FailClosed, "a.md", &"rules missing");
        assert_eq!(report.decision, Decision::Blocked);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["decision"], "BLOCKED");
        assert_eq!(json["policy"], "fail_closed");
        assert_eq!(json["error"], "rules missing");
    }

    #[test]
    fn test_fail_open_report_allows() {
        let report = BoundaryReport::new(FailurePolicy::FailOpen, "a.md", &"rules missing");
        assert_eq!(report.decision, Decision::Allowed);
    }
}
