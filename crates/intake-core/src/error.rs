//! Error types for Intake Core.

use thiserror::Error;

use intake_firewall::RuleError;

/// Core error type for gate setup and rule management.
///
/// Evaluation itself never fails: once a rule set is loaded, every call
/// produces a complete verdict. These errors surface before that point.
#[derive(Debug, Error)]
pub enum GateError {
    /// The rule set could not be loaded; nothing was applied.
    #[error("Rule set load failed: {0}")]
    RuleLoad(#[from] RuleError),

    /// Configuration is unreadable or out of range.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O failure reading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
