//! Configuration types for the content gate.
//!
//! ```toml
//! [rules]
//! path = "/etc/intake/rules.toml"   # omit for the built-in set
//!
//! [limits]
//! max_line_chars = 10000
//! line_budget_ms = 500
//!
//! [boundary]
//! failure_policy = "fail_closed"    # or "fail_open"
//!
//! [ledger]
//! path = "/var/lib/intake/ledger"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use intake_firewall::ScanLimits;

use crate::error::GateError;
use crate::verdict::Decision;
use crate::Result;

/// Configuration for the content gate and its boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
    /// Rule set source.
    pub rules: RulesConfig,

    /// Matching resource bounds.
    pub limits: LimitsConfig,

    /// Behavior when the gate cannot run.
    pub boundary: BoundaryConfig,

    /// Audit ledger location.
    pub ledger: LedgerConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RulesConfig {
    /// Rule file; `None` selects the built-in rule set.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Characters of each line that are matched.
    pub max_line_chars: usize,

    /// Soft deadline per (rule, line) pair in milliseconds.
    pub line_budget_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        let limits = ScanLimits::default();
        Self {
            max_line_chars: limits.max_line_chars,
            line_budget_ms: limits.line_budget.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoundaryConfig {
    pub failure_policy: FailurePolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// Ledger directory; `None` disables auditing.
    pub path: Option<PathBuf>,
}

/// What a boundary does when the gate itself cannot run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Treat the content as blocked.
    #[default]
    FailClosed,
    /// Let the content through, loudly.
    FailOpen,
}

impl FailurePolicy {
    /// Decision reported in place of a verdict.
    pub fn fallback_decision(&self) -> Decision {
        match self {
            FailurePolicy::FailClosed => Decision::Blocked,
            FailurePolicy::FailOpen => Decision::Allowed,
        }
    }
}

impl GateConfig {
    /// Parse and validate a TOML configuration document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GateConfig =
            toml::from_str(content).map_err(|e| GateError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Gate configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Matching bounds for the pattern matcher.
    pub fn scan_limits(&self) -> ScanLimits {
        ScanLimits {
            max_line_chars: self.limits.max_line_chars,
            line_budget: Duration::from_millis(self.limits.line_budget_ms),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.limits.max_line_chars == 0 {
            return Err(GateError::Config(
                "limits.max_line_chars must be greater than zero".to_string(),
            ));
        }
        if self.limits.line_budget_ms == 0 {
            return Err(GateError::Config(
                "limits.line_budget_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
