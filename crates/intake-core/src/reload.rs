//! Rule-set hot reload.
//!
//! The active rule set lives behind an [`ArcSwap`]. Readers load a snapshot
//! (`Arc<RuleSet>`) without taking a lock and evaluate against it, so a
//! reload never stalls or splits an in-flight evaluation: each call sees the
//! old set or the new one.
//!
//! A reload compiles the replacement first and swaps only on success. A bad
//! rule file leaves the previous set active.

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::{info, warn};

use intake_firewall::RuleSet;

use crate::Result;

/// Shared, swappable reference to the active rule set.
#[derive(Debug, Clone)]
pub struct RuleSetHandle {
    inner: Arc<ArcSwap<RuleSet>>,
}

impl RuleSetHandle {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(rules)),
        }
    }

    /// Snapshot of the active rule set.
    pub fn current(&self) -> Arc<RuleSet> {
        self.inner.load_full()
    }

    /// Install `rules`, returning the set it replaced.
    pub fn replace(&self, rules: RuleSet) -> Arc<RuleSet> {
        self.inner.swap(Arc::new(rules))
    }

    /// Load a rule file and swap it in, returning the set installed. On
    /// failure the active set is kept and the error is returned.
    pub fn reload_from_path(&self, path: &Path) -> Result<Arc<RuleSet>> {
        let rules = match RuleSet::load_from_path(path) {
            Ok(rules) => rules,
            Err(e) => {
                warn!(
                    "Rule reload from {} failed (keeping version {}): {}",
                    path.display(),
                    self.current().version(),
                    e
                );
                return Err(e.into());
            }
        };

        let installed = Arc::new(rules);
        let previous = self.inner.swap(Arc::clone(&installed));
        info!(
            "Rule set reloaded from {}: {} -> {} ({} detection, {} encoding rules)",
            path.display(),
            previous.version(),
            installed.version(),
            installed.detection_rules().len(),
            installed.encoding_rules().len()
        );
        Ok(installed)
    }
}
