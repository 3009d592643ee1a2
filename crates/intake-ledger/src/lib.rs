//! # Intake Ledger - What Happens After the Verdict
//!
//! The gate decides; this crate remembers, escalates and hands off.
//!
//! ## Purpose
//!
//! 1. **Audit Ledger** ([`AuditLedger`]) - one immutable, hash-chained
//!    entry per gate call and per human resolution, persisted in Sled.
//!
//! 2. **Human Review** ([`ReviewCase`]) - BLOCKED verdicts can be
//!    overridden, HUMAN_REVIEW verdicts approved or rejected. Nothing else.
//!
//! 3. **Typed-Reference Bridge** ([`VettedContent`]) - the only wrapper under
//!    which content reaches an agent, built solely from ALLOWED, OVERRIDE or
//!    HUMAN_APPROVED outcomes.
//!
//! ## Threat Model
//!
//! | Threat | Description | Defense |
//! |--------|-------------|---------|
//! | Silent tampering | Audit history rewritten after an incident | SHA-256 hash chain |
//! | Review bypass | Blocked content forwarded without a decision | Bridge refuses BLOCKED / HUMAN_REVIEW |
//! | Bait and switch | Approved content swapped before use | Fingerprint check on release |
//! | Anonymous release | Override with no accountable reviewer | Reviewer identity required |
//!
//! ## Architecture
//!
//! ```text
//!  FilterVerdict ──┬──────────────▶ AuditLedger (verdict entry)
//!                  │
//!                  ├─ ALLOWED ────────────────────────────┐
//!                  │                                      ▼
//!                  └─ BLOCKED / HUMAN_REVIEW          VettedContent
//!                         │                               ▲
//!                         ▼                               │
//!                     ReviewCase ── resolve() ── OVERRIDE / HUMAN_APPROVED
//!                                       │
//!                                       └──▶ AuditLedger (resolution entry)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use intake_core::{evaluate, RuleSet};
//! use intake_ledger::{AuditLedger, ReviewAction, ReviewCase, VettedContent};
//!
//! let rules = RuleSet::builtin().unwrap();
//! let ledger = AuditLedger::temporary().unwrap();
//!
//! let content = "Meeting moved to Thursday.";
//! let verdict = evaluate(content, "memo.txt", &rules);
//! ledger.record_verdict(&verdict, content).unwrap();
//!
//! // Free text always needs a person.
//! let resolution = ReviewCase::open(&verdict, content)
//!     .unwrap()
//!     .resolve(ReviewAction::Approve, "alice", None)
//!     .unwrap();
//! ledger.record_resolution(&resolution).unwrap();
//!
//! let vetted = VettedContent::from_resolution(content, verdict.format, &resolution).unwrap();
//! assert_eq!(vetted.content(), content);
//! assert!(ledger.verify_chain().unwrap().is_intact());
//! ```
//!
//! ## References
//!
//! - **NIST FIPS 180-4** - "Secure Hash Standard (SHS)" - SHA-256 specification.
//!   <https://csrc.nist.gov/publications/detail/fips/180/4/final>
//! - **Sled Documentation** - <https://sled.rs/>

pub mod bridge;
pub mod ledger;
pub mod models;
pub mod review;

pub use bridge::{Provenance, VettedContent};
pub use ledger::AuditLedger;
pub use models::{
    fingerprint, BridgeError, ChainStatus, FinalDecision, LedgerEntry, LedgerError, LedgerRecord,
    ResolutionRecord, ResolvedDecision, Result, ReviewError, VerdictRecord, GENESIS_HASH,
};
pub use review::{Resolution, ReviewAction, ReviewCase};
