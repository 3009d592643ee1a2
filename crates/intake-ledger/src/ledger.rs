//! # Audit Ledger
//!
//! Append-only, hash-chained record of every gate decision and every human
//! resolution, persisted in Sled.
//!
//! ## Storage Structure
//!
//! | Tree | Key | Value |
//! |------|-----|-------|
//! | `entries` | sequence number (8-byte big-endian) | JSON [`LedgerEntry`] |
//!
//! Big-endian keys make Sled's lexicographic order the append order.
//!
//! ## Chain
//!
//! ```text
//!  ┌────────────┐     ┌────────────┐     ┌────────────┐
//!  │ entry 0    │     │ entry 1    │     │ entry 2    │
//!  │ prev: 000… │◀────│ prev: h0   │◀────│ prev: h1   │
//!  │ hash: h0   │     │ hash: h1   │     │ hash: h2   │
//!  └────────────┘     └────────────┘     └────────────┘
//! ```
//!
//! Each hash covers the entry's sequence, timestamp, record and predecessor
//! hash. Editing, removing or reordering any stored entry breaks
//! [`AuditLedger::verify_chain`] at that point.
//!
//! ## Security Notes
//!
//! - The chain detects tampering; it does not prevent it. Keep the ledger
//!   directory writable only by the gate's process.
//! - Content itself is never stored, only its SHA-256 fingerprint.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use intake_core::FilterVerdict;

use crate::models::{
    fingerprint, ChainStatus, LedgerEntry, LedgerError, LedgerRecord, ResolutionRecord, Result,
    VerdictRecord, GENESIS_HASH,
};
use crate::review::Resolution;

/// Tree name for ledger entries.
const ENTRY_TREE: &str = "entries";

/// Fields covered by an entry's hash.
#[derive(Serialize)]
struct HashedFields<'a> {
    sequence: u64,
    timestamp: &'a DateTime<Utc>,
    record: &'a LedgerRecord,
    prev_hash: &'a str,
}

/// Sled-backed append-only audit ledger.
///
/// Appends are serialized through an internal lock so sequence numbers and
/// chain links never race. Reads do not take the lock.
pub struct AuditLedger {
    db: sled::Db,
    entries: sled::Tree,
    append_lock: Mutex<()>,
}

impl AuditLedger {
    /// Opens or creates a ledger in the given directory.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Database` if the directory cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path.as_ref())?;
        let ledger = Self::from_db(db)?;
        info!(
            "Audit ledger opened at {} ({} entries)",
            path.as_ref().display(),
            ledger.len()
        );
        Ok(ledger)
    }

    /// Creates an in-memory ledger discarded on drop.
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self> {
        let entries = db.open_tree(ENTRY_TREE)?;
        Ok(Self {
            db,
            entries,
            append_lock: Mutex::new(()),
        })
    }

    /// Record one gate evaluation.
    pub fn record_verdict(&self, verdict: &FilterVerdict, content: &str) -> Result<LedgerEntry> {
        let record = LedgerRecord::Verdict(VerdictRecord {
            subject: verdict.subject.clone(),
            decision: verdict.decision,
            format: verdict.format,
            schema_valid: verdict.schema_valid,
            matched_rule_ids: verdict.matched_rule_ids(),
            encoding_kinds: verdict.encoding_kinds(),
            fingerprint: fingerprint(content),
            rule_set_version: verdict.rule_set_version.clone(),
        });
        self.append(record)
    }

    /// Record a reviewer's resolution as its own entry.
    pub fn record_resolution(&self, resolution: &Resolution) -> Result<LedgerEntry> {
        let record = LedgerRecord::Resolution(ResolutionRecord {
            subject: resolution.subject.clone(),
            fingerprint: resolution.fingerprint.clone(),
            original: resolution.original,
            resolved: resolution.resolved,
            reviewer: resolution.reviewer.clone(),
            note: resolution.note.clone(),
        });
        self.append(record)
    }

    /// Append a record at the end of the chain.
    pub fn append(&self, record: LedgerRecord) -> Result<LedgerEntry> {
        let _guard = self.append_lock.lock().unwrap_or_else(|e| e.into_inner());

        let (sequence, prev_hash) = match self.last()? {
            Some(last) => (last.sequence + 1, last.hash),
            None => (0, GENESIS_HASH.to_string()),
        };
        let timestamp = Utc::now();
        let hash = entry_hash(sequence, &timestamp, &record, &prev_hash)?;

        let entry = LedgerEntry {
            sequence,
            timestamp,
            record,
            prev_hash,
            hash,
        };
        self.entries
            .insert(sequence.to_be_bytes(), serde_json::to_vec(&entry)?)?;
        debug!("Ledger entry {} appended ({})", entry.sequence, &entry.hash[..12]);
        Ok(entry)
    }

    /// Entry at `sequence`, if present.
    pub fn get(&self, sequence: u64) -> Result<Option<LedgerEntry>> {
        match self.entries.get(sequence.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Most recent entry, if any.
    pub fn last(&self) -> Result<Option<LedgerEntry>> {
        match self.entries.last()? {
            Some((_, bytes)) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// The last `n` entries in append order.
    pub fn tail(&self, n: usize) -> Result<Vec<LedgerEntry>> {
        let mut entries = self
            .entries
            .iter()
            .rev()
            .take(n)
            .map(|item| {
                let (_, bytes) = item?;
                Ok(serde_json::from_slice(&bytes)?)
            })
            .collect::<Result<Vec<LedgerEntry>>>()?;
        entries.reverse();
        Ok(entries)
    }

    /// Walk the whole chain and report the first inconsistency.
    pub fn verify_chain(&self) -> Result<ChainStatus> {
        let mut expected_prev = GENESIS_HASH.to_string();
        let mut expected_seq = 0u64;

        for item in self.entries.iter() {
            let (key, bytes) = item?;
            let key_seq = decode_key(&key)?;

            let entry: LedgerEntry = match serde_json::from_slice(&bytes) {
                Ok(entry) => entry,
                Err(e) => return Ok(broken(key_seq, format!("unreadable entry: {}", e))),
            };

            if key_seq != expected_seq || entry.sequence != expected_seq {
                return Ok(broken(
                    key_seq,
                    format!("expected sequence {}, found {}", expected_seq, entry.sequence),
                ));
            }
            if entry.prev_hash != expected_prev {
                return Ok(broken(key_seq, "predecessor hash mismatch".to_string()));
            }
            let recomputed =
                entry_hash(entry.sequence, &entry.timestamp, &entry.record, &entry.prev_hash)?;
            if recomputed != entry.hash {
                return Ok(broken(key_seq, "entry hash mismatch".to_string()));
            }

            expected_prev = entry.hash;
            expected_seq += 1;
        }

        Ok(ChainStatus::Intact {
            entries: expected_seq,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl std::fmt::Debug for AuditLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLedger")
            .field("entries", &self.entries.len())
            .finish()
    }
}

fn entry_hash(
    sequence: u64,
    timestamp: &DateTime<Utc>,
    record: &LedgerRecord,
    prev_hash: &str,
) -> Result<String> {
    let fields = HashedFields {
        sequence,
        timestamp,
        record,
        prev_hash,
    };
    let bytes = serde_json::to_vec(&fields)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

fn decode_key(key: &[u8]) -> Result<u64> {
    let raw: [u8; 8] = key
        .try_into()
        .map_err(|_| LedgerError::CorruptKey(key.to_vec()))?;
    Ok(u64::from_be_bytes(raw))
}

fn broken(sequence: u64, reason: String) -> ChainStatus {
    warn!("Ledger chain broken at entry {}: {}", sequence, reason);
    ChainStatus::Broken { sequence, reason }
}
