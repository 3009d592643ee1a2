//! # Versioned Rule Sets
//!
//! A [`RuleSet`] is the ordered, versioned collection of detection and
//! encoding rules the scanners run against. Rules are externally editable
//! TOML documents:
//!
//! ```toml
//! version = "2026.10"
//!
//! [[detection]]
//! id = "INJ-001"
//! name = "Instruction override"
//! category = "injection"
//! severity = "block"
//! pattern = '(?i)ignore\s+(all\s+)?previous\s+instructions'
//!
//! [[encoding]]
//! id = "ENC-001"
//! kind = "base64"
//! pattern = '[A-Za-z0-9+/]{40,}={0,2}'
//! min_length = 40
//! ```
//!
//! ## Load Semantics
//!
//! Loading is all-or-nothing. Every entry is validated and compiled before
//! the set is constructed; the first malformed entry, duplicate id or
//! uncompilable pattern aborts the load with a [`RuleError`]. There is no
//! partially-loaded rule set.
//!
//! Patterns compile with the linear-time `regex` engine under a bounded
//! compiled-size limit, so a pathological pattern is a load failure rather
//! than a runtime hazard.

use std::collections::HashSet;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use tracing::{debug, info};

use crate::models::{Category, EncodingKind, Result, RuleError, RuleSeverity};

/// Upper bound on the compiled size of a single rule pattern.
pub const COMPILED_SIZE_LIMIT: usize = 2 * 1024 * 1024;

/// Built-in rule document shipped with the crate.
const BUILTIN_RULES: &str = include_str!("../rules/default.toml");

/// A compiled detection rule. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct DetectionRule {
    id: String,
    name: String,
    category: Category,
    severity: RuleSeverity,
    description: String,
    regex: Regex,
    requires_checksum: bool,
}

impl DetectionRule {
    /// Compile a detection rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidRule`] for an empty id, name or pattern and
    /// [`RuleError::Compile`] when the pattern does not compile.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        severity: RuleSeverity,
        pattern: &str,
        description: impl Into<String>,
    ) -> Result<Self> {
        let id = id.into();
        let name = name.into();
        if id.trim().is_empty() {
            return Err(invalid(&id, "id must not be empty"));
        }
        if name.trim().is_empty() {
            return Err(invalid(&id, "name must not be empty"));
        }
        let regex = compile(&id, pattern)?;

        Ok(Self {
            id,
            name,
            category,
            severity,
            description: description.into(),
            regex,
            requires_checksum: false,
        })
    }

    /// Require matches of this rule to contain a mod-10 valid digit run.
    pub fn with_checksum(mut self) -> Self {
        self.requires_checksum = true;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn severity(&self) -> RuleSeverity {
        self.severity
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The compiled matcher.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn requires_checksum(&self) -> bool {
        self.requires_checksum
    }
}

/// A compiled obfuscation-encoding rule. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct EncodingRule {
    id: String,
    kind: EncodingKind,
    regex: Regex,
    min_length: Option<usize>,
}

impl EncodingRule {
    /// Compile an encoding rule.
    pub fn new(
        id: impl Into<String>,
        kind: EncodingKind,
        pattern: &str,
        min_length: Option<usize>,
    ) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(invalid(&id, "id must not be empty"));
        }
        let regex = compile(&id, pattern)?;
        Ok(Self {
            id,
            kind,
            regex,
            min_length,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> EncodingKind {
        self.kind
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Minimum candidate length in characters, if any.
    pub fn min_length(&self) -> Option<usize> {
        self.min_length
    }
}

/// Versioned ordered collection of detection and encoding rules.
///
/// `RuleSet` is `Send + Sync` and read-only after construction; share it
/// across threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct RuleSet {
    version: String,
    detection: Vec<DetectionRule>,
    encoding: Vec<EncodingRule>,
}

impl RuleSet {
    /// Assemble a rule set from already-compiled rules.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::DuplicateId`] if any two rules (of either kind)
    /// share an id.
    pub fn new(
        version: impl Into<String>,
        detection: Vec<DetectionRule>,
        encoding: Vec<EncodingRule>,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        let ids = detection
            .iter()
            .map(DetectionRule::id)
            .chain(encoding.iter().map(EncodingRule::id));
        for id in ids {
            if !seen.insert(id) {
                return Err(RuleError::DuplicateId(id.to_string()));
            }
        }

        Ok(Self {
            version: version.into(),
            detection,
            encoding,
        })
    }

    /// A rule set with no rules. Useful for tests and for disabling a stage.
    pub fn empty(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            detection: Vec::new(),
            encoding: Vec::new(),
        }
    }

    /// Parse and compile a TOML rule document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let document: RuleDocument = toml::from_str(source)?;
        if document.version.trim().is_empty() {
            return Err(invalid("<document>", "version must not be empty"));
        }

        let mut detection = Vec::with_capacity(document.detection.len());
        for entry in document.detection {
            let mut rule = DetectionRule::new(
                entry.id,
                entry.name,
                entry.category,
                entry.severity,
                &entry.pattern,
                entry.description,
            )?;
            if entry.checksum {
                rule = rule.with_checksum();
            }
            detection.push(rule);
        }

        let mut encoding = Vec::with_capacity(document.encoding.len());
        for entry in document.encoding {
            encoding.push(EncodingRule::new(
                entry.id,
                entry.kind,
                &entry.pattern,
                entry.min_length,
            )?);
        }

        let set = Self::new(document.version, detection, encoding)?;
        debug!(
            "Compiled rule set {} ({} detection, {} encoding)",
            set.version,
            set.detection.len(),
            set.encoding.len()
        );
        Ok(set)
    }

    /// Read, parse and compile a TOML rule file.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        let set = Self::from_toml_str(&source)?;
        info!(
            "Loaded rule set {} from {} ({} detection, {} encoding)",
            set.version,
            path.display(),
            set.detection.len(),
            set.encoding.len()
        );
        Ok(set)
    }

    /// The rule set shipped with this crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_RULES)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn detection_rules(&self) -> &[DetectionRule] {
        &self.detection
    }

    pub fn encoding_rules(&self) -> &[EncodingRule] {
        &self.encoding
    }

    /// Look up a detection rule by id.
    pub fn detection_rule(&self, id: &str) -> Option<&DetectionRule> {
        self.detection.iter().find(|r| r.id == id)
    }
}

/// On-disk rule document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleDocument {
    version: String,
    #[serde(default)]
    detection: Vec<DetectionEntry>,
    #[serde(default)]
    encoding: Vec<EncodingEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DetectionEntry {
    id: String,
    name: String,
    category: Category,
    severity: RuleSeverity,
    pattern: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    checksum: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EncodingEntry {
    id: String,
    kind: EncodingKind,
    pattern: String,
    #[serde(default)]
    min_length: Option<usize>,
}

fn compile(id: &str, pattern: &str) -> Result<Regex> {
    if pattern.is_empty() {
        return Err(invalid(id, "pattern must not be empty"));
    }
    RegexBuilder::new(pattern)
        .size_limit(COMPILED_SIZE_LIMIT)
        .build()
        .map_err(|source| RuleError::Compile {
            id: id.to_string(),
            source,
        })
}

fn invalid(id: &str, reason: &str) -> RuleError {
    RuleError::InvalidRule {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID: &str = r#"
version = "test-1"

[[detection]]
id = "INJ-T1"
name = "Override"
category = "injection"
severity = "block"
pattern = '(?i)ignore previous instructions'

[[encoding]]
id = "ENC-T1"
kind = "hex"
pattern = '(?:\\x[0-9A-Fa-f]{2}){4,}'
"#;

    #[test]
    fn test_builtin_rules_load() {
        let set = RuleSet::builtin().unwrap();
        assert!(!set.version().is_empty());
        assert!(!set.detection_rules().is_empty());
        assert!(!set.encoding_rules().is_empty());
    }

    #[test]
    fn test_builtin_covers_every_category() {
        let set = RuleSet::builtin().unwrap();
        for category in [
            Category::Injection,
            Category::Exfiltration,
            Category::ToolInvocation,
            Category::SensitiveData,
        ] {
            assert!(
                set.detection_rules().iter().any(|r| r.category() == category),
                "no builtin rule for {}",
                category
            );
        }
    }

    #[test]
    fn test_parse_valid_document() {
        let set = RuleSet::from_toml_str(VALID).unwrap();
        assert_eq!(set.version(), "test-1");
        assert_eq!(set.detection_rules().len(), 1);
        assert_eq!(set.encoding_rules()[0].kind(), EncodingKind::Hex);
        assert!(set.detection_rule("INJ-T1").is_some());
    }

    #[test]
    fn test_uncompilable_pattern_fails_whole_load() {
        let doc = format!(
            "{}\n[[detection]]\nid = \"BAD-1\"\nname = \"Broken\"\ncategory = \"injection\"\nseverity = \"review\"\npattern = '(unclosed'\n",
            VALID
        );
        let err = RuleSet::from_toml_str(&doc).unwrap_err();
        assert!(matches!(err, RuleError::Compile { ref id, .. } if id == "BAD-1"));
    }

    #[test]
    fn test_unsupported_syntax_is_compile_error() {
        // Backreferences are not supported by the linear-time engine.
        let err = DetectionRule::new(
            "BR-1",
            "Backref",
            Category::Injection,
            RuleSeverity::Block,
            r"(a)\1",
            "",
        )
        .unwrap_err();
        assert!(matches!(err, RuleError::Compile { .. }));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let doc = format!(
            "{}\n[[encoding]]\nid = \"INJ-T1\"\nkind = \"base64\"\npattern = 'x'\n",
            VALID
        );
        let err = RuleSet::from_toml_str(&doc).unwrap_err();
        assert!(matches!(err, RuleError::DuplicateId(ref id) if id == "INJ-T1"));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let doc = VALID.replace("\"injection\"", "\"mystery\"");
        assert!(matches!(
            RuleSet::from_toml_str(&doc),
            Err(RuleError::Parse(_))
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let doc = VALID.replace("severity = \"block\"", "severity = \"block\"\nweight = 3");
        assert!(matches!(
            RuleSet::from_toml_str(&doc),
            Err(RuleError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let err = EncodingRule::new("E", EncodingKind::Base64, "", None).unwrap_err();
        assert!(matches!(err, RuleError::InvalidRule { .. }));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();
        let set = RuleSet::load_from_path(file.path()).unwrap();
        assert_eq!(set.version(), "test-1");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RuleSet::load_from_path(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, RuleError::Io(_)));
    }

    #[test]
    fn test_checksum_flag_parsed() {
        let doc = r#"
version = "c"
[[detection]]
id = "CARD"
name = "Card number"
category = "sensitive-data"
severity = "block"
pattern = '\b(?:\d[ -]?){13,19}\b'
checksum = true
"#;
        let set = RuleSet::from_toml_str(doc).unwrap();
        assert!(set.detection_rules()[0].requires_checksum());
    }
}
