//! Format classification.
//!
//! Maps a content identifier (file name, path or URL) to one of four
//! formats through a fixed, case-insensitive suffix table. Unknown suffixes
//! are [`Format::Unclassified`], which the gate treats exactly like free
//! text.
//!
//! `.conf` is not in the table. nginx, apache and systemd each use it for
//! their own grammar, so such files are unclassified and go to review.

use serde::{Deserialize, Serialize};

/// Coarse content format driving the gate's decision path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    StructuredConfig,
    StructuredData,
    FreeText,
    Unclassified,
}

impl Format {
    /// Returns `true` for formats that go through schema validation.
    pub fn is_structured(&self) -> bool {
        matches!(self, Format::StructuredConfig | Format::StructuredData)
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::StructuredConfig => write!(f, "structured-config"),
            Format::StructuredData => write!(f, "structured-data"),
            Format::FreeText => write!(f, "free-text"),
            Format::Unclassified => write!(f, "unclassified"),
        }
    }
}

/// Concrete syntax of a structured document, used to pick a validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Syntax {
    Json,
    JsonLines,
    Toml,
    Yaml,
    Ini,
    Env,
    Csv,
    Tsv,
}

/// Format plus, for structured content, its syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub format: Format,
    pub syntax: Option<Syntax>,
}

/// Suffix table. Checked in order; the first suffix that ends the
/// identifier wins.
const SUFFIXES: &[(&str, Format, Option<Syntax>)] = &[
    (".toml", Format::StructuredConfig, Some(Syntax::Toml)),
    (".yaml", Format::StructuredConfig, Some(Syntax::Yaml)),
    (".yml", Format::StructuredConfig, Some(Syntax::Yaml)),
    (".ini", Format::StructuredConfig, Some(Syntax::Ini)),
    (".cfg", Format::StructuredConfig, Some(Syntax::Ini)),
    (".env", Format::StructuredConfig, Some(Syntax::Env)),
    (".json", Format::StructuredData, Some(Syntax::Json)),
    (".jsonl", Format::StructuredData, Some(Syntax::JsonLines)),
    (".ndjson", Format::StructuredData, Some(Syntax::JsonLines)),
    (".csv", Format::StructuredData, Some(Syntax::Csv)),
    (".tsv", Format::StructuredData, Some(Syntax::Tsv)),
    (".md", Format::FreeText, None),
    (".markdown", Format::FreeText, None),
    (".txt", Format::FreeText, None),
    (".rst", Format::FreeText, None),
    (".html", Format::FreeText, None),
    (".htm", Format::FreeText, None),
    (".adoc", Format::FreeText, None),
];

/// Classify an identifier, keeping the concrete syntax.
pub fn classify_identifier(identifier: &str) -> Classification {
    let name = identifier
        .split(['?', '#'])
        .next()
        .unwrap_or(identifier)
        .trim()
        .to_ascii_lowercase();

    SUFFIXES
        .iter()
        .find(|(suffix, _, _)| name.ends_with(suffix))
        .map(|&(_, format, syntax)| Classification { format, syntax })
        .unwrap_or(Classification {
            format: Format::Unclassified,
            syntax: None,
        })
}

/// Classify an identifier into a [`Format`].
pub fn classify(identifier: &str) -> Format {
    classify_identifier(identifier).format
}
