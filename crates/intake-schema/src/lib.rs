//! # Intake Schema - Format Classification and Structural Validation
//!
//! Decides what kind of content the gate is looking at and, for structured
//! content, whether it is well-formed.
//!
//! ## Formats
//!
//! | Format | Suffixes | Gate path |
//! |--------|----------|-----------|
//! | structured-config | `.toml .yaml .yml .ini .cfg .env` | validate, then scan |
//! | structured-data | `.json .jsonl .ndjson .csv .tsv` | validate, then scan |
//! | free-text | `.md .markdown .txt .rst .html .htm .adoc` | scan, review on any hit |
//! | unclassified | anything else | same as free-text |
//!
//! Malformed structured content is rejected by the gate no matter what it
//! contains: a document that fails validation cannot be trusted to mean
//! what its values appear to say.
//!
//! ## Usage
//!
//! ```rust
//! use intake_schema::{classify, classify_identifier, Format, SchemaValidator, StructuralValidator};
//!
//! assert_eq!(classify("deploy/app.yaml"), Format::StructuredConfig);
//!
//! let outcome = StructuralValidator::new()
//!     .validate("key: value\n", &classify_identifier("app.yaml"));
//! assert!(outcome.valid);
//! ```

mod delimited;
pub mod format;
mod narrow;
pub mod validator;
mod yaml;

pub use format::{classify, classify_identifier, Classification, Format, Syntax};
pub use validator::{SchemaValidator, SchemaViolation, StructuralValidator, ValidationOutcome};
