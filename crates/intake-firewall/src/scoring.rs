//! # Confidence Scorer
//!
//! Converts raw hits into severity-tiered confidence scores.
//!
//! ## Base Scores
//!
//! | Hit | Confidence | Tier |
//! |-----|------------|------|
//! | block + injection / exfiltration | 0.7 | CRITICAL |
//! | block + tool-invocation / sensitive-data | 0.6 | HIGH |
//! | review | 0.4 | MEDIUM |
//! | placeholder-suppressed | 0.2 | LOW |
//! | any encoding hit | 0.9 | CRITICAL |
//!
//! ## Proximity Boost
//!
//! Co-occurring signals are stronger evidence than isolated ones: a pattern
//! hit sharing its line with N other pattern hits gains `0.15 × N`, capped at
//! 1.0. Encoding hits are scored independently and neither give nor receive
//! the boost.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{
    Category, EncodingMatch, PatternMatch, RuleSeverity, ScoredDetection, SeverityTier,
};

/// Confidence added per co-located pattern hit.
pub const PROXIMITY_BOOST: f64 = 0.15;

/// Fixed score for every encoding hit.
pub const ENCODING_SCORE: (f64, SeverityTier) = (0.9, SeverityTier::Critical);

/// Prefix of the synthetic detection id given to encoding hits.
pub const ENCODING_ID_PREFIX: &str = "encoding:";

/// Highest confidence and severity across all detections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverallScore {
    pub confidence: f64,
    pub severity: SeverityTier,
}

/// Scorer output for one piece of content.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Detections sorted by descending confidence.
    pub detections: Vec<ScoredDetection>,
    /// `None` when there were no hits at all.
    pub overall: Option<OverallScore>,
}

impl ScoreReport {
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

/// Base (confidence, tier) for a pattern hit before proximity boosting.
pub fn base_score(hit: &PatternMatch) -> (f64, SeverityTier) {
    if hit.placeholder_suppressed {
        return (0.2, SeverityTier::Low);
    }
    match (hit.severity, hit.category) {
        (RuleSeverity::Block, Category::Injection | Category::Exfiltration) => {
            (0.7, SeverityTier::Critical)
        }
        (RuleSeverity::Block, Category::ToolInvocation | Category::SensitiveData) => {
            (0.6, SeverityTier::High)
        }
        (RuleSeverity::Review, _) => (0.4, SeverityTier::Medium),
    }
}

/// Score every hit for one piece of content.
pub fn score(matches: &[PatternMatch], encodings: &[EncodingMatch]) -> ScoreReport {
    let mut per_line: HashMap<usize, usize> = HashMap::new();
    for hit in matches {
        *per_line.entry(hit.line).or_default() += 1;
    }

    let mut detections: Vec<ScoredDetection> = matches
        .iter()
        .map(|hit| {
            let (base, severity) = base_score(hit);
            let others = per_line.get(&hit.line).copied().unwrap_or(1) - 1;
            let confidence = (base + PROXIMITY_BOOST * others as f64).clamp(0.0, 1.0);
            ScoredDetection {
                rule_id: hit.rule_id.clone(),
                confidence,
                severity,
            }
        })
        .collect();

    detections.extend(encodings.iter().map(|enc| ScoredDetection {
        rule_id: format!("{}{}", ENCODING_ID_PREFIX, enc.kind),
        confidence: ENCODING_SCORE.0,
        severity: ENCODING_SCORE.1,
    }));

    // Stable sort keeps input order among equal confidences.
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let overall = detections
        .iter()
        .fold(None, |acc: Option<OverallScore>, d| match acc {
            None => Some(OverallScore {
                confidence: d.confidence,
                severity: d.severity,
            }),
            Some(o) => Some(OverallScore {
                confidence: o.confidence.max(d.confidence),
                severity: o.severity.max(d.severity),
            }),
        });

    ScoreReport {
        detections,
        overall,
    }
}
