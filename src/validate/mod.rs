//! Uniform validation result model shared by the Dockerfile validator (§4.C),
//! the Kubernetes manifest validator (§4.D), and the generate-validate-critique
//! engine (§4.I).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub code: String,
    pub severity: Severity,
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub findings: Vec<Finding>,
    pub stats: HashMap<String, bool>,
    pub quality_score: u8,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        !self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    pub fn errors(&self) -> usize {
        self.findings.iter().filter(|f| f.severity == Severity::Error).count()
    }

    pub fn warnings(&self) -> usize {
        self.findings.iter().filter(|f| f.severity == Severity::Warn).count()
    }
}

/// Accumulates findings and stats flags, then computes the quality score.
///
/// Scoring: start at 100, subtract 15 per error, 5 per warn, 1 per info,
/// clamp to `[0, 100]`, then apply bonus points for stats flags (bounded so
/// the final score never exceeds 100).
#[derive(Debug, Default)]
pub struct ResultBuilder {
    findings: Vec<Finding>,
    stats: HashMap<String, bool>,
}

const ERROR_WEIGHT: i32 = 15;
const WARN_WEIGHT: i32 = 5;
const INFO_WEIGHT: i32 = 1;

/// Stats flags that earn a quality-score bonus, and how many points each is worth.
const BONUS_FLAGS: &[(&str, i32)] = &[
    ("multi_stage", 5),
    ("has_healthcheck", 3),
    ("no_latest_tag", 2),
];

impl ResultBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, code: impl Into<String>, path: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.findings.push(Finding {
            code: code.into(),
            severity: Severity::Error,
            path: path.into(),
            message: message.into(),
        });
        self
    }

    pub fn add_warning(&mut self, code: impl Into<String>, path: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.findings.push(Finding {
            code: code.into(),
            severity: Severity::Warn,
            path: path.into(),
            message: message.into(),
        });
        self
    }

    pub fn add_info(&mut self, code: impl Into<String>, path: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.findings.push(Finding {
            code: code.into(),
            severity: Severity::Info,
            path: path.into(),
            message: message.into(),
        });
        self
    }

    pub fn set_stat(&mut self, flag: impl Into<String>, value: bool) -> &mut Self {
        self.stats.insert(flag.into(), value);
        self
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    fn calculate_quality_score(&self) -> u8 {
        let mut score: i32 = 100;
        for finding in &self.findings {
            score -= match finding.severity {
                Severity::Error => ERROR_WEIGHT,
                Severity::Warn => WARN_WEIGHT,
                Severity::Info => INFO_WEIGHT,
            };
        }
        score = score.clamp(0, 100);

        let mut bonus = 0;
        for (flag, points) in BONUS_FLAGS {
            if self.stats.get(*flag).copied().unwrap_or(false) {
                bonus += points;
            }
        }
        (score + bonus).clamp(0, 100) as u8
    }

    pub fn build(self) -> ValidationResult {
        let quality_score = self.calculate_quality_score();
        ValidationResult {
            findings: self.findings,
            stats: self.stats,
            quality_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_result_scores_max() {
        let result = ResultBuilder::new().build();
        assert_eq!(result.quality_score, 100);
        assert!(result.is_valid());
    }

    #[test]
    fn error_finding_makes_result_invalid() {
        let mut builder = ResultBuilder::new();
        builder.add_error("DF006", "Dockerfile", "invalid EXPOSE port");
        let result = builder.build();
        assert!(!result.is_valid());
        assert_eq!(result.quality_score, 85);
    }

    #[test]
    fn score_never_goes_negative() {
        let mut builder = ResultBuilder::new();
        for _ in 0..10 {
            builder.add_error("DFXXX", "Dockerfile", "boom");
        }
        let result = builder.build();
        assert_eq!(result.quality_score, 0);
    }

    #[test]
    fn adding_an_error_never_increases_score() {
        let mut before = ResultBuilder::new();
        before.add_warning("DF002", "Dockerfile", ":latest tag");
        let before_score = before.build().quality_score;

        let mut after = ResultBuilder::new();
        after.add_warning("DF002", "Dockerfile", ":latest tag");
        after.add_error("DF006", "Dockerfile", "invalid port");
        let after_score = after.build().quality_score;

        assert!(after_score <= before_score);
    }

    #[test]
    fn bonus_flags_are_bounded_at_100() {
        let mut builder = ResultBuilder::new();
        builder.set_stat("multi_stage", true);
        builder.set_stat("has_healthcheck", true);
        builder.set_stat("no_latest_tag", true);
        let result = builder.build();
        assert_eq!(result.quality_score, 100);
    }
}
