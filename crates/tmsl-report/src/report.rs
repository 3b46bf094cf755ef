//! Analysis report documents.
//!
//! A report is a self-describing JSON document built from one [`Analysis`].
//! Three shapes are offered: a severity-keyed summary, a flat detailed
//! listing, and a category-keyed breakdown. Every shape carries the
//! aggregate counts and a generation timestamp so reports can be archived
//! and compared later.

use std::collections::BTreeMap;

use serde::Serialize;
use tmsl_bpa::{Analysis, AnalysisSummary};
use tmsl_model::{Severity, Violation};

/// Shape of the generated report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Counts plus violations keyed by severity.
    Summary,
    /// Every violation in a flat list.
    Detailed,
    /// Violations keyed by rule category.
    ByCategory,
}

impl ReportFormat {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Detailed => "detailed",
            Self::ByCategory => "by_category",
        }
    }
}

/// A best-practice analysis report ready for serialization.
#[derive(Debug, Clone, Serialize)]
pub struct BpaReport {
    pub format_type: String,
    pub generated_at: String,
    pub analysis_summary: AnalysisSummary,
    pub rules_applied: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations_by_severity: Option<BTreeMap<String, Vec<Violation>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_violations: Option<Vec<Violation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations_by_category: Option<BTreeMap<String, Vec<Violation>>>,
}

impl BpaReport {
    /// Build a report document from an analysis.
    pub fn build(analysis: &Analysis, format: ReportFormat) -> Self {
        let mut report = Self {
            format_type: format.label().to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            analysis_summary: analysis.summary(),
            rules_applied: analysis.rules_applied,
            error: analysis.error.clone(),
            violations_by_severity: None,
            all_violations: None,
            violations_by_category: None,
        };
        match format {
            ReportFormat::Summary => {
                // Every severity key is present even when empty so consumers
                // never have to special-case a missing bucket.
                let mut by_severity: BTreeMap<String, Vec<Violation>> = BTreeMap::new();
                for severity in [Severity::Error, Severity::Warning, Severity::Info] {
                    by_severity.insert(severity.label().to_string(), Vec::new());
                }
                for violation in &analysis.violations {
                    by_severity
                        .entry(violation.severity.label().to_string())
                        .or_default()
                        .push(violation.clone());
                }
                report.violations_by_severity = Some(by_severity);
            }
            ReportFormat::Detailed => {
                report.all_violations = Some(analysis.violations.clone());
            }
            ReportFormat::ByCategory => {
                let mut by_category: BTreeMap<String, Vec<Violation>> = BTreeMap::new();
                for violation in &analysis.violations {
                    by_category
                        .entry(violation.category.label().to_string())
                        .or_default()
                        .push(violation.clone());
                }
                report.violations_by_category = Some(by_category);
            }
        }
        report
    }
}
