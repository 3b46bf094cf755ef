//! Best-practice rule severity and category types.
//!
//! Severity levels form a strict order (`Info < Warning < Error`) so that
//! filters and summaries can compare levels numerically instead of matching
//! on strings. Categories mirror the groupings used by rule catalogs:
//! - **Performance**: model size and query speed concerns
//! - **DAX Expressions**: measure/expression authoring concerns
//! - **Maintenance**: long-term manageability concerns
//! - **Naming Conventions**: object naming concerns
//! - **Formatting**: display and format-string concerns

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a best-practice violation.
///
/// Violations never block anything by themselves; severity only drives
/// ordering, filtering, and display.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Informational observation.
    #[default]
    Info,
    /// Should be reviewed.
    Warning,
    /// Should be fixed before deployment.
    Error,
}

impl Severity {
    /// Parse a severity from a catalog string. Unrecognized values fall back
    /// to `Info`, matching how catalogs treat unknown severities.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "error" => Self::Error,
            "warning" => Self::Warning,
            _ => Self::Info,
        }
    }

    /// Numeric level: `Info` = 1, `Warning` = 2, `Error` = 3.
    pub fn level(&self) -> u8 {
        match self {
            Self::Info => 1,
            Self::Warning => 2,
            Self::Error => 3,
        }
    }

    /// Get the catalog label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Best-practice rule category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleCategory {
    /// Model size and query speed.
    Performance,
    /// Measure and expression authoring.
    #[serde(rename = "DAX Expressions")]
    DaxExpressions,
    /// Long-term manageability.
    Maintenance,
    /// Object naming.
    #[serde(rename = "Naming Conventions")]
    NamingConventions,
    /// Display formats.
    Formatting,
}

impl RuleCategory {
    /// Parse a category from a catalog string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "performance" => Some(Self::Performance),
            "dax expressions" => Some(Self::DaxExpressions),
            "maintenance" => Some(Self::Maintenance),
            "naming conventions" => Some(Self::NamingConventions),
            "formatting" => Some(Self::Formatting),
            _ => None,
        }
    }

    /// Get the catalog label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Performance => "Performance",
            Self::DaxExpressions => "DAX Expressions",
            Self::Maintenance => "Maintenance",
            Self::NamingConventions => "Naming Conventions",
            Self::Formatting => "Formatting",
        }
    }

    /// All known categories, in display order.
    pub fn all() -> [Self; 5] {
        [
            Self::Performance,
            Self::DaxExpressions,
            Self::Maintenance,
            Self::NamingConventions,
            Self::Formatting,
        ]
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
