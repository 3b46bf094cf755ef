//! Best-practice rule catalog loader.
//!
//! Catalogs are JSON documents (the workspace ships one at
//! `rules/bpa.json`) with the shape:
//!
//! ```json
//! {
//!   "name": "...", "version": "...",
//!   "rules": [
//!     {
//!       "id": "AVOID_FLOATING_POINT_DATA_TYPES",
//!       "name": "Do not use floating point data types",
//!       "category": "Performance",
//!       "severity": "WARNING",
//!       "scope": "column",
//!       "condition": {"property": "dataType", "op": "equals", "value": "Double"},
//!       "description": "...",
//!       "fixExpression": "..."
//!     }
//!   ]
//! }
//! ```
//!
//! Conditions are predicate trees: a leaf is `{property, op, value?}`, and
//! the combinators `allOf`, `anyOf`, and `not` nest arbitrarily. A
//! descriptor that fails to deserialize is skipped and counted rather than
//! failing the whole catalog, so one bad rule never takes analysis down.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tmsl_model::{RuleCategory, Severity};
use tracing::warn;

use crate::error::CatalogError;

/// Which objects of the model a rule walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleScope {
    Model,
    Table,
    Column,
    Measure,
    Relationship,
}

impl RuleScope {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Table => "table",
            Self::Column => "column",
            Self::Measure => "measure",
            Self::Relationship => "relationship",
        }
    }
}

/// Leaf predicate operator.
///
/// `isTrue`/`isFalse` coalesce an absent flag to `false`. The string
/// operators (`equals` through `endsWith`, `matches`) never match an
/// absent property; use `missing` to target absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PredicateOp {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    Matches,
    StartsWith,
    EndsWith,
    IsTrue,
    IsFalse,
    Missing,
    Exists,
    IsEmpty,
}

impl PredicateOp {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "notEquals",
            Self::Contains => "contains",
            Self::NotContains => "notContains",
            Self::Matches => "matches",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
            Self::IsTrue => "isTrue",
            Self::IsFalse => "isFalse",
            Self::Missing => "missing",
            Self::Exists => "exists",
            Self::IsEmpty => "isEmpty",
        }
    }
}

impl std::fmt::Display for PredicateOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A leaf condition: one property tested with one operator.
#[derive(Debug, Clone, Deserialize)]
pub struct Predicate {
    pub property: String,
    pub op: PredicateOp,
    /// Comparison value for the string operators; unused by the
    /// presence and flag operators.
    #[serde(default)]
    pub value: Option<Value>,
}

/// A condition tree over one scope object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    AllOf {
        #[serde(rename = "allOf")]
        all_of: Vec<Condition>,
    },
    AnyOf {
        #[serde(rename = "anyOf")]
        any_of: Vec<Condition>,
    },
    Not {
        not: Box<Condition>,
    },
    Leaf(Predicate),
}

/// One catalog rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDescriptor {
    pub id: String,
    pub name: String,
    pub category: RuleCategory,
    pub severity: Severity,
    pub scope: RuleScope,
    pub condition: Condition,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fix_expression: Option<String>,
}

/// A loaded catalog.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    pub name: Option<String>,
    pub version: Option<String>,
    pub rules: Vec<RuleDescriptor>,
    /// Descriptors dropped at load because they failed to deserialize.
    pub skipped_rules: usize,
}

impl RuleCatalog {
    /// Load a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path).map_err(|source| CatalogError::read(path, source))?;
        let document: Value =
            serde_json::from_str(&text).map_err(|source| CatalogError::parse(path, source))?;
        Self::from_document(path, &document)
    }

    /// Build a catalog from a parsed rules document. `path` only provides
    /// error and log context.
    pub fn from_document(path: &Path, document: &Value) -> Result<Self, CatalogError> {
        let Some(rules_value) = document.get("rules") else {
            return Err(CatalogError::shape(path, "document has no 'rules' key"));
        };
        let Some(entries) = rules_value.as_array() else {
            return Err(CatalogError::shape(path, "'rules' is not an array"));
        };

        let mut rules = Vec::with_capacity(entries.len());
        let mut skipped_rules = 0usize;
        for (index, entry) in entries.iter().enumerate() {
            match serde_json::from_value::<RuleDescriptor>(entry.clone()) {
                Ok(rule) => rules.push(rule),
                Err(error) => {
                    skipped_rules += 1;
                    warn!(index, %error, path = %path.display(), "skipping malformed rule descriptor");
                }
            }
        }

        Ok(Self {
            name: string_field(document, "name"),
            version: string_field(document, "version"),
            rules,
            skipped_rules,
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn string_field(document: &Value, key: &str) -> Option<String> {
    document.get(key).and_then(Value::as_str).map(String::from)
}
