//! Best-practice rule evaluation.
//!
//! [`BpaEngine`] holds a loaded catalog and walks a typed model with it.
//! Construction never fails: when the catalog cannot be loaded the engine
//! runs disabled and every analysis carries the load error instead of
//! violations. Analysis itself is total as well; a condition that faults
//! at evaluation (unknown property, bad regex pattern, non-string
//! comparison value) skips that rule/object pair and counts it, leaving
//! every other rule's findings intact.
//!
//! Each analysis returns an [`Analysis`] handle owning its violations, so
//! severity and category filters always read from the result they were
//! asked about and engines can be shared freely.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use serde_json::{Value, json};
use tmsl_model::{
    Column, Envelope, Measure, Model, Relationship, RuleCategory, Severity, Table, Violation,
};
use tmsl_normalize::normalize;
use tracing::{debug, warn};

use crate::catalog::{Condition, Predicate, PredicateOp, RuleCatalog, RuleDescriptor, RuleScope};
use crate::paths::default_rules_path;

/// The rule engine. Cheap to share by reference; all analysis state
/// lives in the returned [`Analysis`].
#[derive(Debug)]
pub struct BpaEngine {
    catalog: Option<RuleCatalog>,
    rules_path: PathBuf,
    load_error: Option<String>,
}

impl BpaEngine {
    /// Engine over the default catalog location (`TMSL_BPA_RULES` or the
    /// workspace `rules/bpa.json`).
    pub fn new() -> Self {
        Self::load(default_rules_path())
    }

    /// Engine over a catalog file. A missing or malformed file leaves
    /// the engine disabled instead of failing.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let rules_path = path.into();
        match RuleCatalog::load(&rules_path) {
            Ok(catalog) => {
                debug!(
                    rules = catalog.rules.len(),
                    skipped = catalog.skipped_rules,
                    path = %rules_path.display(),
                    "loaded best-practice rule catalog"
                );
                Self {
                    catalog: Some(catalog),
                    rules_path,
                    load_error: None,
                }
            }
            Err(error) => {
                warn!(%error, "rule catalog unavailable; analysis disabled");
                Self {
                    catalog: None,
                    rules_path,
                    load_error: Some(error.to_string()),
                }
            }
        }
    }

    /// Engine over an already-built catalog.
    pub fn with_catalog(catalog: RuleCatalog) -> Self {
        Self {
            catalog: Some(catalog),
            rules_path: PathBuf::from("<memory>"),
            load_error: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.catalog.is_some()
    }

    pub fn rules_path(&self) -> &Path {
        &self.rules_path
    }

    pub fn catalog(&self) -> Option<&RuleCatalog> {
        self.catalog.as_ref()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Analyze a typed model against the catalog.
    pub fn analyze(&self, model: &Model) -> Analysis {
        let Some(catalog) = &self.catalog else {
            return Analysis::failed(
                self.load_error
                    .clone()
                    .unwrap_or_else(|| "best-practice rules not loaded".to_string()),
            );
        };
        let mut violations = Vec::new();
        let mut skipped_objects = 0usize;
        for rule in &catalog.rules {
            for subject in subjects_for(rule.scope, model) {
                match eval_condition(&rule.condition, &subject) {
                    Ok(true) => violations.push(violation_for(rule, &subject)),
                    Ok(false) => {}
                    Err(error) => {
                        skipped_objects += 1;
                        debug!(rule = %rule.id, %error, "condition faulted; pair skipped");
                    }
                }
            }
        }
        debug!(
            violations = violations.len(),
            skipped = skipped_objects,
            "analysis complete"
        );
        Analysis {
            violations,
            rules_applied: catalog.rules.len(),
            skipped_objects,
            error: None,
        }
    }

    /// Analyze raw definition text: normalize, parse, unwrap the
    /// envelope, and run [`analyze`](Self::analyze). A single-table
    /// payload is analyzed as a one-table model.
    pub fn analyze_text(&self, text: &str) -> Analysis {
        let normalized = normalize(text);
        let root: Value = match serde_json::from_str(&normalized) {
            Ok(value) => value,
            Err(error) => {
                return Analysis::failed(format!("definition is not valid JSON: {error}"));
            }
        };
        let model_value = match Envelope::detect(&root) {
            Some(Envelope::WholeDatabase { model } | Envelope::Bare { model }) => model.clone(),
            Some(Envelope::SingleTable { table }) => json!({"tables": [table.clone()]}),
            None => {
                return Analysis::failed("no model or table content found in the definition");
            }
        };
        match serde_json::from_value::<Model>(model_value) {
            Ok(model) => self.analyze(&model),
            Err(error) => Analysis::failed(format!(
                "model content does not match the expected shape: {error}"
            )),
        }
    }

    /// Aggregate view of the loaded catalog, for the `rules` surface.
    pub fn rules_summary(&self) -> RulesSummary {
        let mut summary = RulesSummary {
            total_rules: 0,
            categories: BTreeMap::new(),
            severities: BTreeMap::new(),
            rules_file: self.rules_path.display().to_string(),
            error: self.load_error.clone(),
        };
        if let Some(catalog) = &self.catalog {
            summary.total_rules = catalog.rules.len();
            for rule in &catalog.rules {
                *summary
                    .categories
                    .entry(rule.category.label().to_string())
                    .or_default() += 1;
                *summary
                    .severities
                    .entry(rule.severity.label().to_string())
                    .or_default() += 1;
            }
        }
        summary
    }
}

/// Result of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub violations: Vec<Violation>,
    /// Rules in the catalog when the analysis ran.
    pub rules_applied: usize,
    /// Rule/object pairs skipped because a condition faulted.
    pub skipped_objects: usize,
    /// Set when the analysis could not run at all (disabled engine,
    /// unparseable input); `violations` is empty in that case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Analysis {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            violations: Vec::new(),
            rules_applied: 0,
            skipped_objects: 0,
            error: Some(message.into()),
        }
    }

    /// Violations at exactly the given severity.
    pub fn by_severity(&self, severity: Severity) -> Vec<&Violation> {
        self.violations
            .iter()
            .filter(|violation| violation.severity == severity)
            .collect()
    }

    /// Violations in the given category.
    pub fn by_category(&self, category: RuleCategory) -> Vec<&Violation> {
        self.violations
            .iter()
            .filter(|violation| violation.category == category)
            .collect()
    }

    pub fn summary(&self) -> AnalysisSummary {
        let mut by_severity: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_category: BTreeMap<String, usize> = BTreeMap::new();
        for violation in &self.violations {
            *by_severity
                .entry(violation.severity.label().to_string())
                .or_default() += 1;
            *by_category
                .entry(violation.category.label().to_string())
                .or_default() += 1;
        }
        AnalysisSummary {
            total: self.violations.len(),
            by_severity,
            by_category,
        }
    }
}

/// Violation counts keyed by catalog labels.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub total: usize,
    pub by_severity: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
}

/// Aggregate catalog description.
#[derive(Debug, Clone, Serialize)]
pub struct RulesSummary {
    pub total_rules: usize,
    pub categories: BTreeMap<String, usize>,
    pub severities: BTreeMap<String, usize>,
    pub rules_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ==================== scope walk ====================

/// One object a rule condition is evaluated against.
#[derive(Debug, Clone, Copy)]
enum Subject<'a> {
    Model(&'a Model),
    Table(&'a Table),
    Column { table: &'a Table, column: &'a Column },
    Measure { table: &'a Table, measure: &'a Measure },
    Relationship(&'a Relationship),
}

fn subjects_for(scope: RuleScope, model: &Model) -> Vec<Subject<'_>> {
    match scope {
        RuleScope::Model => vec![Subject::Model(model)],
        RuleScope::Table => model.tables.iter().map(Subject::Table).collect(),
        RuleScope::Column => model
            .tables
            .iter()
            .flat_map(|table| {
                table
                    .columns
                    .iter()
                    .flatten()
                    .map(move |column| Subject::Column { table, column })
            })
            .collect(),
        RuleScope::Measure => model
            .tables
            .iter()
            .flat_map(|table| {
                table
                    .measures
                    .iter()
                    .flatten()
                    .map(move |measure| Subject::Measure { table, measure })
            })
            .collect(),
        RuleScope::Relationship => model
            .relationships
            .iter()
            .map(Subject::Relationship)
            .collect(),
    }
}

impl Subject<'_> {
    fn object_type(&self) -> &'static str {
        match self {
            Self::Model(_) => "model",
            Self::Table(_) => "table",
            Self::Column { .. } => "column",
            Self::Measure { .. } => "measure",
            Self::Relationship(_) => "relationship",
        }
    }

    fn object_name(&self) -> String {
        match self {
            Self::Model(model) => model.name.clone().unwrap_or_else(|| "Model".to_string()),
            Self::Table(table) => table.display_name().to_string(),
            Self::Column { column, .. } => {
                column.name.clone().unwrap_or_else(|| "Unknown".to_string())
            }
            Self::Measure { measure, .. } => {
                measure.name.clone().unwrap_or_else(|| "Unknown".to_string())
            }
            Self::Relationship(relationship) => relationship.name.clone().unwrap_or_else(|| {
                format!(
                    "{} -> {}",
                    relationship.from_table.as_deref().unwrap_or("?"),
                    relationship.to_table.as_deref().unwrap_or("?")
                )
            }),
        }
    }

    fn table_name(&self) -> Option<String> {
        match self {
            Self::Column { table, .. } | Self::Measure { table, .. } => {
                Some(table.display_name().to_string())
            }
            _ => None,
        }
    }

    /// Resolve a rule property against this object. An unknown property
    /// name is a fault; a known property that is simply absent resolves
    /// to `None`.
    fn attribute(&self, property: &str) -> Result<Option<Attr>, EvalError> {
        let resolved = match self {
            Self::Model(model) => match property {
                "name" => text(&model.name),
                "culture" => text(&model.culture),
                "collation" => text(&model.collation),
                _ => return Err(EvalError::unknown_property(property, self.object_type())),
            },
            Self::Table(table) => match property {
                "name" => text(&table.name),
                _ => return Err(EvalError::unknown_property(property, self.object_type())),
            },
            Self::Column { column, .. } => match property {
                "name" => text(&column.name),
                "dataType" => text(&column.data_type),
                "sourceColumn" => text(&column.source_column),
                "formatString" => text(&column.format_string),
                "isKey" => flag(column.is_key),
                "isHidden" => flag(column.is_hidden),
                "isNullable" => flag(column.is_nullable),
                "isUnique" => flag(column.is_unique),
                _ => return Err(EvalError::unknown_property(property, self.object_type())),
            },
            Self::Measure { measure, .. } => match property {
                "name" => text(&measure.name),
                "expression" => measure.expression.as_ref().map(|body| Attr::Text(body.flatten())),
                "formatString" => text(&measure.format_string),
                "description" => text(&measure.description),
                "isHidden" => flag(measure.is_hidden),
                _ => return Err(EvalError::unknown_property(property, self.object_type())),
            },
            Self::Relationship(relationship) => match property {
                "name" => text(&relationship.name),
                "fromTable" => text(&relationship.from_table),
                "fromColumn" => text(&relationship.from_column),
                "toTable" => text(&relationship.to_table),
                "toColumn" => text(&relationship.to_column),
                _ => return Err(EvalError::unknown_property(property, self.object_type())),
            },
        };
        Ok(resolved)
    }
}

fn violation_for(rule: &RuleDescriptor, subject: &Subject<'_>) -> Violation {
    Violation {
        rule_id: rule.id.clone(),
        rule_name: rule.name.clone(),
        category: rule.category,
        severity: rule.severity,
        object_type: subject.object_type().to_string(),
        object_name: subject.object_name(),
        table_name: subject.table_name(),
        description: rule.description.clone(),
        fix_expression: rule.fix_expression.clone(),
    }
}

// ==================== condition evaluation ====================

/// A resolved attribute value. Flags render as `true`/`false` when a
/// string operator is applied to them.
#[derive(Debug, Clone)]
enum Attr {
    Text(String),
    Flag(bool),
}

impl Attr {
    fn as_text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Flag(true) => "true",
            Self::Flag(false) => "false",
        }
    }
}

fn text(value: &Option<String>) -> Option<Attr> {
    value.clone().map(Attr::Text)
}

fn flag(value: Option<bool>) -> Option<Attr> {
    value.map(Attr::Flag)
}

#[derive(Debug, thiserror::Error)]
enum EvalError {
    #[error("unknown property '{property}' for {scope} scope")]
    UnknownProperty { property: String, scope: &'static str },

    #[error("operator '{op}' requires a string 'value'")]
    NeedsTextValue { op: PredicateOp },

    #[error("invalid pattern '{pattern}': {source}")]
    BadPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl EvalError {
    fn unknown_property(property: &str, scope: &'static str) -> Self {
        Self::UnknownProperty {
            property: property.to_string(),
            scope,
        }
    }
}

fn eval_condition(condition: &Condition, subject: &Subject<'_>) -> Result<bool, EvalError> {
    match condition {
        Condition::AllOf { all_of } => {
            for inner in all_of {
                if !eval_condition(inner, subject)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Condition::AnyOf { any_of } => {
            for inner in any_of {
                if eval_condition(inner, subject)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Condition::Not { not } => Ok(!eval_condition(not, subject)?),
        Condition::Leaf(predicate) => eval_predicate(predicate, subject),
    }
}

fn eval_predicate(predicate: &Predicate, subject: &Subject<'_>) -> Result<bool, EvalError> {
    let resolved = subject.attribute(&predicate.property)?;
    match predicate.op {
        PredicateOp::Missing => Ok(resolved.is_none()),
        PredicateOp::Exists => Ok(resolved.is_some()),
        PredicateOp::IsTrue => Ok(matches!(resolved, Some(Attr::Flag(true)))),
        // An absent flag coalesces to false.
        PredicateOp::IsFalse => Ok(!matches!(resolved, Some(Attr::Flag(true)))),
        PredicateOp::IsEmpty => Ok(resolved
            .as_ref()
            .is_some_and(|attr| attr.as_text().trim().is_empty())),
        PredicateOp::Equals => compare(resolved.as_ref(), predicate, |text, needle| text == needle),
        PredicateOp::NotEquals => {
            compare(resolved.as_ref(), predicate, |text, needle| text != needle)
        }
        PredicateOp::Contains => compare(resolved.as_ref(), predicate, |text, needle| {
            text.contains(needle)
        }),
        PredicateOp::NotContains => compare(resolved.as_ref(), predicate, |text, needle| {
            !text.contains(needle)
        }),
        PredicateOp::StartsWith => compare(resolved.as_ref(), predicate, |text, needle| {
            text.starts_with(needle)
        }),
        PredicateOp::EndsWith => compare(resolved.as_ref(), predicate, |text, needle| {
            text.ends_with(needle)
        }),
        PredicateOp::Matches => {
            let needle = needle_of(predicate)?;
            let pattern = Regex::new(needle).map_err(|source| EvalError::BadPattern {
                pattern: needle.to_string(),
                source,
            })?;
            Ok(resolved
                .as_ref()
                .is_some_and(|attr| pattern.is_match(attr.as_text())))
        }
    }
}

/// String operators never match an absent property; `missing` targets
/// absence explicitly.
fn compare(
    resolved: Option<&Attr>,
    predicate: &Predicate,
    test: impl Fn(&str, &str) -> bool,
) -> Result<bool, EvalError> {
    let needle = needle_of(predicate)?;
    Ok(resolved.is_some_and(|attr| test(attr.as_text(), needle)))
}

fn needle_of(predicate: &Predicate) -> Result<&str, EvalError> {
    predicate
        .value
        .as_ref()
        .and_then(Value::as_str)
        .ok_or(EvalError::NeedsTextValue { op: predicate.op })
}
