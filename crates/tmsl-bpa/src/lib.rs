//! Best-practice analysis for tabular model definitions.
//!
//! A [`RuleCatalog`] describes advisory rules as JSON (see
//! [`catalog`] for the schema); a [`BpaEngine`] evaluates them against a
//! model and returns an [`Analysis`] of violations. Violations never
//! block deployment; they carry a severity and category for filtering
//! and reporting.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod paths;

pub use catalog::{Condition, Predicate, PredicateOp, RuleCatalog, RuleDescriptor, RuleScope};
pub use engine::{Analysis, AnalysisSummary, BpaEngine, RulesSummary};
pub use error::CatalogError;
pub use paths::{RULES_ENV_VAR, default_rules_path, workspace_rules_path};
