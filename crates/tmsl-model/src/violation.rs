use crate::severity::{RuleCategory, Severity};
use serde::{Deserialize, Serialize};

/// A best-practice violation emitted by the rule engine.
///
/// Violations are advisory data, never a gate: the identity fields say
/// which object matched, the rule fields say why, and `fix_expression`
/// carries the catalog's suggested remediation when one exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub rule_id: String,
    pub rule_name: String,
    pub category: RuleCategory,
    pub severity: Severity,
    /// Object kind the rule matched: "model", "table", "column", "measure"
    /// or "relationship".
    pub object_type: String,
    pub object_name: String,
    /// Parent table, set for table-scoped children (columns, measures).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_expression: Option<String>,
}

impl Violation {
    /// Qualified object identity for display, e.g. `Sales[Amount]`.
    pub fn qualified_name(&self) -> String {
        match &self.table_name {
            Some(table) if !table.is_empty() => format!("{}[{}]", table, self.object_name),
            _ => self.object_name.clone(),
        }
    }
}
