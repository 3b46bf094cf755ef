//! Violation grouping for display.

use std::collections::BTreeMap;

use serde::Serialize;
use tmsl_model::Violation;

/// Grouping axis for violation views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Category,
    Severity,
    ObjectType,
}

impl GroupBy {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Severity => "severity",
            Self::ObjectType => "object_type",
        }
    }

    fn key_for(&self, violation: &Violation) -> String {
        match self {
            Self::Category => violation.category.label().to_string(),
            Self::Severity => violation.severity.label().to_string(),
            Self::ObjectType => violation.object_type.clone(),
        }
    }
}

/// One display group.
#[derive(Debug, Clone, Serialize)]
pub struct ViolationGroup {
    pub key: String,
    pub count: usize,
    pub violations: Vec<Violation>,
}

/// Violations grouped along one axis, largest group first.
#[derive(Debug, Clone, Serialize)]
pub struct GroupedViolations {
    pub group_by: String,
    pub total: usize,
    pub groups: Vec<ViolationGroup>,
}

/// Group violations for display. Groups sort by descending count; ties
/// keep key order so the output is stable run to run.
pub fn group_violations(violations: &[Violation], group_by: GroupBy) -> GroupedViolations {
    let mut buckets: BTreeMap<String, Vec<Violation>> = BTreeMap::new();
    for violation in violations {
        buckets
            .entry(group_by.key_for(violation))
            .or_default()
            .push(violation.clone());
    }
    let mut groups: Vec<ViolationGroup> = buckets
        .into_iter()
        .map(|(key, violations)| ViolationGroup {
            key,
            count: violations.len(),
            violations,
        })
        .collect();
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    GroupedViolations {
        group_by: group_by.label().to_string(),
        total: violations.len(),
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmsl_model::{RuleCategory, Severity};

    fn make_violation(category: RuleCategory, severity: Severity, object: &str) -> Violation {
        Violation {
            rule_id: "R".to_string(),
            rule_name: "rule".to_string(),
            category,
            severity,
            object_type: "measure".to_string(),
            object_name: object.to_string(),
            table_name: Some("Sales".to_string()),
            description: String::new(),
            fix_expression: None,
        }
    }

    #[test]
    fn test_groups_sort_by_descending_count() {
        let violations = vec![
            make_violation(RuleCategory::Performance, Severity::Warning, "a"),
            make_violation(RuleCategory::DaxExpressions, Severity::Warning, "b"),
            make_violation(RuleCategory::DaxExpressions, Severity::Info, "c"),
        ];
        let grouped = group_violations(&violations, GroupBy::Category);
        assert_eq!(grouped.total, 3);
        assert_eq!(grouped.group_by, "category");
        assert_eq!(grouped.groups[0].key, "DAX Expressions");
        assert_eq!(grouped.groups[0].count, 2);
        assert_eq!(grouped.groups[1].key, "Performance");
        assert_eq!(grouped.groups[1].count, 1);
    }

    #[test]
    fn test_ties_stay_in_key_order() {
        let violations = vec![
            make_violation(RuleCategory::Performance, Severity::Warning, "a"),
            make_violation(RuleCategory::Formatting, Severity::Info, "b"),
            make_violation(RuleCategory::Maintenance, Severity::Info, "c"),
        ];
        let grouped = group_violations(&violations, GroupBy::Category);
        let keys: Vec<&str> = grouped
            .groups
            .iter()
            .map(|group| group.key.as_str())
            .collect();
        assert_eq!(keys, ["Formatting", "Maintenance", "Performance"]);
    }

    #[test]
    fn test_group_by_severity_and_object_type() {
        let violations = vec![
            make_violation(RuleCategory::Performance, Severity::Error, "a"),
            make_violation(RuleCategory::Performance, Severity::Error, "b"),
            make_violation(RuleCategory::Performance, Severity::Info, "c"),
        ];
        let by_severity = group_violations(&violations, GroupBy::Severity);
        assert_eq!(by_severity.groups[0].key, "ERROR");
        assert_eq!(by_severity.groups[0].count, 2);

        let by_object = group_violations(&violations, GroupBy::ObjectType);
        assert_eq!(by_object.groups.len(), 1);
        assert_eq!(by_object.groups[0].key, "measure");
        assert_eq!(by_object.groups[0].violations.len(), 3);
    }

    #[test]
    fn test_empty_input_produces_empty_view() {
        let grouped = group_violations(&[], GroupBy::Severity);
        assert_eq!(grouped.total, 0);
        assert!(grouped.groups.is_empty());
    }
}
