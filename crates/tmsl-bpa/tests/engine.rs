//! The shipped catalog, end to end.

use serde_json::json;
use tmsl_bpa::{BpaEngine, workspace_rules_path};
use tmsl_model::{Model, Severity};

fn engine() -> BpaEngine {
    let engine = BpaEngine::load(workspace_rules_path());
    assert!(engine.is_enabled(), "workspace catalog must load");
    engine
}

#[test]
fn shipped_catalog_flags_known_issues() {
    let model: Model = serde_json::from_value(json!({
        "name": "SalesModel",
        "culture": "en-US",
        "tables": [{
            "name": "Sales",
            "columns": [
                {"name": "Amount", "dataType": "Double", "sourceColumn": "amount"},
                {"name": "Id", "dataType": "Int64", "isKey": true, "isHidden": true,
                 "sourceColumn": "id"}
            ],
            "measures": [
                {"name": "Ratio", "expression": "[Total] / [Count]",
                 "formatString": "0.0%", "description": "Share of total"},
                {"name": "Total", "expression": "SUM(Sales[Amount])",
                 "formatString": "#,0", "description": "Sum of amounts"}
            ]
        }]
    }))
    .expect("model");

    let analysis = engine().analyze(&model);
    assert_eq!(analysis.skipped_objects, 0, "shipped rules must not fault");
    assert_eq!(analysis.rules_applied, 12);

    let ids: Vec<&str> = analysis
        .violations
        .iter()
        .map(|violation| violation.rule_id.as_str())
        .collect();
    assert_eq!(
        ids,
        ["AVOID_FLOATING_POINT_DATA_TYPES", "USE_THE_DIVIDE_FUNCTION"],
        "unexpected violations: {:?}",
        analysis.violations
    );
    assert_eq!(analysis.violations[0].qualified_name(), "Sales[Amount]");
    assert_eq!(analysis.violations[1].qualified_name(), "Sales[Ratio]");
}

#[test]
fn naming_rules_fire_on_sloppy_single_table_payloads() {
    let payload = json!({
        "createOrReplace": {"table": {
            "name": "sales",
            "columns": [{"name": "Amount ", "dataType": "Decimal",
                         "sourceColumn": "amount"}]
        }}
    })
    .to_string();

    let analysis = engine().analyze_text(&payload);
    assert!(analysis.error.is_none());
    let ids: Vec<&str> = analysis
        .violations
        .iter()
        .map(|violation| violation.rule_id.as_str())
        .collect();
    assert!(ids.contains(&"CAPITALIZE_TABLE_NAMES"));
    assert!(ids.contains(&"OBJECTS_SHOULD_NOT_START_OR_END_WITH_A_SPACE"));
}

#[test]
fn severity_filters_stay_consistent_with_summary() {
    let model: Model = serde_json::from_value(json!({
        "tables": [{
            "name": "facts",
            "columns": [
                {"name": "value", "dataType": "Double"},
                {"name": "key", "dataType": "String", "isKey": true}
            ]
        }]
    }))
    .expect("model");

    let analysis = engine().analyze(&model);
    let summary = analysis.summary();
    assert_eq!(summary.total, analysis.violations.len());
    for severity in [Severity::Error, Severity::Warning, Severity::Info] {
        let filtered = analysis.by_severity(severity).len();
        let counted = summary
            .by_severity
            .get(severity.label())
            .copied()
            .unwrap_or(0);
        assert_eq!(filtered, counted, "mismatch at {severity}");
    }
    // Columns without a source column are the one hard error the
    // shipped catalog carries.
    assert_eq!(analysis.by_severity(Severity::Error).len(), 2);
}

#[test]
fn rules_summary_describes_the_catalog() {
    let summary = engine().rules_summary();
    assert_eq!(summary.total_rules, 12);
    assert_eq!(summary.categories.values().sum::<usize>(), 12);
    assert_eq!(summary.severities.values().sum::<usize>(), 12);
    assert_eq!(summary.categories.len(), 5);
    assert_eq!(summary.severities.len(), 3);
    assert!(summary.rules_file.ends_with("bpa.json"));
    assert!(summary.error.is_none());
}
