//! Canonical ordering and value tidying for parsed definitions.
//!
//! Two semantically identical definitions must serialize to byte-identical
//! text, so every array with a natural identity gets a deterministic order
//! and loosely-typed scalar values are tightened:
//!
//! - tables, measures, partitions, hierarchies and model expressions sort
//!   by `name`; relationships sort by `fromTable.fromColumn`;
//! - columns sort key columns first, then by name;
//! - boolean-looking flags (`"true"`, `"False"`, `0`, `1`) become real
//!   booleans; values that do not look boolean are left alone;
//! - `dataType` aliases are mapped to canonical casing;
//! - empty measure `formatString` values are dropped.
//!
//! The pass works on `serde_json::Value` so fields outside the typed tree
//! (annotations, lineage tags) ride along untouched.

use serde_json::{Map, Value};
use tmsl_model::envelope;

const COLUMN_FLAGS: [&str; 4] = ["isHidden", "isKey", "isNullable", "isUnique"];

/// Canonicalize a parsed definition in place. Payloads whose shape is not
/// recognized are left untouched.
pub fn canonicalize(root: &mut Value) {
    if let Some(model) = envelope::locate_model_mut(root) {
        canonicalize_model(model);
    } else if let Some(table) = envelope::locate_table_mut(root) {
        canonicalize_table(table);
    }
}

fn canonicalize_model(model: &mut Value) {
    if let Some(Value::Array(tables)) = model.get_mut("tables") {
        for table in tables.iter_mut() {
            canonicalize_table(table);
        }
        tables.sort_by_key(|table| name_of(table).to_string());
    }
    if let Some(Value::Array(relationships)) = model.get_mut("relationships") {
        relationships.sort_by_key(|rel| {
            format!(
                "{}.{}",
                text_of(rel, "fromTable"),
                text_of(rel, "fromColumn")
            )
        });
    }
    if let Some(Value::Array(expressions)) = model.get_mut("expressions") {
        expressions.sort_by_key(|expr| name_of(expr).to_string());
    }
}

fn canonicalize_table(table: &mut Value) {
    if let Some(Value::Array(columns)) = table.get_mut("columns") {
        for column in columns.iter_mut() {
            if let Some(object) = column.as_object_mut() {
                for flag in COLUMN_FLAGS {
                    coerce_flag(object, flag);
                }
                canonicalize_data_type(object);
            }
        }
        // Key columns first, then alphabetical.
        columns.sort_by_key(|column| (!is_key(column), name_of(column).to_string()));
    }
    if let Some(Value::Array(measures)) = table.get_mut("measures") {
        for measure in measures.iter_mut() {
            if let Some(object) = measure.as_object_mut() {
                coerce_flag(object, "isHidden");
                drop_empty_format_string(object);
            }
        }
        measures.sort_by_key(|measure| name_of(measure).to_string());
    }
    if let Some(Value::Array(partitions)) = table.get_mut("partitions") {
        partitions.sort_by_key(|partition| name_of(partition).to_string());
    }
    if let Some(Value::Array(hierarchies)) = table.get_mut("hierarchies") {
        hierarchies.sort_by_key(|hierarchy| name_of(hierarchy).to_string());
    }
}

fn name_of(value: &Value) -> &str {
    value.get("name").and_then(Value::as_str).unwrap_or("")
}

fn text_of<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("")
}

fn is_key(column: &Value) -> bool {
    column
        .get("isKey")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Rewrite a flag value to a real boolean when it merely looks boolean.
fn coerce_flag(object: &mut Map<String, Value>, key: &str) {
    let coerced = match object.get(key) {
        Some(Value::String(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        Some(Value::Number(number)) => match number.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        _ => None,
    };
    if let Some(flag) = coerced {
        object.insert(key.to_string(), Value::Bool(flag));
    }
}

fn canonicalize_data_type(object: &mut Map<String, Value>) {
    let Some(Value::String(raw)) = object.get("dataType") else {
        return;
    };
    let canonical = match raw.to_ascii_lowercase().as_str() {
        "string" => "String",
        "int64" => "Int64",
        "decimal" => "Decimal",
        "double" => "Double",
        "datetime" => "DateTime",
        "boolean" => "Boolean",
        _ => return,
    };
    if raw != canonical {
        object.insert("dataType".to_string(), Value::String(canonical.to_string()));
    }
}

fn drop_empty_format_string(object: &mut Map<String, Value>) {
    match object.get("formatString") {
        Some(Value::Null) => {
            object.remove("formatString");
        }
        Some(Value::String(text)) if text.is_empty() => {
            object.remove("formatString");
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tables_and_members_sort_deterministically() {
        let mut root = json!({
            "createOrReplace": {"database": {"model": {
                "tables": [
                    {"name": "Zeta", "measures": [{"name": "b", "expression": "1"},
                                                   {"name": "a", "expression": "2"}]},
                    {"name": "Alpha", "columns": [
                        {"name": "b", "dataType": "String"},
                        {"name": "a", "dataType": "String"},
                        {"name": "z", "dataType": "Int64", "isKey": true}
                    ]}
                ],
                "relationships": [
                    {"name": "r2", "fromTable": "Zeta", "fromColumn": "k"},
                    {"name": "r1", "fromTable": "Alpha", "fromColumn": "k"}
                ],
                "expressions": [{"name": "Second"}, {"name": "First"}]
            }}}
        });
        canonicalize(&mut root);

        let model = &root["createOrReplace"]["database"]["model"];
        assert_eq!(model["tables"][0]["name"], "Alpha");
        assert_eq!(model["tables"][1]["name"], "Zeta");
        // Key column sorts ahead of alphabetically earlier names.
        let columns = model["tables"][0]["columns"].as_array().expect("columns");
        assert_eq!(columns[0]["name"], "z");
        assert_eq!(columns[1]["name"], "a");
        assert_eq!(model["tables"][1]["measures"][0]["name"], "a");
        assert_eq!(model["relationships"][0]["name"], "r1");
        assert_eq!(model["expressions"][0]["name"], "First");
    }

    #[test]
    fn test_boolean_flags_coerce_only_when_boolean_like() {
        let mut root = json!({"model": {"tables": [{
            "name": "T",
            "columns": [
                {"name": "a", "isHidden": "True", "isKey": 1},
                {"name": "b", "isNullable": "yes", "isUnique": 0}
            ]
        }]}});
        canonicalize(&mut root);

        let columns = &root["model"]["tables"][0]["columns"];
        assert_eq!(columns[0]["isHidden"], json!(true));
        assert_eq!(columns[0]["isKey"], json!(true));
        // "yes" is not boolean-like and stays a string.
        assert_eq!(columns[1]["isNullable"], json!("yes"));
        assert_eq!(columns[1]["isUnique"], json!(false));
    }

    #[test]
    fn test_data_type_aliases_get_canonical_casing() {
        let mut root = json!({"model": {"tables": [{
            "name": "T",
            "columns": [
                {"name": "a", "dataType": "string"},
                {"name": "b", "dataType": "DATETIME"},
                {"name": "c", "dataType": "Currency"}
            ]
        }]}});
        canonicalize(&mut root);

        let columns = &root["model"]["tables"][0]["columns"];
        assert_eq!(columns[0]["dataType"], "String");
        assert_eq!(columns[1]["dataType"], "DateTime");
        // Unknown types pass through unchanged.
        assert_eq!(columns[2]["dataType"], "Currency");
    }

    #[test]
    fn test_empty_measure_format_string_is_dropped() {
        let mut root = json!({"model": {"tables": [{
            "name": "T",
            "measures": [
                {"name": "kept", "expression": "1", "formatString": "#,0"},
                {"name": "dropped", "expression": "2", "formatString": ""}
            ]
        }]}});
        canonicalize(&mut root);

        let measures = &root["model"]["tables"][0]["measures"];
        assert_eq!(measures[0]["name"], "dropped");
        assert!(measures[0].get("formatString").is_none());
        assert_eq!(measures[1]["formatString"], "#,0");
    }

    #[test]
    fn test_single_table_payload_is_canonicalized() {
        let mut root = json!({"createOrReplace": {"table": {
            "name": "Sales",
            "columns": [{"name": "b", "dataType": "int64"}, {"name": "a", "dataType": "string"}]
        }}});
        canonicalize(&mut root);

        let columns = &root["createOrReplace"]["table"]["columns"];
        assert_eq!(columns[0]["name"], "a");
        assert_eq!(columns[0]["dataType"], "String");
        assert_eq!(columns[1]["dataType"], "Int64");
    }

    #[test]
    fn test_unrecognized_payload_is_untouched() {
        let mut root = json!({"refresh": {"type": "full"}});
        let before = root.clone();
        canonicalize(&mut root);
        assert_eq!(root, before);
    }
}
