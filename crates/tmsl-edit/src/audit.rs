//! Data-loss audit of a single-table payload.
//!
//! Lighter than the full structural validation: this pass only answers
//! "does the payload list everything the replace must preserve". It works
//! at the JSON level so it can audit payloads straight out of
//! [`extract_table`](crate::extract_table) without a typed round trip.

use serde_json::Value;
use tmsl_model::{Envelope, ValidationResult};

/// Audit a single-table `createOrReplace` payload for data-loss gaps.
/// Missing or empty `columns`/`partitions` are errors; a missing
/// `measures` key and per-item gaps are softer findings. Never fails;
/// a payload of the wrong shape comes back as an invalid result.
pub fn check_completeness(payload: &Value) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut suggestions = Vec::new();

    let Some(table) = Envelope::detect(payload).and_then(|envelope| envelope.table()) else {
        return ValidationResult {
            valid: false,
            errors: vec!["Payload is not a single-table createOrReplace script".to_string()],
            warnings: Vec::new(),
            suggestions: vec!["Build the payload with extract_table".to_string()],
            summary: "❌ Not a single-table payload".to_string(),
        };
    };
    let name = table
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_string();

    match table.get("columns").and_then(Value::as_array).map(Vec::as_slice) {
        None | Some([]) => {
            errors.push(format!(
                "Table '{name}' payload lists no columns; every existing column would be deleted"
            ));
            suggestions.push(
                "Extract the full table definition so every existing column is listed".to_string(),
            );
        }
        Some(columns) => {
            for (index, column) in columns.iter().enumerate() {
                audit_column(&name, index, column, &mut errors, &mut warnings);
            }
        }
    }

    match table
        .get("partitions")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
    {
        None | Some([]) => {
            errors.push(format!(
                "Table '{name}' payload lists no partitions; the replaced table would have no \
                 data source"
            ));
            suggestions
                .push("Include every existing partition with its complete source".to_string());
        }
        Some(_) => {}
    }

    match table.get("measures") {
        None => {
            warnings.push(format!(
                "Payload has no 'measures' key; measures on the live table '{name}' would be \
                 deleted if any exist"
            ));
            suggestions.push(
                "List the existing measures in the payload, or confirm the table has none"
                    .to_string(),
            );
        }
        Some(Value::Array(measures)) => {
            for (index, measure) in measures.iter().enumerate() {
                audit_measure(&name, index, measure, &mut errors);
            }
        }
        Some(_) => {
            errors.push(format!("Table '{name}' payload has a malformed 'measures' field"));
        }
    }

    finish(&name, errors, warnings, suggestions)
}

fn audit_column(
    table: &str,
    index: usize,
    column: &Value,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    let label = column
        .get("name")
        .and_then(Value::as_str)
        .map_or_else(|| format!("#{}", index + 1), ToString::to_string);
    if column.get("name").is_none() {
        errors.push(format!(
            "Column {} in table '{table}' has no 'name'",
            index + 1
        ));
    }
    if column.get("dataType").is_none() {
        warnings.push(format!(
            "Column '{label}' in table '{table}' has no 'dataType'"
        ));
    }
}

fn audit_measure(table: &str, index: usize, measure: &Value, errors: &mut Vec<String>) {
    let label = measure
        .get("name")
        .and_then(Value::as_str)
        .map_or_else(|| format!("#{}", index + 1), ToString::to_string);
    if measure.get("name").is_none() {
        errors.push(format!(
            "Measure {} in table '{table}' has no 'name'",
            index + 1
        ));
    }
    let blank = match measure.get("expression") {
        None => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(_) => false,
    };
    if blank {
        errors.push(format!(
            "Measure '{label}' in table '{table}' has a missing or empty 'expression'"
        ));
    }
}

fn finish(
    name: &str,
    errors: Vec<String>,
    warnings: Vec<String>,
    suggestions: Vec<String>,
) -> ValidationResult {
    let mut summary = if errors.is_empty() {
        format!("✅ Table '{name}' payload is complete")
    } else {
        format!(
            "❌ Table '{name}' payload has {} data-loss risks",
            errors.len()
        )
    };
    if !warnings.is_empty() {
        summary.push_str(&format!(" | ⚠️ {} warnings", warnings.len()));
    }
    ValidationResult {
        valid: errors.is_empty(),
        errors,
        warnings,
        suggestions,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_complete_payload_passes() {
        let payload = json!({
            "createOrReplace": {"table": {
                "name": "Sales",
                "columns": [{"name": "Id", "dataType": "Int64"}],
                "measures": [{"name": "Total", "expression": "SUM(Sales[Id])"}],
                "partitions": [{"name": "p", "mode": "import",
                                "source": {"type": "m", "expression": "let x = 1 in x"}}]
            }}
        });
        let result = check_completeness(&payload);
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        assert!(result.summary.contains("complete"));
    }

    #[test]
    fn test_missing_columns_and_partitions_are_errors() {
        let payload = json!({"createOrReplace": {"table": {"name": "Sales", "partitions": []}}});
        let result = check_completeness(&payload);
        assert!(!result.valid);
        assert_eq!(result.error_count(), 2);
        assert!(result.errors[0].contains("columns"));
        assert!(result.errors[1].contains("partitions"));
    }

    #[test]
    fn test_absent_measures_key_is_a_warning() {
        let payload = json!({
            "createOrReplace": {"table": {
                "name": "Sales",
                "columns": [{"name": "Id", "dataType": "Int64"}],
                "partitions": [{"name": "p"}]
            }}
        });
        let result = check_completeness(&payload);
        assert!(result.valid);
        assert!(result.warnings.iter().any(|w| w.contains("'measures'")));
    }

    #[test]
    fn test_item_level_gaps() {
        let payload = json!({
            "createOrReplace": {"table": {
                "name": "Sales",
                "columns": [{"dataType": "Int64"}, {"name": "Amount"}],
                "measures": [{"name": "Total", "expression": "  "}],
                "partitions": [{"name": "p"}]
            }}
        });
        let result = check_completeness(&payload);
        assert!(!result.valid);
        assert!(
            result
                .errors
                .iter()
                .any(|e| e.contains("Column 1") && e.contains("name"))
        );
        assert!(
            result
                .errors
                .iter()
                .any(|e| e.contains("Total") && e.contains("expression"))
        );
        assert!(result.warnings.iter().any(|w| w.contains("dataType")));
    }

    #[test]
    fn test_wrong_shape_is_reported_not_thrown() {
        let result = check_completeness(&json!({"model": {"tables": []}}));
        assert!(!result.valid);
        assert!(result.errors[0].contains("single-table"));
    }
}
