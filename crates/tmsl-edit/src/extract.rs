//! Safe extraction of one table from a whole-model definition.
//!
//! A single-table `createOrReplace` deletes every object the payload does
//! not list, so hand-written table payloads are dangerous. `extract_table`
//! builds one from the live model definition instead: the table body is
//! carried over verbatim, which keeps fields outside the typed tree
//! (annotations, lineage tags) intact for redeployment.

use serde_json::{Value, json};
use tmsl_model::Envelope;
use tmsl_normalize::normalize;
use tracing::debug;

use crate::error::{EditError, Result};

/// Extract the named table from a whole-model definition and wrap it in a
/// single-table `createOrReplace` payload.
pub fn extract_table(definition: &str, table_name: &str) -> Result<Value> {
    let normalized = normalize(definition);
    let root: Value = serde_json::from_str(&normalized)?;
    let model = Envelope::detect(&root)
        .and_then(|envelope| envelope.model())
        .ok_or(EditError::NoModel)?;
    let tables = model
        .get("tables")
        .and_then(Value::as_array)
        .ok_or(EditError::NoTables)?;
    let table = tables
        .iter()
        .find(|table| table.get("name").and_then(Value::as_str) == Some(table_name))
        .ok_or_else(|| EditError::TableNotFound {
            name: table_name.to_string(),
            available: table_names(tables),
        })?;
    debug!(table = table_name, "extracted table for single-table replace");
    Ok(json!({"createOrReplace": {"table": table.clone()}}))
}

fn table_names(tables: &[Value]) -> Vec<String> {
    tables
        .iter()
        .map(|table| {
            table
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("unnamed")
                .to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_definition() -> String {
        json!({
            "createOrReplace": {"database": {"name": "db", "model": {
                "tables": [
                    {
                        "name": "Sales",
                        "lineageTag": "aaa-bbb",
                        "annotations": [{"name": "PBI_Id", "value": "x1"}],
                        "columns": [{"name": "Id", "dataType": "Int64"}],
                        "partitions": [{"name": "p", "mode": "import",
                                        "source": {"type": "m", "expression": "let x = 1 in x"}}]
                    },
                    {"name": "Calendar", "columns": [{"name": "Date", "dataType": "DateTime"}]}
                ]
            }}}
        })
        .to_string()
    }

    #[test]
    fn test_extracts_and_wraps_the_named_table() {
        let payload = extract_table(&sample_definition(), "Sales").expect("extract");
        let table = &payload["createOrReplace"]["table"];
        assert_eq!(table["name"], json!("Sales"));
        assert_eq!(table["columns"][0]["name"], json!("Id"));
    }

    #[test]
    fn test_fields_outside_the_typed_tree_survive() {
        let payload = extract_table(&sample_definition(), "Sales").expect("extract");
        let table = &payload["createOrReplace"]["table"];
        assert_eq!(table["lineageTag"], json!("aaa-bbb"));
        assert_eq!(table["annotations"][0]["name"], json!("PBI_Id"));
    }

    #[test]
    fn test_unknown_table_lists_available_names() {
        let err = extract_table(&sample_definition(), "Orders").expect_err("unknown table");
        match &err {
            EditError::TableNotFound { name, available } => {
                assert_eq!(name, "Orders");
                assert!(available.contains(&"Sales".to_string()));
                assert!(available.contains(&"Calendar".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("Sales"));
    }

    #[test]
    fn test_bare_model_content_is_accepted() {
        let bare = json!({"tables": [{"name": "Facts", "columns": []}]}).to_string();
        let payload = extract_table(&bare, "Facts").expect("extract");
        assert_eq!(payload["createOrReplace"]["table"]["name"], json!("Facts"));
    }

    #[test]
    fn test_single_table_payload_has_no_model() {
        let table_only = json!({"createOrReplace": {"table": {"name": "Sales"}}}).to_string();
        assert!(matches!(
            extract_table(&table_only, "Sales"),
            Err(EditError::NoModel)
        ));
    }

    #[test]
    fn test_unparseable_text_is_a_parse_error() {
        assert!(matches!(
            extract_table("{\"model\": ", "Sales"),
            Err(EditError::Parse(_))
        ));
    }

    #[test]
    fn test_model_without_tables_array() {
        let no_tables = json!({"model": {"culture": "en-US"}}).to_string();
        assert!(matches!(
            extract_table(&no_tables, "Sales"),
            Err(EditError::NoTables)
        ));
    }
}
