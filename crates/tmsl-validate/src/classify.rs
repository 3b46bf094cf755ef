//! Storage-mode classification.
//!
//! The model kind is derived from the set of partition `mode` values across
//! all tables, and decides which structural rule set applies:
//!
//! | partition mode set                  | kind       |
//! |-------------------------------------|------------|
//! | empty                               | Unknown    |
//! | contains `directLake` and `import`  | Mixed      |
//! | exactly `{directLake}`              | DirectLake |
//! | exactly `{import}`                  | Import     |
//! | anything else                       | Unknown    |
//!
//! Partitions without a `mode` contribute nothing to the set. Mode strings
//! match exactly (`directLake` is camelCase on the wire).

use std::collections::BTreeSet;

use tmsl_model::{Model, ModelKind, Table};

/// Classify a whole model.
pub fn classify(model: &Model) -> ModelKind {
    kind_of_modes(&model.partition_modes())
}

/// Classify a single table, for table-scoped payloads.
pub fn classify_table(table: &Table) -> ModelKind {
    kind_of_modes(&table.partition_modes())
}

fn kind_of_modes(modes: &BTreeSet<String>) -> ModelKind {
    let direct_lake = modes.contains("directLake");
    let import = modes.contains("import");
    match (direct_lake, import) {
        (true, true) => ModelKind::Mixed,
        (true, false) if modes.len() == 1 => ModelKind::DirectLake,
        (false, true) if modes.len() == 1 => ModelKind::Import,
        _ => ModelKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_with_modes(modes: &[&str]) -> Model {
        let tables: Vec<serde_json::Value> = modes
            .iter()
            .enumerate()
            .map(|(index, mode)| {
                serde_json::json!({
                    "name": format!("T{index}"),
                    "partitions": [{"name": format!("p{index}"), "mode": mode}]
                })
            })
            .collect();
        serde_json::from_value(serde_json::json!({"tables": tables})).expect("model")
    }

    #[test]
    fn test_pure_mode_sets() {
        assert_eq!(classify(&model_with_modes(&["directLake"])), ModelKind::DirectLake);
        assert_eq!(
            classify(&model_with_modes(&["directLake", "directLake"])),
            ModelKind::DirectLake
        );
        assert_eq!(classify(&model_with_modes(&["import"])), ModelKind::Import);
    }

    #[test]
    fn test_mixed_requires_both_families() {
        assert_eq!(
            classify(&model_with_modes(&["directLake", "import"])),
            ModelKind::Mixed
        );
        // A third mode does not break the mixed classification.
        assert_eq!(
            classify(&model_with_modes(&["directLake", "import", "directQuery"])),
            ModelKind::Mixed
        );
    }

    #[test]
    fn test_foreign_modes_classify_unknown() {
        assert_eq!(
            classify(&model_with_modes(&["directQuery"])),
            ModelKind::Unknown
        );
        // Import plus a foreign mode is not "exactly import".
        assert_eq!(
            classify(&model_with_modes(&["import", "directQuery"])),
            ModelKind::Unknown
        );
    }

    #[test]
    fn test_empty_models_classify_unknown() {
        assert_eq!(classify(&Model::default()), ModelKind::Unknown);

        // Partitions without a mode contribute nothing.
        let model: Model = serde_json::from_value(serde_json::json!({
            "tables": [{"name": "T", "partitions": [{"name": "p"}]}]
        }))
        .expect("model");
        assert_eq!(classify(&model), ModelKind::Unknown);
    }

    #[test]
    fn test_table_classification_uses_own_partitions() {
        let table: Table = serde_json::from_value(serde_json::json!({
            "name": "Sales",
            "partitions": [{"name": "p", "mode": "directLake"}]
        }))
        .expect("table");
        assert_eq!(classify_table(&table), ModelKind::DirectLake);
    }
}
