//! Property tests for the normalization pipeline.
//!
//! These check the two contract-level guarantees over generated model
//! trees: normalized output is a fixed point, and semantically identical
//! trees that differ only in array order normalize to identical text.

use proptest::prelude::*;
use serde_json::{Value, json};
use tmsl_normalize::normalize;

/// Distinct table names, so ordering is the only degree of freedom.
fn table_name_set() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::btree_set("[A-Z][a-z]{1,8}", 1..6)
        .prop_map(|names| names.into_iter().collect())
}

fn model_text(names: &[String]) -> String {
    let tables: Vec<Value> = names
        .iter()
        .map(|name| {
            json!({
                "name": name,
                "columns": [
                    {"name": "Id", "dataType": "int64", "isKey": "true"},
                    {"name": "Label", "dataType": "string"}
                ],
                "partitions": [
                    {"name": format!("{name}-part"), "mode": "import",
                     "source": {"type": "m", "expression": "let Source = 1 in Source"}}
                ]
            })
        })
        .collect();
    json!({"createOrReplace": {"database": {"name": "db", "model": {"tables": tables}}}})
        .to_string()
}

proptest! {
    #[test]
    fn normalized_output_is_a_fixed_point(names in table_name_set()) {
        let text = model_text(&names);
        let once = normalize(&text);
        prop_assert_eq!(&once, &normalize(&once));
    }

    #[test]
    fn table_order_does_not_affect_output(names in table_name_set(), swap in any::<prop::sample::Index>()) {
        let ordered = model_text(&names);

        let mut shuffled = names.clone();
        if shuffled.len() > 1 {
            let pivot = swap.index(shuffled.len());
            shuffled.rotate_left(pivot);
        }
        let rotated = model_text(&shuffled);

        prop_assert_eq!(normalize(&ordered), normalize(&rotated));
    }

    #[test]
    fn garbage_input_never_panics(raw in "\\PC*") {
        let _ = normalize(&raw);
    }
}
