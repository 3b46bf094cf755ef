//! Measure upserts on single-table payloads.

use serde_json::{Map, Value, json};
use tmsl_model::envelope;

use crate::error::{EditError, Result};

/// A measure to add or replace.
#[derive(Debug, Clone)]
pub struct MeasureSpec {
    pub name: String,
    pub expression: String,
    pub format_string: Option<String>,
    pub description: Option<String>,
}

impl MeasureSpec {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            format_string: None,
            description: None,
        }
    }

    #[must_use]
    pub fn format_string(mut self, format_string: impl Into<String>) -> Self {
        self.format_string = Some(format_string.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn to_value(&self) -> Value {
        let mut measure = Map::new();
        measure.insert("name".to_string(), json!(self.name));
        measure.insert("expression".to_string(), json!(self.expression));
        if let Some(format_string) = &self.format_string {
            measure.insert("formatString".to_string(), json!(format_string));
        }
        if let Some(description) = &self.description {
            measure.insert("description".to_string(), json!(description));
        }
        Value::Object(measure)
    }
}

/// Upsert a measure into a single-table payload: an existing measure of
/// the same name is replaced whole, otherwise the measure is appended.
/// A missing `measures` array is created.
pub fn add_measure(payload: &mut Value, spec: &MeasureSpec) -> Result<()> {
    let table = envelope::locate_table_mut(payload).ok_or(EditError::NotTablePayload)?;
    let table = table.as_object_mut().ok_or(EditError::NotTablePayload)?;
    let measures = table
        .entry("measures")
        .or_insert_with(|| json!([]))
        .as_array_mut()
        .ok_or_else(|| EditError::Malformed {
            reason: "'measures' is not an array".to_string(),
        })?;
    let replacement = spec.to_value();
    for slot in measures.iter_mut() {
        if slot.get("name").and_then(Value::as_str) == Some(spec.name.as_str()) {
            *slot = replacement;
            return Ok(());
        }
    }
    measures.push(replacement);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_payload() -> Value {
        json!({
            "createOrReplace": {"table": {
                "name": "Sales",
                "columns": [{"name": "Amount", "dataType": "Decimal"}],
                "measures": [{"name": "Total", "expression": "SUM(Sales[Amount])",
                              "formatString": "#,0"}]
            }}
        })
    }

    #[test]
    fn test_appends_a_new_measure() {
        let mut payload = table_payload();
        let spec = MeasureSpec::new("Average", "AVERAGE(Sales[Amount])")
            .format_string("0.00")
            .description("Mean sale amount");
        add_measure(&mut payload, &spec).expect("upsert");
        let measures = payload["createOrReplace"]["table"]["measures"]
            .as_array()
            .expect("measures");
        assert_eq!(measures.len(), 2);
        assert_eq!(measures[1]["name"], json!("Average"));
        assert_eq!(measures[1]["formatString"], json!("0.00"));
        assert_eq!(measures[1]["description"], json!("Mean sale amount"));
    }

    #[test]
    fn test_replaces_an_existing_measure_whole() {
        let mut payload = table_payload();
        let spec = MeasureSpec::new("Total", "SUMX(Sales, Sales[Amount])");
        add_measure(&mut payload, &spec).expect("upsert");
        let measures = payload["createOrReplace"]["table"]["measures"]
            .as_array()
            .expect("measures");
        assert_eq!(measures.len(), 1);
        assert_eq!(measures[0]["expression"], json!("SUMX(Sales, Sales[Amount])"));
        // Fields the replacement does not carry are dropped.
        assert!(measures[0].get("formatString").is_none());
    }

    #[test]
    fn test_creates_the_measures_array_when_missing() {
        let mut payload = json!({"createOrReplace": {"table": {"name": "Sales"}}});
        add_measure(&mut payload, &MeasureSpec::new("Total", "SUM(Sales[Amount])"))
            .expect("upsert");
        assert_eq!(
            payload["createOrReplace"]["table"]["measures"][0]["name"],
            json!("Total")
        );
    }

    #[test]
    fn test_rejects_non_table_payloads() {
        let mut whole_model = json!({"createOrReplace": {"database": {"model": {"tables": []}}}});
        assert!(matches!(
            add_measure(&mut whole_model, &MeasureSpec::new("m", "1")),
            Err(EditError::NotTablePayload)
        ));
    }

    #[test]
    fn test_rejects_a_non_array_measures_field() {
        let mut payload = json!({"createOrReplace": {"table": {"name": "Sales", "measures": 7}}});
        assert!(matches!(
            add_measure(&mut payload, &MeasureSpec::new("m", "1")),
            Err(EditError::Malformed { .. })
        ));
    }
}
