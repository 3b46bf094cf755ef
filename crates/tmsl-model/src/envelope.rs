//! Deployment-script envelope detection.
//!
//! A definition can arrive as a full deployment command
//! (`createOrReplace`/`create` of a database), as a table-scoped
//! `createOrReplace`, or as bare model content. Detection works on the
//! parsed JSON value so that it can run before (and independently of)
//! typed deserialization.

use serde_json::Value;

/// The recognized payload shapes of a submitted definition.
#[derive(Debug, Clone, Copy)]
pub enum Envelope<'a> {
    /// `createOrReplace`/`create` of a full database; replaces every object
    /// not listed in the model body.
    WholeDatabase { model: &'a Value },
    /// `createOrReplace` of a single table; replaces every object not
    /// listed in the table body.
    SingleTable { table: &'a Value },
    /// Bare model content: a top-level `model` key, or a model body with a
    /// `tables` array and no command wrapper.
    Bare { model: &'a Value },
}

impl<'a> Envelope<'a> {
    /// Classify a parsed definition. Returns `None` when the value is not
    /// an object or matches none of the known shapes.
    pub fn detect(root: &'a Value) -> Option<Envelope<'a>> {
        let object = root.as_object()?;
        if let Some(command) = object.get("createOrReplace") {
            if let Some(model) = command.get("database").and_then(|db| db.get("model")) {
                return Some(Envelope::WholeDatabase { model });
            }
            if let Some(table) = command.get("table") {
                return Some(Envelope::SingleTable { table });
            }
            return None;
        }
        if let Some(model) = object
            .get("create")
            .and_then(|command| command.get("database"))
            .and_then(|db| db.get("model"))
        {
            return Some(Envelope::WholeDatabase { model });
        }
        if let Some(model) = object.get("model") {
            return Some(Envelope::Bare { model });
        }
        if object.contains_key("tables") {
            return Some(Envelope::Bare { model: root });
        }
        None
    }

    /// The model body, for whole-database and bare shapes.
    pub fn model(&self) -> Option<&'a Value> {
        match self {
            Envelope::WholeDatabase { model } | Envelope::Bare { model } => Some(model),
            Envelope::SingleTable { .. } => None,
        }
    }

    /// The table body, for the single-table shape.
    pub fn table(&self) -> Option<&'a Value> {
        match self {
            Envelope::SingleTable { table } => Some(table),
            _ => None,
        }
    }
}

/// Mutable access to the model body under any whole-database or bare
/// envelope, for passes that rewrite the tree in place.
pub fn locate_model_mut(root: &mut Value) -> Option<&mut Value> {
    if root
        .get("createOrReplace")
        .and_then(|command| command.get("database"))
        .and_then(|db| db.get("model"))
        .is_some()
    {
        return root
            .get_mut("createOrReplace")?
            .get_mut("database")?
            .get_mut("model");
    }
    if root
        .get("create")
        .and_then(|command| command.get("database"))
        .and_then(|db| db.get("model"))
        .is_some()
    {
        return root.get_mut("create")?.get_mut("database")?.get_mut("model");
    }
    if root.get("model").is_some() {
        return root.get_mut("model");
    }
    if root.get("tables").is_some() {
        return Some(root);
    }
    None
}

/// Mutable access to the table body of a single-table envelope.
pub fn locate_table_mut(root: &mut Value) -> Option<&mut Value> {
    if root
        .get("createOrReplace")
        .and_then(|command| command.get("table"))
        .is_some()
    {
        return root.get_mut("createOrReplace")?.get_mut("table");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detects_create_or_replace_database() {
        let root = json!({
            "createOrReplace": {
                "database": {"name": "db", "model": {"tables": []}}
            }
        });
        let envelope = Envelope::detect(&root).expect("envelope");
        assert!(matches!(envelope, Envelope::WholeDatabase { .. }));
        assert!(envelope.model().is_some());
        assert!(envelope.table().is_none());
    }

    #[test]
    fn test_detects_create_database() {
        let root = json!({
            "create": {"database": {"model": {"tables": []}}}
        });
        assert!(matches!(
            Envelope::detect(&root),
            Some(Envelope::WholeDatabase { .. })
        ));
    }

    #[test]
    fn test_detects_single_table() {
        let root = json!({
            "createOrReplace": {"table": {"name": "Sales", "columns": []}}
        });
        let envelope = Envelope::detect(&root).expect("envelope");
        assert!(matches!(envelope, Envelope::SingleTable { .. }));
        assert_eq!(
            envelope.table().and_then(|table| table.get("name")),
            Some(&json!("Sales"))
        );
    }

    #[test]
    fn test_detects_bare_shapes() {
        let with_model_key = json!({"model": {"tables": []}});
        assert!(matches!(
            Envelope::detect(&with_model_key),
            Some(Envelope::Bare { .. })
        ));

        let bare_tables = json!({"tables": [{"name": "Sales"}]});
        let envelope = Envelope::detect(&bare_tables).expect("envelope");
        assert_eq!(
            envelope.model().and_then(|model| model.get("tables")),
            bare_tables.get("tables")
        );
    }

    #[test]
    fn test_rejects_unrecognized_shapes() {
        assert!(Envelope::detect(&json!([1, 2, 3])).is_none());
        assert!(Envelope::detect(&json!({"refresh": {}})).is_none());
        // Command wrapper with neither a database model nor a table body.
        assert!(
            Envelope::detect(&json!({"createOrReplace": {"database": {"name": "db"}}})).is_none()
        );
    }

    #[test]
    fn test_locate_model_mut_reaches_nested_body() {
        let mut root = json!({
            "createOrReplace": {"database": {"model": {"tables": []}}}
        });
        let model = locate_model_mut(&mut root).expect("model slot");
        model["name"] = json!("patched");
        assert_eq!(
            root["createOrReplace"]["database"]["model"]["name"],
            json!("patched")
        );

        let mut table_payload = json!({"createOrReplace": {"table": {"name": "Sales"}}});
        assert!(locate_model_mut(&mut table_payload).is_none());
        assert!(locate_table_mut(&mut table_payload).is_some());
    }
}
