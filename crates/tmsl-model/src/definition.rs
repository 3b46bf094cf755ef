//! Tabular model definition tree.
//!
//! These types mirror the JSON shape of a tabular model definition as it
//! appears inside a deployment script (`createOrReplace`/`create` command
//! envelopes). Deserialization is deliberately permissive:
//!
//! - every field that may legally be absent is an `Option`, so downstream
//!   checks test presence exactly once, at the type level;
//! - `Option<Vec<_>>` distinguishes an absent key from an explicitly empty
//!   array, which matters for replace semantics (an empty `columns` array
//!   deletes every column the live table has);
//! - unknown fields are ignored here and preserved by the value-level
//!   normalization and editing passes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Storage-mode family of a model definition, derived from the set of
/// partition `mode` values across all tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// All partitions use `import` mode.
    Import,
    /// All partitions use `directLake` mode.
    DirectLake,
    /// Both `import` and `directLake` partitions are present.
    Mixed,
    /// No partitions, or a mode set outside the known families.
    Unknown,
}

impl ModelKind {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Import => "Import",
            Self::DirectLake => "DirectLake",
            Self::Mixed => "Mixed",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// An M or DAX expression body.
///
/// Scripts carry expression text either as a single string or as an array
/// of source lines; both deserialize into this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MText {
    Text(String),
    Lines(Vec<String>),
}

impl MText {
    /// Join the expression into a single string with `\n` between lines.
    pub fn flatten(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Lines(lines) => lines.join("\n"),
        }
    }

    /// True when the expression carries no non-whitespace content.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Lines(lines) => lines.iter().all(|line| line.trim().is_empty()),
        }
    }
}

/// The model body of a definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub name: Option<String>,
    pub culture: Option<String>,
    pub collation: Option<String>,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    /// Model-level named expressions (shared M expressions such as the
    /// lakehouse `DatabaseQuery`).
    #[serde(default)]
    pub expressions: Vec<NamedExpression>,
}

impl Model {
    /// Collect the distinct partition `mode` values across all tables.
    pub fn partition_modes(&self) -> BTreeSet<String> {
        self.tables
            .iter()
            .flat_map(Table::partition_modes)
            .collect()
    }
}

/// A table in the model.
///
/// `mode`/`default_mode` are modeled even though they are not legal table
/// properties: their presence in a submitted definition is the single most
/// dangerous authoring mistake (the deployment service ignores them and the
/// replace silently falls back to default storage), so the validator needs
/// to see them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub name: Option<String>,
    pub mode: Option<String>,
    pub default_mode: Option<String>,
    pub columns: Option<Vec<Column>>,
    pub measures: Option<Vec<Measure>>,
    pub partitions: Option<Vec<Partition>>,
    pub hierarchies: Option<Vec<Hierarchy>>,
    pub annotations: Option<Vec<Annotation>>,
}

impl Table {
    /// Table name for messages; unnamed tables report as "Unknown".
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }

    /// Collect the distinct partition `mode` values of this table.
    pub fn partition_modes(&self) -> BTreeSet<String> {
        self.partitions
            .iter()
            .flatten()
            .filter_map(|partition| partition.mode.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: Option<String>,
    pub data_type: Option<String>,
    pub is_key: Option<bool>,
    pub is_hidden: Option<bool>,
    pub is_nullable: Option<bool>,
    pub is_unique: Option<bool>,
    pub source_column: Option<String>,
    pub format_string: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    pub name: Option<String>,
    pub expression: Option<MText>,
    pub format_string: Option<String>,
    pub description: Option<String>,
    pub is_hidden: Option<bool>,
}

/// A table partition. `source.type` decides how the remaining source
/// fields are interpreted (`m` carries an expression, `entity` points at a
/// lakehouse table).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partition {
    pub name: Option<String>,
    pub mode: Option<String>,
    pub source: Option<PartitionSource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionSource {
    #[serde(rename = "type")]
    pub source_type: Option<String>,
    pub expression: Option<MText>,
    pub entity_name: Option<String>,
    pub schema_name: Option<String>,
    pub expression_source: Option<String>,
}

/// A model-level named expression (`kind` is `"m"` for M expressions).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedExpression {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub expression: Option<MText>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub name: Option<String>,
    pub from_table: Option<String>,
    pub from_column: Option<String>,
    pub to_table: Option<String>,
    pub to_column: Option<String>,
}

/// A display hierarchy. Level contents are untouched by validation and
/// survive value-level passes, so only the name is modeled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hierarchy {
    pub name: Option<String>,
}

/// A tool annotation; the value is arbitrary JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub name: Option<String>,
    pub value: Option<serde_json::Value>,
}
