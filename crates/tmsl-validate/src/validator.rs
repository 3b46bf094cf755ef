//! Structural validation of definition payloads.
//!
//! `validate` takes raw definition text, runs it through the shared
//! normalization pass, and dispatches on the envelope shape:
//!
//! - whole-database and bare model payloads get the rule set for their
//!   storage-mode classification plus the common rules;
//! - single-table payloads get the replace-safety rule set, which leads
//!   with destructive-operation warnings before any structural finding;
//! - unparseable text and unrecognized shapes produce a result instead
//!   of an error, so callers always have something to report.
//!
//! Errors gate deployment (`valid == false`); warnings and suggestions
//! never do. In mixed-mode models the import rules stay mandatory while
//! the DirectLake rules are demoted to warnings, since a DirectLake
//! violation there may only affect the tables that use that mode.

use std::collections::BTreeMap;

use serde_json::Value;
use tmsl_model::{
    Column, Envelope, MText, Measure, Model, ModelKind, NamedExpression, Partition, Table,
    ValidationResult,
};
use tmsl_normalize::normalize;
use tracing::debug;

use crate::classify::{classify, classify_table};

/// How a rule set records its findings. DirectLake checks run as
/// `Advisory` on the mixed-mode path.
#[derive(Debug, Clone, Copy)]
enum Mandate {
    Mandatory,
    Advisory,
}

/// Accumulator for one validation pass.
#[derive(Debug, Default)]
struct Findings {
    errors: Vec<String>,
    warnings: Vec<String>,
    suggestions: Vec<String>,
}

impl Findings {
    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    fn suggest(&mut self, message: impl Into<String>) {
        self.suggestions.push(message.into());
    }

    fn record(&mut self, mandate: Mandate, message: impl Into<String>) {
        match mandate {
            Mandate::Mandatory => self.error(message),
            Mandate::Advisory => self.warning(message),
        }
    }

    fn into_result(self, summary: String) -> ValidationResult {
        ValidationResult {
            valid: self.errors.is_empty(),
            errors: self.errors,
            warnings: self.warnings,
            suggestions: self.suggestions,
            summary,
        }
    }
}

/// Validate raw definition text.
pub fn validate(text: &str) -> ValidationResult {
    let normalized = normalize(text);
    let root: Value = match serde_json::from_str(&normalized) {
        Ok(value) => value,
        Err(error) => {
            debug!(%error, "definition text failed to parse");
            let mut findings = Findings::default();
            findings.error(format!("Definition is not valid JSON: {error}"));
            findings.suggest("Fix the JSON syntax and resubmit the definition");
            return finish(findings);
        }
    };
    match Envelope::detect(&root) {
        Some(Envelope::WholeDatabase { model } | Envelope::Bare { model }) => {
            validate_model_payload(model)
        }
        Some(Envelope::SingleTable { table }) => validate_table_payload(table),
        None => {
            let mut findings = Findings::default();
            findings.warning("No model or table content found in the definition");
            findings.suggest("Submit a createOrReplace script or bare model content");
            finish(findings)
        }
    }
}

// ==================== whole-model rules ====================

fn validate_model_payload(value: &Value) -> ValidationResult {
    let mut findings = Findings::default();
    let model: Model = match serde_json::from_value(value.clone()) {
        Ok(model) => model,
        Err(error) => {
            findings.error(format!(
                "Model content does not match the expected shape: {error}"
            ));
            findings.suggest("Check the model body against the tabular object model");
            return finish(findings);
        }
    };
    let kind = classify(&model);
    debug!(kind = %kind, tables = model.tables.len(), "validating model payload");
    match kind {
        ModelKind::DirectLake => check_direct_lake(&model, &mut findings, Mandate::Mandatory),
        ModelKind::Import => check_import(&model, &mut findings),
        ModelKind::Mixed => {
            findings.warning(
                "Model mixes import and directLake partitions; pick one storage mode per model",
            );
            findings.suggest("Split mixed-mode tables or convert them to a single storage mode");
            check_import(&model, &mut findings);
            check_direct_lake(&model, &mut findings, Mandate::Advisory);
        }
        ModelKind::Unknown => {
            findings.warning("Model storage mode could not be determined from partition modes");
            findings.suggest("Set each partition 'mode' to 'import' or 'directLake'");
        }
    }
    check_common(&model, &mut findings);
    finish(findings)
}

fn check_direct_lake(model: &Model, findings: &mut Findings, mandate: Mandate) {
    let database_query = model.expressions.iter().find(|expression| {
        expression.name.as_deref() == Some("DatabaseQuery")
            && expression.kind.as_deref() == Some("m")
    });
    match database_query {
        Some(expression) => {
            let body = expression
                .expression
                .as_ref()
                .map(MText::flatten)
                .unwrap_or_default();
            if !body.contains("Sql.Database") {
                findings.warning(
                    "'DatabaseQuery' expression does not reference Sql.Database; DirectLake \
                     sources normally point at the lakehouse SQL endpoint",
                );
            }
        }
        None if model.expressions.is_empty() => {
            findings.record(
                mandate,
                "DirectLake model has no 'expressions' block; a 'DatabaseQuery' expression of \
                 kind 'm' is required",
            );
            findings.suggest(
                "Add a model-level 'expressions' entry named 'DatabaseQuery' with kind 'm'",
            );
        }
        None => {
            findings.record(
                mandate,
                "'DatabaseQuery' expression of kind 'm' not found in the model 'expressions' block",
            );
            findings.suggest("Name the lakehouse M expression 'DatabaseQuery' and set its kind to 'm'");
        }
    }
    for table in &model.tables {
        for partition in table.partitions.iter().flatten() {
            if partition.mode.as_deref() == Some("directLake") {
                check_direct_lake_partition(table.display_name(), partition, findings, mandate);
            }
        }
    }
}

fn check_direct_lake_partition(
    table: &str,
    partition: &Partition,
    findings: &mut Findings,
    mandate: Mandate,
) {
    let name = partition_name(partition);
    let Some(source) = &partition.source else {
        findings.record(
            mandate,
            format!("DirectLake partition '{name}' in table '{table}' has no 'source'"),
        );
        findings.suggest(format!(
            "Give partition '{name}' an entity source with 'entityName' and 'expressionSource'"
        ));
        return;
    };
    if source.entity_name.is_none() {
        findings.record(
            mandate,
            format!("DirectLake partition '{name}' in table '{table}' is missing 'entityName'"),
        );
    }
    if source.schema_name.is_none() {
        findings.warning(format!(
            "DirectLake partition '{name}' in table '{table}' has no 'schemaName'; the default \
             schema is assumed"
        ));
        findings.suggest(format!(
            "Set 'schemaName' on partition '{name}' explicitly (usually 'dbo')"
        ));
    }
    if source.expression_source.as_deref() != Some("DatabaseQuery") {
        findings.warning(format!(
            "DirectLake partition '{name}' in table '{table}' does not set 'expressionSource' to \
             'DatabaseQuery'"
        ));
    }
}

fn check_import(model: &Model, findings: &mut Findings) {
    for table in &model.tables {
        for partition in table.partitions.iter().flatten() {
            if partition.mode.as_deref() == Some("import") {
                check_import_partition(table.display_name(), partition, findings);
            }
        }
    }
    for expression in &model.expressions {
        check_expression_body(expression, findings);
    }
}

fn check_import_partition(table: &str, partition: &Partition, findings: &mut Findings) {
    let name = partition_name(partition);
    let Some(source) = &partition.source else {
        findings.error(format!(
            "Import partition '{name}' in table '{table}' has no 'source'"
        ));
        findings.suggest(format!(
            "Give partition '{name}' an M source with a 'type' and an 'expression'"
        ));
        return;
    };
    if source.source_type.is_none() {
        findings.warning(format!(
            "Import partition '{name}' in table '{table}' does not declare a source 'type'"
        ));
    }
    if source.source_type.as_deref() == Some("m")
        && source.expression.as_ref().is_none_or(MText::is_blank)
    {
        findings.error(format!(
            "Import partition '{name}' in table '{table}' has source type 'm' but no 'expression'"
        ));
        findings.suggest(format!("Add the M query text to partition '{name}'"));
    }
}

fn check_expression_body(expression: &NamedExpression, findings: &mut Findings) {
    if expression.expression.as_ref().is_none_or(MText::is_blank) {
        let name = expression.name.as_deref().unwrap_or("Unknown");
        findings.warning(format!("Model expression '{name}' has no 'expression' body"));
    }
}

// ==================== common rules ====================

fn check_common(model: &Model, findings: &mut Findings) {
    for table in &model.tables {
        let name = table.display_name();
        check_table_mode_properties(table, findings);
        match &table.partitions {
            None => {
                findings.warning(format!("Table '{name}' has no 'partitions' array"));
                findings.suggest(format!("Define at least one partition for table '{name}'"));
            }
            Some(partitions) if partitions.is_empty() => {
                findings.warning(format!("Table '{name}' has an empty 'partitions' array"));
                findings.suggest(format!("Define at least one partition for table '{name}'"));
            }
            Some(_) => {}
        }
    }
    check_duplicates(
        "table",
        model.tables.iter().map(|table| table.name.as_deref()),
        findings,
    );
    check_duplicates(
        "expression",
        model
            .expressions
            .iter()
            .map(|expression| expression.name.as_deref()),
        findings,
    );
}

/// Table-level `mode`/`defaultMode` are the highest-priority finding:
/// the deployment service ignores them and the replace silently falls
/// back to default storage.
fn check_table_mode_properties(table: &Table, findings: &mut Findings) {
    let name = table.display_name();
    if let Some(mode) = &table.mode {
        findings.error(format!(
            "Table '{name}' sets 'mode' ('{mode}') at the table level; storage mode is a \
             partition property and deploying this definition can silently change how the table \
             is stored"
        ));
        findings.suggest(format!(
            "Remove 'mode' from table '{name}' and set it on each partition instead"
        ));
    }
    if let Some(mode) = &table.default_mode {
        findings.error(format!(
            "Table '{name}' sets 'defaultMode' ('{mode}') at the table level; storage mode is a \
             partition property and deploying this definition can silently change how the table \
             is stored"
        ));
        findings.suggest(format!(
            "Remove 'defaultMode' from table '{name}' and set the mode on each partition instead"
        ));
    }
}

fn check_duplicates<'a>(
    kind: &str,
    names: impl Iterator<Item = Option<&'a str>>,
    findings: &mut Findings,
) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for name in names.flatten() {
        *counts.entry(name).or_default() += 1;
    }
    for (name, count) in counts {
        if count > 1 {
            findings.error(format!(
                "Duplicate {kind} name '{name}' appears {count} times"
            ));
            findings.suggest(format!(
                "Rename the duplicates; {kind} names must be unique within the model"
            ));
        }
    }
}

// ==================== single-table rules ====================

fn validate_table_payload(value: &Value) -> ValidationResult {
    let mut findings = Findings::default();
    let table: Table = match serde_json::from_value(value.clone()) {
        Ok(table) => table,
        Err(error) => {
            findings.error(format!(
                "Table content does not match the expected shape: {error}"
            ));
            findings.suggest("Check the table body against the tabular object model");
            return finish(findings);
        }
    };
    let name = table.display_name().to_string();
    debug!(table = %name, "validating single-table payload");

    // The replace reminder always leads, before any structural finding.
    findings.warning(format!(
        "createOrReplace on table '{name}' is a destructive operation: the live table \
         definition is completely replaced"
    ));
    findings.warning(
        "Objects missing from this payload (columns, measures, partitions, hierarchies, \
         annotations) are permanently deleted",
    );
    findings.suggest(format!(
        "Verify the payload lists every column, measure, partition, hierarchy, and annotation \
         table '{name}' should keep"
    ));
    findings.suggest(format!(
        "Back up the current definition of table '{name}' before deploying"
    ));

    check_table_preservation(&table, &mut findings);
    check_table_mode_properties(&table, &mut findings);
    for partition in table.partitions.iter().flatten() {
        match partition.mode.as_deref() {
            Some("directLake") => {
                check_direct_lake_partition(&name, partition, &mut findings, Mandate::Mandatory);
            }
            Some("import") => check_import_partition(&name, partition, &mut findings),
            _ => {}
        }
    }

    let kind = classify_table(&table);
    let summary = format!(
        "🔥 Destructive replace of table '{name}' ({kind}) | {}",
        summary_line(findings.errors.len(), findings.warnings.len())
    );
    findings.into_result(summary)
}

fn check_table_preservation(table: &Table, findings: &mut Findings) {
    let name = table.display_name();
    match &table.columns {
        None => {
            findings.error(format!(
                "Table '{name}' has no 'columns'; the replace would leave the table without any \
                 of its existing columns"
            ));
            findings.suggest(format!("Include the full column list for table '{name}'"));
        }
        Some(columns) if columns.is_empty() => {
            findings.error(format!(
                "Table '{name}' has an empty 'columns' array; the replace would delete every \
                 existing column"
            ));
            findings.suggest(format!("Include the full column list for table '{name}'"));
        }
        Some(columns) => {
            for (index, column) in columns.iter().enumerate() {
                check_column(name, index, column, findings);
            }
        }
    }
    match &table.partitions {
        None => {
            findings.error(format!(
                "Table '{name}' has no 'partitions'; the replaced table would have no data source"
            ));
            findings.suggest(format!("Include at least one partition for table '{name}'"));
        }
        Some(partitions) if partitions.is_empty() => {
            findings.error(format!(
                "Table '{name}' has an empty 'partitions' array; the replaced table would have \
                 no data source"
            ));
            findings.suggest(format!("Include at least one partition for table '{name}'"));
        }
        Some(_) => {}
    }
    // Absence is ambiguous (the author may simply have omitted the key);
    // an explicit empty array is a deliberate delete-all.
    match &table.measures {
        None => {
            findings.warning(format!(
                "Payload has no 'measures' key; measures on the live table '{name}' would be \
                 deleted if any exist"
            ));
            findings.suggest(format!(
                "List the existing measures of table '{name}' in the payload, or confirm the \
                 table has none"
            ));
        }
        Some(measures) if measures.is_empty() => {
            findings.warning(format!(
                "Payload has an empty 'measures' array; every measure on the live table '{name}' \
                 will be deleted"
            ));
        }
        Some(measures) => {
            for (index, measure) in measures.iter().enumerate() {
                check_measure(name, index, measure, findings);
            }
        }
    }
    if table.hierarchies.is_none() {
        findings.warning(format!(
            "Payload has no 'hierarchies' key; hierarchies on the live table '{name}' would be \
             deleted"
        ));
    }
    if table.annotations.is_none() {
        findings.warning(format!(
            "Payload has no 'annotations' key; annotations on the live table '{name}' would be \
             deleted"
        ));
    }
}

fn check_column(table: &str, index: usize, column: &Column, findings: &mut Findings) {
    let label = column
        .name
        .clone()
        .unwrap_or_else(|| format!("#{}", index + 1));
    if column.name.is_none() {
        findings.error(format!(
            "Column {} in table '{table}' has no 'name'",
            index + 1
        ));
    }
    if column.data_type.is_none() {
        findings.warning(format!(
            "Column '{label}' in table '{table}' has no 'dataType'"
        ));
    }
}

fn check_measure(table: &str, index: usize, measure: &Measure, findings: &mut Findings) {
    let label = measure
        .name
        .clone()
        .unwrap_or_else(|| format!("#{}", index + 1));
    if measure.name.is_none() {
        findings.error(format!(
            "Measure {} in table '{table}' has no 'name'",
            index + 1
        ));
    }
    if measure.expression.as_ref().is_none_or(MText::is_blank) {
        findings.error(format!(
            "Measure '{label}' in table '{table}' has a missing or empty 'expression'"
        ));
    }
}

// ==================== assembly ====================

fn partition_name(partition: &Partition) -> &str {
    partition.name.as_deref().unwrap_or("Unknown")
}

fn finish(findings: Findings) -> ValidationResult {
    let summary = summary_line(findings.errors.len(), findings.warnings.len());
    findings.into_result(summary)
}

fn summary_line(errors: usize, warnings: usize) -> String {
    let mut parts = vec![if errors == 0 {
        "✅ No critical errors".to_string()
    } else {
        format!("❌ {errors} critical errors detected")
    }];
    if warnings > 0 {
        parts.push(format!("⚠️ {warnings} warnings"));
    }
    parts.join(" | ")
}
