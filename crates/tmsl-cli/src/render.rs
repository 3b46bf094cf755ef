//! Human-readable table rendering for command output.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use tmsl_bpa::{Analysis, RulesSummary};
use tmsl_model::{Severity, ValidationResult, Violation};
use tmsl_report::GroupedViolations;

pub fn print_validation(result: &ValidationResult) {
    println!("{}", result.summary);
    if result.errors.is_empty() && result.warnings.is_empty() && result.suggestions.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Kind"), header_cell("Finding")]);
    apply_table_style(&mut table);
    for error in &result.errors {
        table.add_row(vec![
            Cell::new("ERROR")
                .fg(Color::Red)
                .add_attribute(Attribute::Bold),
            Cell::new(error),
        ]);
    }
    for warning in &result.warnings {
        table.add_row(vec![Cell::new("WARNING").fg(Color::Yellow), Cell::new(warning)]);
    }
    for suggestion in &result.suggestions {
        table.add_row(vec![dim_cell("SUGGEST"), Cell::new(suggestion)]);
    }
    println!("{table}");
}

pub fn print_analysis(analysis: &Analysis) {
    if let Some(error) = &analysis.error {
        eprintln!("analysis unavailable: {error}");
        return;
    }
    if analysis.violations.is_empty() {
        println!(
            "No best-practice violations ({} rules applied)",
            analysis.rules_applied
        );
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Category"),
        header_cell("Object"),
        header_cell("Rule"),
        header_cell("Description"),
    ]);
    apply_violation_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    for violation in ordered_violations(&analysis.violations) {
        table.add_row(vec![
            severity_cell(violation.severity),
            Cell::new(violation.category.label()),
            Cell::new(violation.qualified_name()),
            Cell::new(&violation.rule_id),
            Cell::new(&violation.description),
        ]);
    }
    println!("{table}");
    let mut tail = format!(
        "{} violations | {} rules applied",
        analysis.violations.len(),
        analysis.rules_applied
    );
    if analysis.skipped_objects > 0 {
        tail.push_str(&format!(" | {} checks skipped", analysis.skipped_objects));
    }
    println!("{tail}");
}

pub fn print_grouped(grouped: &GroupedViolations) {
    println!("{} violations by {}", grouped.total, grouped.group_by);
    if grouped.groups.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Group"),
        header_cell("Count"),
        header_cell("Objects"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for group in &grouped.groups {
        let objects = group
            .violations
            .iter()
            .map(Violation::qualified_name)
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(&group.key).add_attribute(Attribute::Bold),
            count_cell(group.count),
            Cell::new(objects),
        ]);
    }
    println!("{table}");
}

pub fn print_rules_summary(summary: &RulesSummary) {
    println!("Catalog: {}", summary.rules_file);
    if let Some(error) = &summary.error {
        eprintln!("catalog unavailable: {error}");
        return;
    }
    println!("Rules: {}", summary.total_rules);
    let mut by_category = Table::new();
    by_category.set_header(vec![header_cell("Category"), header_cell("Rules")]);
    apply_table_style(&mut by_category);
    align_column(&mut by_category, 1, CellAlignment::Right);
    for (category, count) in &summary.categories {
        by_category.add_row(vec![Cell::new(category), Cell::new(count)]);
    }
    println!("{by_category}");
    let mut by_severity = Table::new();
    by_severity.set_header(vec![header_cell("Severity"), header_cell("Rules")]);
    apply_table_style(&mut by_severity);
    align_column(&mut by_severity, 1, CellAlignment::Right);
    for (severity, count) in &summary.severities {
        by_severity.add_row(vec![
            severity_cell(Severity::from_str(severity)),
            Cell::new(count),
        ]);
    }
    println!("{by_severity}");
}

/// Completeness audit for `extract`; written to stderr so stdout stays
/// reserved for the payload.
pub fn print_audit(audit: &ValidationResult) {
    eprintln!("{}", audit.summary);
    for error in &audit.errors {
        eprintln!("  error: {error}");
    }
    for warning in &audit.warnings {
        eprintln!("  warning: {warning}");
    }
}

/// Severity descending, then rule id, then object, for stable display.
fn ordered_violations(violations: &[Violation]) -> Vec<&Violation> {
    let mut ordered: Vec<&Violation> = violations.iter().collect();
    ordered.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.rule_id.cmp(&b.rule_id))
            .then_with(|| a.object_name.cmp(&b.object_name))
    });
    ordered
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("ERROR")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Severity::Warning => Cell::new("WARNING").fg(Color::Yellow),
        Severity::Info => Cell::new("INFO").fg(Color::Blue),
    }
}

fn count_cell(value: usize) -> Cell {
    if value > 0 {
        Cell::new(value).add_attribute(Attribute::Bold)
    } else {
        dim_cell(value)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_violation_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    if table.column_count() >= 5 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(10)),
            ColumnConstraint::UpperBoundary(Width::Fixed(20)),
            ColumnConstraint::UpperBoundary(Width::Fixed(28)),
            ColumnConstraint::UpperBoundary(Width::Fixed(40)),
            ColumnConstraint::UpperBoundary(Width::Percentage(45)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
