//! Subcommand implementations.
//!
//! Each `run_*` takes its parsed arguments, reads the definition (a file
//! path or `-` for stdin), and prints either a human table or JSON.
//! Command results go to stdout; diagnostics go through `tracing`.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tmsl_bpa::{Analysis, BpaEngine};
use tmsl_edit::{MeasureSpec, add_measure, check_completeness, extract_table};
use tmsl_model::ValidationResult;
use tmsl_normalize::normalize;
use tmsl_report::{BpaReport, group_violations};
use tracing::{debug, info};

use crate::cli::{
    AnalyzeArgs, ExtractArgs, NormalizeArgs, OutputFormatArg, ReportArgs, RulesArgs, ValidateArgs,
};
use crate::render;

pub fn run_normalize(args: &NormalizeArgs) -> Result<()> {
    let text = read_input(&args.input)?;
    println!("{}", normalize(&text));
    Ok(())
}

pub fn run_validate(args: &ValidateArgs) -> Result<ValidationResult> {
    let text = read_input(&args.input)?;
    debug!(input = %args.input.display(), "running structural validation");
    let result = tmsl_validate::validate(&text);
    match args.format {
        OutputFormatArg::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormatArg::Table => render::print_validation(&result),
    }
    Ok(result)
}

pub fn run_analyze(args: &AnalyzeArgs) -> Result<()> {
    let text = read_input(&args.input)?;
    let engine = engine_for(args.rules.as_deref());
    let analysis = apply_filters(engine.analyze_text(&text), args);
    if let Some(group_by) = args.group_by {
        let grouped = group_violations(&analysis.violations, group_by.to_group_by());
        match args.format {
            OutputFormatArg::Json => println!("{}", serde_json::to_string_pretty(&grouped)?),
            OutputFormatArg::Table => render::print_grouped(&grouped),
        }
        return Ok(());
    }
    match args.format {
        OutputFormatArg::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
        OutputFormatArg::Table => render::print_analysis(&analysis),
    }
    Ok(())
}

pub fn run_report(args: &ReportArgs) -> Result<()> {
    let text = read_input(&args.input)?;
    let engine = engine_for(args.rules.as_deref());
    let analysis = engine.analyze_text(&text);
    let report = BpaReport::build(&analysis, args.report_format.to_report_format());
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub fn run_rules(args: &RulesArgs) -> Result<()> {
    let engine = engine_for(args.rules.as_deref());
    let summary = engine.rules_summary();
    match args.format {
        OutputFormatArg::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormatArg::Table => render::print_rules_summary(&summary),
    }
    Ok(())
}

pub fn run_extract(args: &ExtractArgs) -> Result<()> {
    let text = read_input(&args.input)?;
    let mut payload = extract_table(&text, &args.table)?;
    if let (Some(name), Some(dax)) = (&args.add_measure, &args.dax) {
        let mut spec = MeasureSpec::new(name, dax);
        if let Some(format) = &args.measure_format {
            spec = spec.format_string(format);
        }
        if let Some(description) = &args.measure_description {
            spec = spec.description(description);
        }
        add_measure(&mut payload, &spec)?;
        info!(measure = %name, table = %args.table, "measure added to extracted payload");
    }

    // The audit goes to stderr so the payload on stdout stays pipeable.
    let audit = check_completeness(&payload);
    render::print_audit(&audit);

    let rendered = serde_json::to_string_pretty(&payload)?;
    match &args.output {
        Some(path) => {
            fs::write(path, format!("{rendered}\n"))
                .with_context(|| format!("write payload to {}", path.display()))?;
            info!(path = %path.display(), "payload written");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("read definition from stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("read definition from {}", path.display()))
}

fn engine_for(rules: Option<&Path>) -> BpaEngine {
    match rules {
        Some(path) => BpaEngine::load(path),
        None => BpaEngine::new(),
    }
}

/// Drop violations the `--severity`/`--category` filters exclude. Counts
/// (`rules_applied`, `skipped_objects`) describe the full run either way.
fn apply_filters(analysis: Analysis, args: &AnalyzeArgs) -> Analysis {
    if args.severity.is_none() && args.category.is_none() {
        return analysis;
    }
    let Analysis {
        violations,
        rules_applied,
        skipped_objects,
        error,
    } = analysis;
    let violations = violations
        .into_iter()
        .filter(|violation| {
            args.severity
                .is_none_or(|severity| violation.severity == severity.to_severity())
                && args
                    .category
                    .is_none_or(|category| violation.category == category.to_category())
        })
        .collect();
    Analysis {
        violations,
        rules_applied,
        skipped_objects,
        error,
    }
}
