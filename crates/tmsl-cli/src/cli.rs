//! CLI argument definitions for the tabular model linter.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tmsl_model::{RuleCategory, Severity};
use tmsl_report::{GroupBy, ReportFormat};

#[derive(Debug, Parser)]
#[command(
    name = "tmsl-lint",
    version,
    about = "Validate and lint tabular model definitions",
    long_about = "Validate tabular model (TMSL) definitions before deployment.\n\n\
                  Checks the structural rules that gate deployment, runs a versioned\n\
                  catalog of best-practice rules, and builds safe single-table update\n\
                  payloads from a whole-model definition."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Repair and canonicalize a definition, printing the result.
    Normalize(NormalizeArgs),

    /// Check a definition against the structural deployment gate.
    Validate(ValidateArgs),

    /// Run the best-practice rule catalog over a definition.
    Analyze(AnalyzeArgs),

    /// Generate a JSON best-practice report.
    Report(ReportArgs),

    /// Describe the loaded rule catalog.
    Rules(RulesArgs),

    /// Extract a complete single-table update payload from a model.
    Extract(ExtractArgs),
}

#[derive(Debug, Parser)]
pub struct NormalizeArgs {
    /// Definition file to read ("-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

#[derive(Debug, Parser)]
pub struct ValidateArgs {
    /// Definition file to read ("-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// Definition file to read ("-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Rule catalog path (default: $TMSL_BPA_RULES or the bundled catalog).
    #[arg(long = "rules", value_name = "PATH")]
    pub rules: Option<PathBuf>,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,

    /// Only show violations at this severity.
    #[arg(long = "severity", value_enum)]
    pub severity: Option<SeverityArg>,

    /// Only show violations in this category.
    #[arg(long = "category", value_enum)]
    pub category: Option<CategoryArg>,

    /// Group violations instead of listing them flat.
    #[arg(long = "group-by", value_enum)]
    pub group_by: Option<GroupByArg>,
}

#[derive(Debug, Parser)]
pub struct ReportArgs {
    /// Definition file to read ("-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Rule catalog path (default: $TMSL_BPA_RULES or the bundled catalog).
    #[arg(long = "rules", value_name = "PATH")]
    pub rules: Option<PathBuf>,

    /// Report document shape.
    #[arg(long = "report-format", value_enum, default_value = "summary")]
    pub report_format: ReportFormatArg,
}

#[derive(Debug, Parser)]
pub struct RulesArgs {
    /// Rule catalog path (default: $TMSL_BPA_RULES or the bundled catalog).
    #[arg(long = "rules", value_name = "PATH")]
    pub rules: Option<PathBuf>,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,
}

#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Whole-model definition file to read ("-" for stdin).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Table to extract.
    #[arg(long = "table", value_name = "NAME")]
    pub table: String,

    /// Add or replace a measure of this name in the extracted payload.
    #[arg(long = "add-measure", value_name = "NAME", requires = "dax")]
    pub add_measure: Option<String>,

    /// DAX expression for --add-measure.
    #[arg(long = "dax", value_name = "EXPRESSION", requires = "add_measure")]
    pub dax: Option<String>,

    /// Format string for --add-measure.
    #[arg(long = "measure-format", value_name = "FORMAT", requires = "add_measure")]
    pub measure_format: Option<String>,

    /// Description for --add-measure.
    #[arg(
        long = "measure-description",
        value_name = "TEXT",
        requires = "add_measure"
    )]
    pub measure_description: Option<String>,

    /// Write the payload to a file instead of stdout.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ReportFormatArg {
    Summary,
    Detailed,
    ByCategory,
}

impl ReportFormatArg {
    pub fn to_report_format(self) -> ReportFormat {
        match self {
            Self::Summary => ReportFormat::Summary,
            Self::Detailed => ReportFormat::Detailed,
            Self::ByCategory => ReportFormat::ByCategory,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SeverityArg {
    Info,
    Warning,
    Error,
}

impl SeverityArg {
    pub fn to_severity(self) -> Severity {
        match self {
            Self::Info => Severity::Info,
            Self::Warning => Severity::Warning,
            Self::Error => Severity::Error,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CategoryArg {
    Performance,
    DaxExpressions,
    Maintenance,
    NamingConventions,
    Formatting,
}

impl CategoryArg {
    pub fn to_category(self) -> RuleCategory {
        match self {
            Self::Performance => RuleCategory::Performance,
            Self::DaxExpressions => RuleCategory::DaxExpressions,
            Self::Maintenance => RuleCategory::Maintenance,
            Self::NamingConventions => RuleCategory::NamingConventions,
            Self::Formatting => RuleCategory::Formatting,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum GroupByArg {
    Category,
    Severity,
    ObjectType,
}

impl GroupByArg {
    pub fn to_group_by(self) -> GroupBy {
        match self {
            Self::Category => GroupBy::Category,
            Self::Severity => GroupBy::Severity,
            Self::ObjectType => GroupBy::ObjectType,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
