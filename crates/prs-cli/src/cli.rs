//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "prs",
    version,
    about = "Provider Report Standardizer - reconcile provider exports against the canonical schema",
    long_about = "Reconcile heterogeneous provider exports (CSV) against the canonical\n\
                  reporting schema: header detection, synonym/similarity column mapping\n\
                  with reusable templates, reshaping, and contract validation with\n\
                  deterministic archive/quarantine routing."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
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

#[derive(Subcommand)]
pub enum Command {
    /// Run one file through the full pipeline to archive or quarantine.
    Process(ProcessArgs),

    /// Process every CSV file in a directory as independent pipeline runs.
    Batch(BatchArgs),

    /// Combine several files through one template into a single output.
    Combine(CombineArgs),

    /// Show the automated column mapping for a file, optionally saving it
    /// as a template.
    Map(MapArgs),

    /// List saved templates.
    Templates(StoreArgs),

    /// Print the canonical schema contract.
    Schema(ContractArgs),
}

/// Flags shared by every pipeline-running command.
#[derive(Parser)]
pub struct CommonArgs {
    /// Schema contract JSON; the built-in provider contract when omitted.
    #[arg(long = "contract", value_name = "PATH")]
    pub contract: Option<PathBuf>,

    /// Directory holding saved templates and learned synonyms.
    #[arg(long = "templates-dir", value_name = "DIR", default_value = "templates")]
    pub templates_dir: PathBuf,

    /// Additional shared synonyms JSON merged under the contract's own.
    #[arg(long = "synonyms", value_name = "PATH")]
    pub synonyms: Option<PathBuf>,

    /// Replay the saved template with this provider key.
    #[arg(long = "template", value_name = "PROVIDER")]
    pub template: Option<String>,

    /// Provider identity stamped into the provider_id column.
    #[arg(long = "provider", value_name = "NAME")]
    pub provider: Option<String>,

    /// Zero-based header row, bypassing header detection.
    #[arg(long = "header-row", value_name = "ROW")]
    pub header_row: Option<usize>,
}

/// Reshape overrides applied on top of the template's settings.
#[derive(Parser)]
pub struct ReshapeArgs {
    /// Unpivot value columns into (report_date, sales_amount) rows.
    #[arg(long = "unpivot")]
    pub unpivot: bool,

    /// Comma-separated canonical fields to group and aggregate by.
    #[arg(long = "group-by", value_name = "FIELDS")]
    pub group_by: Option<String>,

    /// Comma-separated key fields for duplicate-row removal.
    #[arg(long = "dedupe-on", value_name = "FIELDS")]
    pub dedupe_on: Option<String>,

    /// Drop rows where every canonical field is empty.
    #[arg(long = "drop-empty-rows")]
    pub drop_empty_rows: bool,

    /// Strip thousands separators from numeric-looking cells.
    #[arg(long = "strip-thousands")]
    pub strip_thousands: bool,

    /// Drop columns whose non-null ratio falls below this threshold.
    #[arg(long = "sparse-threshold", value_name = "RATIO")]
    pub sparse_threshold: Option<f64>,
}

#[derive(Parser)]
pub struct ProcessArgs {
    /// The provider export to process.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub reshape: ReshapeArgs,

    /// Directory for standardized outputs (default: output).
    #[arg(long = "output-dir", value_name = "DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Destination for files that fail validation (default: quarantine).
    #[arg(long = "quarantine-dir", value_name = "DIR", default_value = "quarantine")]
    pub quarantine_dir: PathBuf,
}

#[derive(Parser)]
pub struct BatchArgs {
    /// Directory containing provider exports.
    #[arg(value_name = "DIR")]
    pub directory: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub reshape: ReshapeArgs,

    /// Directory for standardized outputs (default: output).
    #[arg(long = "output-dir", value_name = "DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Destination for files that fail validation (default: quarantine).
    #[arg(long = "quarantine-dir", value_name = "DIR", default_value = "quarantine")]
    pub quarantine_dir: PathBuf,
}

#[derive(Parser)]
pub struct CombineArgs {
    /// Provider exports combined into one output; all must map to the
    /// same canonical column set.
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub reshape: ReshapeArgs,

    /// Name of the combined output (default: combined).
    #[arg(long = "output-name", value_name = "NAME", default_value = "combined")]
    pub output_name: String,

    /// Directory for standardized outputs (default: output).
    #[arg(long = "output-dir", value_name = "DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Destination when the combined result fails validation.
    #[arg(long = "quarantine-dir", value_name = "DIR", default_value = "quarantine")]
    pub quarantine_dir: PathBuf,
}

#[derive(Parser)]
pub struct MapArgs {
    /// The provider export to map.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub reshape: ReshapeArgs,

    /// Confirm the suggested mapping and save it under this provider key;
    /// overridden synonym pairs are promoted into the learned layer.
    #[arg(long = "save-template", value_name = "PROVIDER")]
    pub save_template: Option<String>,
}

#[derive(Parser)]
pub struct StoreArgs {
    /// Directory holding saved templates.
    #[arg(long = "templates-dir", value_name = "DIR", default_value = "templates")]
    pub templates_dir: PathBuf,
}

#[derive(Parser)]
pub struct ContractArgs {
    /// Schema contract JSON; the built-in provider contract when omitted.
    #[arg(long = "contract", value_name = "PATH")]
    pub contract: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
