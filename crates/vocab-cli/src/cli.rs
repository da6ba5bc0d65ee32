//! CLI argument definitions for the `vocab` console.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "vocab",
    version,
    about = "Review and curate the canonical variable registry",
    long_about = "Review pending parameter suggestions, promote or reject them, and\n\
                  report on registry quality.\n\n\
                  The registry directory comes from --registry, VOCAB_REGISTRY_DIR or the\n\
                  [registry] section of the config file, in that order."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Registry directory (overrides config and environment).
    #[arg(long = "registry", value_name = "DIR", global = true)]
    pub registry: Option<PathBuf>,

    /// Curator identity recorded on decisions.
    #[arg(long = "curator", value_name = "NAME", global = true)]
    pub curator: Option<String>,

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

#[derive(Subcommand)]
pub enum Command {
    /// List pending suggestions, highest confidence first.
    Review(ReviewArgs),

    /// Accept a pending suggestion into the overrides layer.
    Accept(AcceptArgs),

    /// Reject a pending suggestion.
    Reject(DecisionArgs),

    /// Defer a pending suggestion; it stays in the queue.
    Defer(DecisionArgs),

    /// Add a new canonical variable to the seed layer.
    Create(CreateArgs),

    /// Accept every pending suggestion at or above a threshold.
    Batch(BatchArgs),

    /// Registry quality report.
    Report(ReportArgs),

    /// List canonical variables of the merged registry.
    Variables(VariablesArgs),

    /// Convert a value between units.
    Convert(ConvertArgs),
}

#[derive(Args)]
pub struct ReviewArgs {
    /// Maximum number of entries to show.
    #[arg(long = "limit")]
    pub limit: Option<usize>,

    /// Only show suggestions at or above this confidence.
    #[arg(long = "min-confidence", default_value_t = 0.0)]
    pub min_confidence: f64,

    /// Only show suggestions in this domain.
    #[arg(long = "domain")]
    pub domain: Option<String>,

    /// Print JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct AcceptArgs {
    #[arg(value_name = "DATASET")]
    pub dataset: String,

    #[arg(value_name = "NATIVE_ID")]
    pub native_id: String,

    /// Bind to this canonical id instead of the suggested one.
    #[arg(long = "canonical", value_name = "ID")]
    pub canonical: Option<String>,

    /// Record a modification (repeatable).
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub modifications: Vec<String>,
}

#[derive(Args)]
pub struct DecisionArgs {
    #[arg(value_name = "DATASET")]
    pub dataset: String,

    #[arg(value_name = "NATIVE_ID")]
    pub native_id: String,

    #[arg(long = "reason")]
    pub reason: String,
}

#[derive(Args)]
pub struct CreateArgs {
    /// Canonical id, e.g. `water:discharge_cfs`.
    #[arg(value_name = "ID")]
    pub id: String,

    #[arg(long = "label")]
    pub label: String,

    #[arg(long = "domain")]
    pub domain: Option<String>,

    #[arg(long = "unit")]
    pub unit: Option<String>,

    #[arg(long = "description")]
    pub description: Option<String>,

    #[arg(long = "property-uri", value_name = "URI")]
    pub property_uri: Option<String>,

    #[arg(long = "unit-uri", value_name = "URI")]
    pub unit_uri: Option<String>,
}

#[derive(Args)]
pub struct BatchArgs {
    /// Minimum confidence (default: the configured nightly threshold).
    #[arg(long = "threshold")]
    pub threshold: Option<f64>,

    /// Show what would be accepted without writing.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ReportArgs {
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct VariablesArgs {
    #[arg(long = "domain")]
    pub domain: Option<String>,

    /// Rank variables by label similarity to this text instead.
    #[arg(long = "like", value_name = "TEXT")]
    pub like: Option<String>,

    #[arg(long = "limit", default_value_t = 10)]
    pub limit: usize,
}

#[derive(Args)]
pub struct ConvertArgs {
    #[arg(value_name = "VALUE", allow_negative_numbers = true)]
    pub value: f64,

    #[arg(value_name = "FROM")]
    pub from: String,

    #[arg(value_name = "TO")]
    pub to: String,
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
