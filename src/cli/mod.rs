//! Command-line interface for issue-status-metrics.
//!
//! Provides scriptable access to time-in-status accounting with these
//! commands:
//! - `events`: Extract status events from a saved issue page or payload
//! - `durations`: Time spent in each status, per item
//! - `stats`: Mean, median and 90th percentile per status across items
//! - `config`: View and modify configuration
//! - `completions`: Generate shell completions

mod commands;

pub use commands::*;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

use crate::error::Result;

/// Time-in-status metrics for issue tracker histories.
#[derive(Debug, Parser)]
#[command(name = "status-metrics")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Status to account for (repeatable or comma-separated; overrides config).
    #[arg(
        short = 'S',
        long = "status",
        global = true,
        value_delimiter = ',',
        env = "STATUS_METRICS_STATUSES"
    )]
    pub statuses: Vec<String>,

    /// Evaluation instant for open items, RFC 3339 (default: current time).
    #[arg(long, global = true, env = "STATUS_METRICS_NOW")]
    pub now: Option<String>,

    /// How long after closure status events still count (e.g. "5m").
    #[arg(long, global = true, env = "STATUS_METRICS_GRACE_PERIOD")]
    pub grace_period: Option<String>,

    /// Fail on malformed records and inconsistent items instead of skipping.
    #[arg(long, global = true, env = "STATUS_METRICS_STRICT")]
    pub strict: bool,

    /// Output format for structured data.
    #[arg(short = 'o', long, global = true, default_value = "text", env = "STATUS_METRICS_OUTPUT")]
    pub output: OutputFormat,

    /// Suppress non-essential output.
    #[arg(short = 'q', long, global = true, env = "STATUS_METRICS_QUIET")]
    pub quiet: bool,

    /// Output as JSON (shorthand for -o json).
    #[arg(long, global = true, env = "STATUS_METRICS_JSON")]
    pub json: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn", env = "STATUS_METRICS_LOG_LEVEL")]
    pub log_level: LogLevel,

    /// Log format (text, json, compact, pretty).
    #[arg(long, global = true, default_value = "text", env = "STATUS_METRICS_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Number of threads for parallel processing (default: number of CPUs).
    #[arg(short = 'j', long, global = true, env = "STATUS_METRICS_THREADS")]
    pub threads: Option<usize>,

    /// Path to custom configuration file.
    #[arg(long, global = true, env = "STATUS_METRICS_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Log level options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    /// Only errors.
    Error,
    /// Errors and warnings.
    #[default]
    Warn,
    /// Errors, warnings, and informational messages.
    Info,
    /// All of the above plus debug messages.
    Debug,
    /// All messages including trace-level details.
    Trace,
}

/// Log format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format.
    #[default]
    Text,
    /// Structured JSON format for machine consumption.
    Json,
    /// Compact single-line format.
    Compact,
    /// Pretty format with full details.
    Pretty,
}

impl LogLevel {
    /// Convert to tracing filter level.
    #[must_use]
    pub fn to_filter_string(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl Cli {
    /// Get effective output format.
    #[must_use]
    pub fn effective_output(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.output
        }
    }
}

/// Output format for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// Tab-separated values (durations in seconds).
    Tsv,
    /// Compact single-line JSON.
    Compact,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract status events from a saved issue page or JSON payload.
    #[command(alias = "ev")]
    Events(EventsArgs),

    /// Show time spent in each status, per item.
    #[command(alias = "dur")]
    Durations(DurationsArgs),

    /// Show mean, median and 90th percentile per status.
    #[command(alias = "stat")]
    Stats(StatsArgs),

    /// View and modify configuration.
    #[command(alias = "cfg")]
    Config(ConfigArgs),

    /// Generate shell completions.
    Completions(CompletionsArgs),
}

/// Arguments for the events command.
#[derive(Debug, Parser)]
pub struct EventsArgs {
    /// Saved issue page (HTML) or bare JSON payload.
    pub document: PathBuf,
}

/// Arguments for the durations command.
#[derive(Debug, Parser)]
pub struct DurationsArgs {
    /// Item files (JSONL or JSON array) or directories containing them.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

/// Arguments for the stats command.
#[derive(Debug, Parser)]
pub struct StatsArgs {
    /// Item files (JSONL or JSON array) or directories containing them.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Also list per-item durations.
    #[arg(long)]
    pub per_item: bool,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    /// Config action to perform.
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommand actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show all configuration values.
    Show,

    /// Get a specific configuration value.
    Get {
        /// Configuration key (e.g., "accounting.grace_period").
        key: String,
    },

    /// Set a configuration value.
    Set {
        /// Configuration key (e.g., "statuses.names").
        key: String,
        /// Value to set.
        value: String,
    },

    /// Show configuration file path.
    Path,

    /// Initialize configuration file with defaults.
    Init,

    /// Reset configuration to defaults.
    Reset,
}

/// Arguments for the completions command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: CompletionShell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompletionShell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// PowerShell.
    Powershell,
    /// Elvish shell.
    Elvish,
}

impl From<CompletionShell> for Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Shell::Bash,
            CompletionShell::Zsh => Shell::Zsh,
            CompletionShell::Fish => Shell::Fish,
            CompletionShell::Powershell => Shell::PowerShell,
            CompletionShell::Elvish => Shell::Elvish,
        }
    }
}

/// Generate shell completions and print to stdout.
pub fn generate_completions(shell: CompletionShell) {
    let mut cmd = Cli::command();
    let shell: Shell = shell.into();
    generate(shell, &mut cmd, "status-metrics", &mut io::stdout());
}

/// Initialize tracing/logging based on CLI options.
fn init_logging(cli: &Cli) {
    use tracing_subscriber::{
        fmt::{self, format::FmtSpan},
        layer::SubscriberExt,
        util::SubscriberInitExt,
        EnvFilter,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_filter_string()));

    let result = match cli.log_format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_span_events(FmtSpan::CLOSE)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(layer).try_init()
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(layer).try_init()
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .pretty()
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(layer).try_init()
        }
        LogFormat::Text => {
            let layer = fmt::layer().with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(layer).try_init()
        }
    };

    if let Err(e) = result {
        eprintln!("Warning: Could not initialize logging: {e}");
    }
}

/// Initialize rayon thread pool with custom thread count if specified.
fn init_thread_pool(threads: Option<usize>) {
    if let Some(num_threads) = threads {
        if num_threads > 0 {
            // Already-initialized pool is fine
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .ok();
        }
    }
}

/// Run the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_thread_pool(cli.threads);
    init_logging(&cli);

    match &cli.command {
        Commands::Events(args) => commands::events::run(&cli, args),
        Commands::Durations(args) => commands::durations::run(&cli, args),
        Commands::Stats(args) => commands::stats::run(&cli, args),
        Commands::Config(args) => commands::config::run(&cli, args),
        Commands::Completions(args) => {
            generate_completions(args.shell);
            Ok(())
        }
    }
}
