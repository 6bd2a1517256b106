//! Command-line interface for advocate-events.
//!
//! Scriptable access to the event-sourcing jobs:
//! - `generate`: rebuild the event log from a local clone
//! - `update`: append events since the stored cursor
//! - `project`: fold the log into the current-state and dashboard views
//! - `mappings`: print account mappings from a stored view
//! - `validate`: decode and summarize the stored log

mod commands;

pub use commands::*;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

use crate::api::View;
use crate::error::Result;

/// Event-sourced history of the advocate profile tree.
#[derive(Debug, Parser)]
#[command(name = "advocates")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the artifacts (default: config, then the data directory).
    #[arg(short = 's', long, global = true, env = "ADVOCATES_STORE_DIR")]
    pub store_dir: Option<PathBuf>,

    /// Suppress non-essential output.
    #[arg(short = 'q', long, global = true, env = "ADVOCATES_QUIET")]
    pub quiet: bool,

    /// Print reports as JSON.
    #[arg(long, global = true, env = "ADVOCATES_JSON")]
    pub json: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn", env = "ADVOCATES_LOG_LEVEL")]
    pub log_level: LogLevel,

    /// Log format (text, json, compact, pretty).
    #[arg(long, global = true, default_value = "text", env = "ADVOCATES_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Number of threads for content fetching (default: number of CPUs).
    #[arg(short = 'j', long, global = true, env = "ADVOCATES_THREADS")]
    pub threads: Option<usize>,

    /// Path to custom configuration file.
    #[arg(long, global = true, env = "ADVOCATES_CONFIG")]
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

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Rebuild the event log from the full history of a local clone.
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// Append events for the transitions after the stored cursor.
    #[command(alias = "up")]
    Update(UpdateArgs),

    /// Fold the event log into projections.
    Project(ProjectArgs),

    /// Print account mappings from a stored projection.
    Mappings(MappingsArgs),

    /// Decode the stored event log and summarize it.
    Validate(ValidateArgs),

    /// View and initialize configuration.
    #[command(alias = "cfg")]
    Config(ConfigArgs),

    /// Generate shell completions.
    Completions(CompletionsArgs),
}

/// Arguments for the generate command.
#[derive(Debug, Clone, clap::Args)]
pub struct GenerateArgs {
    /// Local clone to walk (default: `[repository] path`).
    #[arg(short = 'r', long)]
    pub repo: Option<PathBuf>,

    /// Revision to walk up to (default: `[repository] revision`).
    #[arg(long)]
    pub revision: Option<String>,

    /// Also rebuild both projections afterwards.
    #[arg(short = 'p', long)]
    pub project: bool,
}

/// Where incremental transitions come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SourceKind {
    /// A local clone, through the git executable.
    #[default]
    Local,
    /// The hosting REST API.
    Remote,
}

/// Arguments for the update command.
#[derive(Debug, Clone, clap::Args)]
pub struct UpdateArgs {
    /// History source.
    #[arg(long, value_enum, default_value = "local")]
    pub source: SourceKind,

    /// Local clone to walk (local source).
    #[arg(short = 'r', long)]
    pub repo: Option<PathBuf>,

    /// Revision to walk up to (local source).
    #[arg(long)]
    pub revision: Option<String>,

    /// Repository owner (remote source).
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name (remote source).
    #[arg(long)]
    pub name: Option<String>,

    /// Branch to compare against the cursor (remote source).
    #[arg(long)]
    pub branch: Option<String>,

    /// API base URL (remote source).
    #[arg(long)]
    pub api_base: Option<String>,

    /// API token (remote source).
    #[arg(long, env = "ADVOCATES_GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Also rebuild both projections afterwards.
    #[arg(short = 'p', long)]
    pub project: bool,
}

/// Projections the project command builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ProjectTarget {
    /// Current-state view.
    Current,
    /// Dashboard view.
    Dashboard,
    /// Both views.
    #[default]
    All,
}

/// Arguments for the project command.
#[derive(Debug, Clone, clap::Args)]
pub struct ProjectArgs {
    /// Which projection to build.
    #[arg(value_enum, default_value = "all")]
    pub target: ProjectTarget,
}

/// Stored projections mappings can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ViewArg {
    /// Current-state view.
    #[default]
    Current,
    /// Dashboard view.
    Dashboard,
}

impl From<ViewArg> for View {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::Current => View::Current,
            ViewArg::Dashboard => View::Dashboard,
        }
    }
}

/// Arguments for the mappings command.
#[derive(Debug, Clone, clap::Args)]
pub struct MappingsArgs {
    /// Projection to read.
    #[arg(long, value_enum, default_value = "current")]
    pub from: ViewArg,
}

/// Arguments for the validate command.
#[derive(Debug, Clone, clap::Args)]
pub struct ValidateArgs {
    /// Validate this log file instead of the stored artifact.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Arguments for the config command.
#[derive(Debug, Clone, clap::Args)]
pub struct ConfigArgs {
    /// Config action.
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config actions.
#[derive(Debug, Clone, Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration.
    Show,
    /// Print the configuration file path.
    Path,
    /// Write a configuration file with defaults.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
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
    generate(shell, &mut cmd, "advocates", &mut io::stdout());
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
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .pretty()
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Text => {
            let layer = fmt::layer().with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
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
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .ok(); // Ignore error if already initialized
        }
    }
}

/// Run the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Before any parallel work
    init_thread_pool(cli.threads);

    init_logging(&cli);

    match &cli.command {
        Commands::Generate(args) => commands::generate::run(&cli, args),
        Commands::Update(args) => commands::update::run(&cli, args),
        Commands::Project(args) => commands::project::run(&cli, args),
        Commands::Mappings(args) => commands::mappings::run(&cli, args),
        Commands::Validate(args) => commands::validate::run(&cli, args),
        Commands::Config(args) => commands::config::run(&cli, args),
        Commands::Completions(args) => {
            generate_completions(args.shell);
            Ok(())
        }
    }
}
