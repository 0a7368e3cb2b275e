//! Segue CLI: operator commands for the content cache and answer validators.
//!
//! Provides `segue index` to build a content version, `segue problems` and
//! `segue tags` to inspect it, `segue search` for fuzzy lookup, `segue
//! validate` to mark a submission against a question, `segue sync` to bring
//! the newest version in, and `segue alias` to manage named versions.

#![warn(missing_docs)]

mod alias;
mod index;
mod pipeline;
mod problems;
mod search;
mod sync;
mod tags;
mod validate;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Segue: versioned content and answer validation.
#[derive(Parser, Debug)]
#[command(name = "segue", version, about = "Segue content and validation service")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `segue.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the cache and search index of a content version.
    Index(VersionArgs),
    /// List the content problems found in a version.
    Problems(VersionArgs),
    /// List every tag used in a version.
    Tags(VersionArgs),
    /// Fuzzy search a version.
    Search(SearchArgs),
    /// Mark an answer against a question.
    Validate(ValidateArgs),
    /// Index the newest content version, or a given one.
    Sync(SyncArgs),
    /// Show or set named version aliases.
    Alias(AliasArgs),
}

/// Arguments for commands acting on one version.
#[derive(Parser, Debug)]
pub struct VersionArgs {
    /// Content version (commit SHA) or alias.
    pub version: String,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the `segue search` subcommand.
#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Content version (commit SHA) or alias.
    pub version: String,

    /// Words to search for.
    pub query: String,

    /// Maximum number of results.
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,

    /// Search by tag instead of free text; the query is a comma separated
    /// list of tags.
    #[arg(long)]
    pub tags: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the `segue validate` subcommand.
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Content version (commit SHA) or alias.
    pub version: String,

    /// Qualified id of the question.
    pub question_id: String,

    /// JSON file holding the submitted choice, or `-` for stdin.
    pub answer: String,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the `segue sync` subcommand.
#[derive(Parser, Debug)]
pub struct SyncArgs {
    /// Version to synchronise instead of the newest.
    #[arg(long)]
    pub version: Option<String>,

    /// Point the latest alias at the synchronised version.
    #[arg(long)]
    pub alias: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the `segue alias` subcommand.
#[derive(Parser, Debug)]
pub struct AliasArgs {
    /// Alias to set. Lists every alias when omitted.
    pub name: Option<String>,

    /// Version the alias should point at.
    #[arg(requires = "name")]
    pub version: Option<String>,

    /// Evict cached versions no alias points at after setting.
    #[arg(long)]
    pub prune: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Output format for command results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    let result = run(&cli.command, &global);

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

fn run(command: &Command, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (config, root) = pipeline::load_settings(global)?;
    pipeline::init_logging(&config, global);
    let services = pipeline::Services::from_config(&config, &root)?;

    match command {
        Command::Index(args) => index::run(args, &services, global),
        Command::Problems(args) => problems::run(args, &services, global),
        Command::Tags(args) => tags::run(args, &services),
        Command::Search(args) => search::run(args, &services),
        Command::Validate(args) => validate::run(args, &services),
        Command::Sync(args) => sync::run(args, &services, global),
        Command::Alias(args) => alias::run(args, &services),
    }
}
