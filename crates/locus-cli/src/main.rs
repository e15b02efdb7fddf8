//! # locus-cli
//!
//! Diagnostic driver for the Locus import resolver.
//!
//! Loads a serialized workspace graph and runs single resolutions, alias
//! expansion, or edge inference over a batch of import records. It performs
//! no project discovery of its own.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Import resolution diagnostics for monorepo project graphs
#[derive(Parser, Debug)]
#[command(name = "locus", version, about = "Import resolution diagnostics for monorepos")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root (defaults to the directory holding locus.toml, else the current directory)
    #[arg(short = 'C', long, global = true, env = "LOCUS_ROOT")]
    pub root: Option<PathBuf>,

    /// Serialized workspace graph, relative to the workspace root
    #[arg(long, global = true, default_value = "locus-graph.json")]
    pub graph: PathBuf,

    /// Installed-dependency directory name
    #[arg(long, global = true)]
    pub installed_dir: Option<String>,

    /// Compiler configuration file names, comma separated
    #[arg(long, global = true)]
    pub tsconfig: Option<String>,

    /// Skip the compiler-aware fallback resolver
    #[arg(long, global = true)]
    pub no_language_fallback: bool,

    /// Skip the runtime fallback resolver
    #[arg(long, global = true)]
    pub no_runtime_fallback: bool,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve one specifier as seen from an importing file
    Resolve {
        /// Module specifier, e.g. `@org/shared` or `../lib/util`
        specifier: String,
        /// Workspace-relative path of the importing file
        #[arg(long)]
        from: String,
        /// Project owning the importing file (inferred from the path when omitted)
        #[arg(long)]
        project: Option<String>,
    },
    /// Infer project dependency edges from a file of import records
    Edges {
        /// JSON array of import records
        imports: PathBuf,
        /// Resolve records on a thread pool
        #[arg(long)]
        parallel: bool,
        /// Print cache statistics afterwards
        #[arg(long)]
        stats: bool,
    },
    /// Show the compiler alias candidates for a specifier
    Paths {
        specifier: String,
    },
    /// Validate settings, compiler configuration and the workspace graph
    Check,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.log_json);
    setup_panic_handler();

    info!("Starting Locus v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", ErrorFormatter::new().format_anyhow(&e));
            ExitCode::FAILURE
        },
    }
}

fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let ctx = CommandContext::from_cli(&cli)?;
    commands::dispatch_command(cli.command, &ctx)
}

fn setup_logging(verbose: bool, json: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "locus_cli={level},locus_core={level},locus_config={level},locus_resolver={level}"
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("Locus encountered an unexpected error: {}", panic_info);
        eprintln!("Locus crashed! This is a bug.");
        eprintln!("Error: {}", panic_info);
    }));
}
