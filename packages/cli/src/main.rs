mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{check, export, import, init, CheckArgs, ExportArgs, ImportArgs, InitArgs};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "JOTTER_LOG";

/// Jotter CLI - check, export and import notes
#[derive(Parser, Debug)]
#[command(name = "jotter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log editor activity (debug level) to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a config file and a notes directory
    Init(InitArgs),

    /// Load every note and report the ones that fail
    Check(CheckArgs),

    /// Export a note as HTML or JSON
    Export(ExportArgs),

    /// Import an HTML file as a new note
    Import(ImportArgs),
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| match cli.command {
            Command::Init(args) => init(args, &cwd),
            Command::Check(args) => check(args, &cwd),
            Command::Export(args) => export(args, &cwd),
            Command::Import(args) => import(args, &cwd),
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
