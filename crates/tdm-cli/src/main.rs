//! tdm CLI
//!
//! Mirrors a tracked tree into a portable mirror tree and back.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use commands::RootArgs;
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli {
        verbose,
        quiet,
        config,
        tracked_root,
        mirror_root,
        command,
    } = Cli::parse();

    init_tracing(verbose, quiet)?;

    let Some(command) = command else {
        println!("{} tracked directory mirror", "tdm".green().bold());
        println!();
        println!("Run {} for available commands.", "tdm --help".cyan());
        return Ok(());
    };

    let roots = RootArgs {
        config,
        tracked_root,
        mirror_root,
    };
    execute_command(command, &roots)
}

/// Log to stderr at INFO, DEBUG with `--verbose`, WARN with `--quiet`.
/// `RUST_LOG` takes precedence when set.
fn init_tracing(verbose: bool, quiet: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::DEBUG
    } else if quiet {
        LevelFilter::WARN
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| CliError::user(format!("Failed to set tracing subscriber: {e}")))?;
    tracing::debug!("Verbose mode enabled");
    Ok(())
}

fn execute_command(cmd: Commands, roots: &RootArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let settings = commands::resolve_settings(roots)?;

    match cmd {
        Commands::Track { path, dry_run } => {
            let engine = commands::build_engine(&settings, &cwd, dry_run)?;
            commands::run_track(&engine, &path)
        }
        Commands::Refresh { dry_run } => {
            let engine = commands::build_engine(&settings, &cwd, dry_run)?;
            commands::run_refresh(&engine)
        }
        Commands::Apply { dry_run } => {
            let engine = commands::build_engine(&settings, &cwd, dry_run)?;
            commands::run_apply(&engine)
        }
    }
}
