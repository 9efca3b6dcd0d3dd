//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// tdm - Mirror dotfiles and repositories into a portable tree
#[derive(Parser, Debug)]
#[command(name = "tdm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Settings file (defaults to ~/.tdm/config.toml when present)
    #[arg(long, global = true, env = "TDM_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Root of the tracked tree (defaults to the home directory)
    #[arg(long, global = true, env = "TDM_TRACKED_ROOT", value_name = "DIR")]
    pub tracked_root: Option<PathBuf>,

    /// Root of the mirror tree (defaults to ~/.tdm/synced)
    #[arg(long, global = true, env = "TDM_MIRROR_ROOT", value_name = "DIR")]
    pub mirror_root: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Copy a file or directory from the tracked tree into the mirror
    ///
    /// Git directories are stored as a single .git.zip archive.
    ///
    /// Examples:
    ///   tdm track ~/.bashrc
    ///   tdm track .config/nvim --dry-run
    #[command(visible_alias = "add")]
    Track {
        /// Path to track, relative to the current directory
        path: PathBuf,

        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Update the mirror from the tracked tree, removing deleted files
    Refresh {
        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Write the mirror onto the tracked tree, restoring archived repositories
    #[command(visible_alias = "sync")]
    Apply {
        /// Preview changes without applying them
        #[arg(long)]
        dry_run: bool,
    },
}
