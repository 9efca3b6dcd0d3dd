//! Reconciliation engine for tdm
//!
//! Mirrors files between a tracked tree (usually the home directory) and a
//! mirror tree that can be kept under version control:
//!
//! - **track**: copy a tracked file or directory into the mirror
//! - **refresh**: update the mirror from the tracked tree, propagating deletions
//! - **apply**: write the mirror back onto the tracked tree
//!
//! Version-control metadata directories (`.git`) never travel file by file.
//! They are stored in the mirror as a single `.git.zip` archive and are never
//! overwritten on either side once they exist.
//!
//! # Example
//!
//! ```no_run
//! use tdm_core::SyncEngine;
//! use tdm_fs::PathTranslator;
//!
//! let translator = PathTranslator::new("/home/me", "/home/me/.tdm/synced", "/home/me")?;
//! let engine = SyncEngine::new(translator);
//!
//! for error in engine.track(".config/nvim") {
//!     eprintln!("{error}");
//! }
//! # Ok::<(), tdm_fs::Error>(())
//! ```

pub mod error;
pub mod queue;
pub mod settings;
pub mod sync;

pub use error::{Error, Result};
pub use queue::TaskQueue;
pub use settings::Settings;
pub use sync::{Action, EntryKind, MetadataNames, Operation, SyncEngine, SyncOptions, SyncReport};
