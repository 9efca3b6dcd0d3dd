//! Shared test utilities for the tdm workspace.
//!
//! This crate is a dev-dependency only and is never published.
//!
//! # Modules
//!
//! - [`git`]: `.git` directory fixtures at three realism levels
//! - [`trees`]: [`TestTrees`] pair of tracked and mirror roots

pub mod git;
pub mod trees;

pub use trees::{TestTrees, snapshot_tree};
