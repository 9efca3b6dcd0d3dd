//! Reconciliation passes between the tracked tree and its mirror
//!
//! - **engine**: the recursive walks behind track, refresh, and apply
//! - **action**: leaf operations a walk schedules
//! - **entry**: reserved-name classification of visited nodes

mod action;
mod engine;
mod entry;

pub use action::Action;
pub use engine::{Operation, SyncEngine, SyncOptions, SyncReport};
pub use entry::{EntryKind, MetadataNames};
