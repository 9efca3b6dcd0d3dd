//! SyncEngine implementation
//!
//! Every pass is a synchronous recursive walk that decides one [`Action`] per
//! leaf and hands it to a [`TaskQueue`]. Directories are never tasks; their
//! contents are. Failures found while walking are folded into the same queue
//! so a pass always returns the complete list of errors.

use std::fmt;
use std::fs::{self, DirEntry, FileType};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tdm_fs::{ArchiveCodec, CopyPrimitive, FsCopy, PathTranslator, ZipCodec, canonicalize_parent};

use super::action::Action;
use super::entry::{EntryKind, MetadataNames};
use crate::queue::TaskQueue;
use crate::Error;

/// Options for reconciliation passes
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// If true, decide and report actions without executing them.
    pub dry_run: bool,
}

/// The three reconciliation passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Incorporate a tracked path (file or directory) into the mirror
    Track(PathBuf),
    /// Pull the mirror up to date with the tracked tree, propagating deletions
    Refresh,
    /// Push the mirror onto the tracked tree, extracting archives
    Apply,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Track(path) => write!(f, "track {}", path.display()),
            Self::Refresh => f.write_str("refresh"),
            Self::Apply => f.write_str("apply"),
        }
    }
}

/// Outcome of one pass.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Actions decided during the walk, in visit order
    pub actions: Vec<Action>,
    /// Every failure, from the walk or from executed actions
    pub errors: Vec<Error>,
}

impl SyncReport {
    /// Whether the pass completed without any failure
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    fn failed(error: Error) -> Self {
        Self {
            actions: Vec::new(),
            errors: vec![error],
        }
    }
}

/// Engine reconciling a tracked tree with its mirror
///
/// Entry points:
/// - **track**: copy a tracked file or directory into the mirror
/// - **refresh**: update mirror files from the tracked tree, removing deleted ones
/// - **apply**: write mirror files back onto the tracked tree
pub struct SyncEngine {
    translator: PathTranslator,
    names: MetadataNames,
    options: SyncOptions,
    copier: Arc<dyn CopyPrimitive>,
    codec: Arc<dyn ArchiveCodec>,
}

impl SyncEngine {
    /// Create an engine using the local filesystem and zip archives.
    pub fn new(translator: PathTranslator) -> Self {
        Self {
            translator,
            names: MetadataNames::DEFAULT,
            options: SyncOptions::default(),
            copier: Arc::new(FsCopy),
            codec: Arc::new(ZipCodec),
        }
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_names(mut self, names: MetadataNames) -> Self {
        self.names = names;
        self
    }

    pub fn with_copier(mut self, copier: impl CopyPrimitive + 'static) -> Self {
        self.copier = Arc::new(copier);
        self
    }

    pub fn with_codec(mut self, codec: impl ArchiveCodec + 'static) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    pub fn translator(&self) -> &PathTranslator {
        &self.translator
    }

    pub fn options(&self) -> SyncOptions {
        self.options
    }

    /// Track `path` into the mirror. Returns every failure.
    pub fn track(&self, path: impl AsRef<Path>) -> Vec<Error> {
        self.run(Operation::Track(path.as_ref().to_path_buf())).errors
    }

    /// Refresh the whole mirror from the tracked tree. Returns every failure.
    pub fn refresh(&self) -> Vec<Error> {
        self.run(Operation::Refresh).errors
    }

    /// Apply the whole mirror onto the tracked tree. Returns every failure.
    pub fn apply(&self) -> Vec<Error> {
        self.run(Operation::Apply).errors
    }

    /// Run one pass to completion and report what was done.
    pub fn run(&self, operation: Operation) -> SyncReport {
        let mut pass = match Pass::new(self) {
            Ok(pass) => pass,
            Err(e) => return SyncReport::failed(e),
        };

        tracing::debug!(%operation, dry_run = self.options.dry_run, "starting pass");
        match operation {
            Operation::Track(path) => {
                let path = self.track_target(path);
                self.track_node(&mut pass, &path, None);
            }
            Operation::Refresh => self.walk_mirror(&mut pass, Self::refresh_dir),
            Operation::Apply => self.walk_mirror(&mut pass, Self::apply_dir),
        }

        pass.finish()
    }

    /// Normalize a user-supplied Track path.
    ///
    /// When the lexical form is outside the tracked root, the parent is
    /// canonicalized so `/home/u/.bashrc` still matches a root of
    /// `/usr/home/u` reached through a symlinked `/home`.
    fn track_target(&self, path: PathBuf) -> PathBuf {
        let path = self.translator.normalize(path);
        if self.translator.to_mirror(&path).is_ok() {
            return path;
        }
        let resolved = canonicalize_parent(&path);
        if resolved != path {
            tracing::debug!(path = %path.display(), resolved = %resolved.display(), "resolved symlinked parent");
        }
        resolved
    }

    /// Visit one tracked node. `file_type` is the directory entry's own type
    /// for children; `None` stats the user-supplied top-level path, following
    /// symlinks.
    fn track_node(&self, pass: &mut Pass, path: &Path, file_type: Option<FileType>) {
        if self.translator.is_in_mirror(path) {
            tracing::debug!(path = %path.display(), "skipping mirror tree");
            return;
        }

        let mirror = match self.translator.to_mirror(path) {
            Ok(mirror) => mirror,
            Err(e) => return pass.fail(e),
        };

        let is_dir = match file_type {
            Some(file_type) if file_type.is_symlink() => match fs::metadata(path) {
                Ok(target) if target.is_dir() => {
                    tracing::warn!(path = %path.display(), "skipping symlink to directory");
                    return;
                }
                Ok(_) => false,
                Err(e) => return pass.fail(tdm_fs::Error::io(path, e)),
            },
            Some(file_type) => file_type.is_dir(),
            None => match fs::metadata(path) {
                Ok(metadata) => metadata.is_dir(),
                Err(e) => return pass.fail(tdm_fs::Error::io(path, e)),
            },
        };

        match self.names.classify(path.file_name(), is_dir) {
            EntryKind::MetadataDir => {
                let archive = self.names.archive_path(&mirror);
                match exists(&archive) {
                    Ok(true) => {
                        tracing::debug!(archive = %archive.display(), "archive exists, not overwriting");
                    }
                    Ok(false) => pass.dispatch(Action::Archive {
                        source: path.to_path_buf(),
                        archive,
                    }),
                    Err(e) => pass.fail(e),
                }
            }
            EntryKind::Directory => {
                for entry in read_entries(pass, path) {
                    let child = entry.path();
                    match entry.file_type() {
                        Ok(file_type) => self.track_node(pass, &child, Some(file_type)),
                        Err(e) => pass.fail(tdm_fs::Error::io(child, e)),
                    }
                }
            }
            EntryKind::File | EntryKind::ArchivedMetadata => pass.dispatch(Action::Copy {
                from: path.to_path_buf(),
                to: mirror,
            }),
        }
    }

    fn walk_mirror(&self, pass: &mut Pass, visit: fn(&Self, &mut Pass, &Path)) {
        let root = self.translator.mirror_root();
        match exists(root) {
            Ok(true) => visit(self, pass, root),
            Ok(false) => {
                tracing::info!(mirror = %root.display(), "mirror does not exist yet, nothing to do");
            }
            Err(e) => pass.fail(e),
        }
    }

    fn refresh_dir(&self, pass: &mut Pass, dir: &Path) {
        for entry in read_entries(pass, dir) {
            let Some((mirror, kind)) = self.inspect(pass, &entry) else {
                continue;
            };
            let tracked = match self.translator.to_tracked(&mirror) {
                Ok(tracked) => tracked,
                Err(e) => {
                    pass.fail(e);
                    continue;
                }
            };

            match kind {
                EntryKind::ArchivedMetadata => {
                    tracing::debug!(path = %mirror.display(), "archives are not refreshed");
                    continue;
                }
                EntryKind::MetadataDir => {
                    tracing::debug!(path = %mirror.display(), "skipping mirror metadata directory");
                    continue;
                }
                EntryKind::Directory | EntryKind::File => {}
            }

            match fs::metadata(&tracked) {
                Err(e) if is_absent(&e) => pass.dispatch(Action::Remove { path: mirror }),
                Err(e) => pass.fail(tdm_fs::Error::io(tracked, e)),
                Ok(_) if kind == EntryKind::Directory => self.refresh_dir(pass, &mirror),
                Ok(_) => pass.dispatch(Action::Copy {
                    from: tracked,
                    to: mirror,
                }),
            }
        }
    }

    fn apply_dir(&self, pass: &mut Pass, dir: &Path) {
        for entry in read_entries(pass, dir) {
            let Some((mirror, kind)) = self.inspect(pass, &entry) else {
                continue;
            };
            let tracked = match self.translator.to_tracked(&mirror) {
                Ok(tracked) => tracked,
                Err(e) => {
                    pass.fail(e);
                    continue;
                }
            };

            match kind {
                EntryKind::ArchivedMetadata => {
                    let target = self.names.dir_path(&tracked);
                    match exists(&target) {
                        Ok(true) => {
                            tracing::debug!(target = %target.display(), "metadata directory exists, not extracting");
                        }
                        Ok(false) => pass.dispatch(Action::Extract {
                            archive: mirror,
                            target,
                        }),
                        Err(e) => pass.fail(e),
                    }
                }
                EntryKind::MetadataDir => {
                    tracing::debug!(path = %mirror.display(), "skipping mirror metadata directory");
                }
                EntryKind::Directory => self.apply_dir(pass, &mirror),
                EntryKind::File => pass.dispatch(Action::Copy {
                    from: mirror,
                    to: tracked,
                }),
            }
        }
    }

    fn inspect(&self, pass: &mut Pass, entry: &DirEntry) -> Option<(PathBuf, EntryKind)> {
        let path = entry.path();
        match entry.file_type() {
            Ok(file_type) => {
                let name = entry.file_name();
                let kind = self.names.classify(Some(name.as_os_str()), file_type.is_dir());
                Some((path, kind))
            }
            Err(e) => {
                pass.fail(tdm_fs::Error::io(path, e));
                None
            }
        }
    }
}

impl fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEngine")
            .field("translator", &self.translator)
            .field("names", &self.names)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// State of one pass: the queue plus the actions decided so far.
struct Pass {
    queue: TaskQueue,
    actions: Vec<Action>,
    dry_run: bool,
    copier: Arc<dyn CopyPrimitive>,
    codec: Arc<dyn ArchiveCodec>,
}

impl Pass {
    fn new(engine: &SyncEngine) -> crate::Result<Self> {
        Ok(Self {
            queue: TaskQueue::new()?,
            actions: Vec::new(),
            dry_run: engine.options.dry_run,
            copier: Arc::clone(&engine.copier),
            codec: Arc::clone(&engine.codec),
        })
    }

    fn dispatch(&mut self, action: Action) {
        if self.dry_run {
            tracing::debug!("[dry-run] would {action}");
        } else {
            tracing::info!("{action}");
            let copier = Arc::clone(&self.copier);
            let codec = Arc::clone(&self.codec);
            let task = action.clone();
            self.queue
                .schedule(move || task.perform(copier.as_ref(), codec.as_ref()));
        }
        self.actions.push(action);
    }

    fn fail(&mut self, error: impl Into<Error>) {
        let error = error.into();
        tracing::debug!(%error, "walk failure");
        self.queue.schedule_error(error);
    }

    fn finish(self) -> SyncReport {
        SyncReport {
            errors: self.queue.wait(),
            actions: self.actions,
        }
    }
}

/// Entries of `dir` sorted by file name; listing failures are recorded on
/// the pass and yield no entries.
fn read_entries(pass: &mut Pass, dir: &Path) -> Vec<DirEntry> {
    let reader = match fs::read_dir(dir) {
        Ok(reader) => reader,
        Err(e) => {
            pass.fail(tdm_fs::Error::io(dir, e));
            return Vec::new();
        }
    };

    let mut entries = Vec::new();
    for entry in reader {
        match entry {
            Ok(entry) => entries.push(entry),
            Err(e) => pass.fail(tdm_fs::Error::io(dir, e)),
        }
    }
    entries.sort_by_key(DirEntry::file_name);
    entries
}

/// Whether anything exists at `path`, without following a final symlink.
fn exists(path: &Path) -> tdm_fs::Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(tdm_fs::Error::io(path, e)),
    }
}

/// Whether a stat failure means nothing exists at the path. A file standing
/// where a parent directory used to be reports `NotADirectory`.
fn is_absent(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}
