//! Classification of tree entries by their reserved names

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tdm_fs::{ARCHIVE_SUFFIX, METADATA_DIR};

/// The four kinds of node a reconciliation pass can visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Anything that is not a directory
    File,
    /// A directory without a reserved name
    Directory,
    /// A version-control metadata directory
    MetadataDir,
    /// The single-file archived form of a metadata directory
    ArchivedMetadata,
}

/// Reserved names used to recognise metadata directories and their archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataNames {
    /// Base name of a metadata directory
    pub dir: &'static str,
    /// Suffix appended to [`Self::dir`] for the archived form
    pub suffix: &'static str,
}

impl MetadataNames {
    /// `.git` directories stored as `.git.zip`.
    pub const DEFAULT: Self = Self {
        dir: METADATA_DIR,
        suffix: ARCHIVE_SUFFIX,
    };

    /// Base name of the archived form.
    pub fn archived_name(&self) -> String {
        format!("{}{}", self.dir, self.suffix)
    }

    /// Classify an entry from its base name and directory-ness.
    ///
    /// Only exact base-name matches are reserved.
    pub fn classify(&self, name: Option<&OsStr>, is_dir: bool) -> EntryKind {
        let name = name.and_then(OsStr::to_str);
        match (is_dir, name) {
            (true, Some(name)) if name == self.dir => EntryKind::MetadataDir,
            (true, _) => EntryKind::Directory,
            (false, Some(name)) if self.is_archived_name(name) => EntryKind::ArchivedMetadata,
            (false, _) => EntryKind::File,
        }
    }

    /// Path of the archived form for a metadata directory at `dir`.
    pub fn archive_path(&self, dir: &Path) -> PathBuf {
        dir.with_file_name(self.archived_name())
    }

    /// Path of the metadata directory that an archive at `archive` restores.
    pub fn dir_path(&self, archive: &Path) -> PathBuf {
        archive.with_file_name(self.dir)
    }

    fn is_archived_name(&self, name: &str) -> bool {
        name.strip_prefix(self.dir) == Some(self.suffix)
    }
}

impl Default for MetadataNames {
    fn default() -> Self {
        Self::DEFAULT
    }
}
