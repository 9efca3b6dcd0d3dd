//! Leaf operations decided by a reconciliation pass

use std::fmt;
use std::path::PathBuf;

use tdm_fs::{ArchiveCodec, CopyPrimitive};

/// One filesystem operation scheduled onto the task queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Copy a single file, overwriting the destination
    Copy { from: PathBuf, to: PathBuf },
    /// Pack a metadata directory into its archived form
    Archive { source: PathBuf, archive: PathBuf },
    /// Unpack an archived form into a metadata directory
    Extract { archive: PathBuf, target: PathBuf },
    /// Delete a file or directory subtree
    Remove { path: PathBuf },
}

impl Action {
    pub(crate) fn perform(
        &self,
        copier: &dyn CopyPrimitive,
        codec: &dyn ArchiveCodec,
    ) -> tdm_fs::Result<()> {
        match self {
            Self::Copy { from, to } => copier.copy(from, to),
            Self::Archive { source, archive } => codec.archive(source, archive),
            Self::Extract { archive, target } => codec.extract(archive, target),
            Self::Remove { path } => tdm_fs::remove_all(path),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy { from, to } => write!(f, "copy {} -> {}", from.display(), to.display()),
            Self::Archive { source, archive } => {
                write!(f, "archive {} -> {}", source.display(), archive.display())
            }
            Self::Extract { archive, target } => {
                write!(f, "extract {} -> {}", archive.display(), target.display())
            }
            Self::Remove { path } => write!(f, "remove {}", path.display()),
        }
    }
}
