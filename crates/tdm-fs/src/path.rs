//! Lexical path handling and the tracked/mirror path translator

use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// Lexically normalize `path`, resolving it against `base` when relative.
///
/// `.` components are dropped and `..` pops the previous normal component.
/// The filesystem is never consulted, so symlinks are not resolved.
pub fn normalize(path: impl AsRef<Path>, base: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let joined;
    let path = if path.is_absolute() {
        path
    } else {
        joined = base.as_ref().join(path);
        joined.as_path()
    };

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                }
            }
            Component::Normal(segment) => out.push(segment),
        }
    }
    out
}

/// Expand a leading `~` to the current user's home directory.
pub fn expand_home(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) if rest.as_os_str().is_empty() => home,
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

/// Resolve a configured root directory to an absolute path.
///
/// Expands `~`, normalizes against `base`, and canonicalizes when the
/// directory already exists so that symlinked homes compare equal to the
/// working directory reported by the OS.
pub fn resolve_root(path: impl AsRef<Path>, base: impl AsRef<Path>) -> PathBuf {
    let normalized = normalize(expand_home(path), base);
    dunce::canonicalize(&normalized).unwrap_or(normalized)
}

/// Canonicalize the parent of `path`, keeping its final component as given.
///
/// The final component is left alone so a tracked symlink is still the link
/// itself. Falls back to `path` when the parent cannot be resolved.
pub fn canonicalize_parent(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => dunce::canonicalize(parent)
            .map(|parent| parent.join(name))
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}

/// Bidirectional mapping between tracked-tree paths and mirror-tree paths.
///
/// ```text
/// mirror = mirror_root + (tracked - tracked_root)
/// ```
///
/// All operations are pure; nothing touches the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTranslator {
    tracked_root: PathBuf,
    mirror_root: PathBuf,
    working_dir: PathBuf,
}

impl PathTranslator {
    /// Create a translator for one invocation.
    ///
    /// `working_dir` must be absolute. The two roots are normalized against
    /// it. The tracked root may not sit inside (or equal) the mirror root;
    /// a mirror nested inside the tracked root is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RelativeRoot`] or [`Error::RootsOverlap`].
    pub fn new(
        tracked_root: impl AsRef<Path>,
        mirror_root: impl AsRef<Path>,
        working_dir: impl AsRef<Path>,
    ) -> Result<Self> {
        let working_dir = working_dir.as_ref();
        if !working_dir.is_absolute() {
            return Err(Error::RelativeRoot {
                path: working_dir.to_path_buf(),
            });
        }
        let working_dir = normalize(working_dir, working_dir);
        let tracked_root = normalize(tracked_root, &working_dir);
        let mirror_root = normalize(mirror_root, &working_dir);

        if tracked_root.starts_with(&mirror_root) {
            return Err(Error::RootsOverlap {
                tracked: tracked_root,
                mirror: mirror_root,
            });
        }

        Ok(Self {
            tracked_root,
            mirror_root,
            working_dir,
        })
    }

    pub fn tracked_root(&self) -> &Path {
        &self.tracked_root
    }

    pub fn mirror_root(&self) -> &Path {
        &self.mirror_root
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Normalize a possibly relative path against the working directory.
    pub fn normalize(&self, path: impl AsRef<Path>) -> PathBuf {
        normalize(path, &self.working_dir)
    }

    /// Whether `path` (after normalization) lies in the mirror tree.
    pub fn is_in_mirror(&self, path: impl AsRef<Path>) -> bool {
        self.normalize(path).starts_with(&self.mirror_root)
    }

    /// Map a tracked-tree path to its mirror counterpart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathOutsideRoot`] if the normalized path is not under
    /// the tracked root.
    pub fn to_mirror(&self, tracked: impl AsRef<Path>) -> Result<PathBuf> {
        rebase(&self.normalize(tracked), &self.tracked_root, &self.mirror_root)
    }

    /// Map a mirror-tree path back to its tracked counterpart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathOutsideRoot`] if the path is not under the mirror
    /// root.
    pub fn to_tracked(&self, mirror: impl AsRef<Path>) -> Result<PathBuf> {
        rebase(&self.normalize(mirror), &self.mirror_root, &self.tracked_root)
    }
}

fn rebase(path: &Path, from: &Path, to: &Path) -> Result<PathBuf> {
    let relative = path.strip_prefix(from).map_err(|_| Error::PathOutsideRoot {
        path: path.to_path_buf(),
        root: from.to_path_buf(),
    })?;

    if relative.as_os_str().is_empty() {
        Ok(to.to_path_buf())
    } else {
        Ok(to.join(relative))
    }
}
