//! [`TestTrees`] builder for reconciliation scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory holding a `home/` tracked root and a `mirror/`
/// mirror root, with helpers for setup and assertion.
///
/// # Example
///
/// ```rust,no_run
/// use tdm_test_utils::TestTrees;
///
/// let trees = TestTrees::new();
/// trees.write_tracked(".bashrc", "alias ll='ls -l'");
/// trees.assert_tracked_exists(".bashrc");
/// ```
pub struct TestTrees {
    _temp_dir: TempDir,
    root: PathBuf,
}

impl Default for TestTrees {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTrees {
    /// Create the temporary directory with empty `home/` and `mirror/`.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        // Canonical so paths compare equal to what the OS reports
        let root = fs::canonicalize(temp_dir.path()).unwrap();
        fs::create_dir(root.join("home")).unwrap();
        fs::create_dir(root.join("mirror")).unwrap();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tracked_root(&self) -> PathBuf {
        self.root.join("home")
    }

    pub fn mirror_root(&self) -> PathBuf {
        self.root.join("mirror")
    }

    /// Absolute path of `rel` inside the tracked tree.
    pub fn tracked(&self, rel: &str) -> PathBuf {
        join(&self.tracked_root(), rel)
    }

    /// Absolute path of `rel` inside the mirror tree.
    pub fn mirror(&self, rel: &str) -> PathBuf {
        join(&self.mirror_root(), rel)
    }

    /// Write `content` to `rel` in the tracked tree, creating parents.
    pub fn write_tracked(&self, rel: &str, content: impl AsRef<[u8]>) -> PathBuf {
        write(self.tracked(rel), content)
    }

    /// Write `content` to `rel` in the mirror tree, creating parents.
    pub fn write_mirror(&self, rel: &str, content: impl AsRef<[u8]>) -> PathBuf {
        write(self.mirror(rel), content)
    }

    /// Read the content of an absolute path.
    ///
    /// # Panics
    /// Panics with the path if the file cannot be read.
    pub fn read(&self, path: &Path) -> Vec<u8> {
        fs::read(path).unwrap_or_else(|e| panic!("Could not read {}: {e}", path.display()))
    }

    pub fn read_tracked(&self, rel: &str) -> String {
        String::from_utf8_lossy(&self.read(&self.tracked(rel))).into_owned()
    }

    pub fn read_mirror(&self, rel: &str) -> String {
        String::from_utf8_lossy(&self.read(&self.mirror(rel))).into_owned()
    }

    /// Assert that `rel` exists in the tracked tree.
    pub fn assert_tracked_exists(&self, rel: &str) {
        assert_exists(&self.tracked(rel));
    }

    /// Assert that `rel` does **not** exist in the tracked tree.
    pub fn assert_tracked_missing(&self, rel: &str) {
        assert_missing(&self.tracked(rel));
    }

    /// Assert that `rel` exists in the mirror tree.
    pub fn assert_mirror_exists(&self, rel: &str) {
        assert_exists(&self.mirror(rel));
    }

    /// Assert that `rel` does **not** exist in the mirror tree.
    pub fn assert_mirror_missing(&self, rel: &str) {
        assert_missing(&self.mirror(rel));
    }
}

/// Relative paths of every file under `dir`, sorted, with their contents.
///
/// Directories only appear when empty, suffixed with `/`.
pub fn snapshot_tree(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut out = Vec::new();
    collect(dir, dir, &mut out);
    out.sort();
    out
}

fn collect(root: &Path, dir: &Path, out: &mut Vec<(String, Vec<u8>)>) {
    let mut empty = true;
    for entry in fs::read_dir(dir).unwrap() {
        empty = false;
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect(root, &path, out);
        } else {
            let rel = path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/");
            out.push((rel, fs::read(&path).unwrap()));
        }
    }
    if empty && dir != root {
        let rel = dir.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/");
        out.push((format!("{rel}/"), Vec::new()));
    }
}

fn join(base: &Path, rel: &str) -> PathBuf {
    if rel.is_empty() || rel == "." {
        base.to_path_buf()
    } else {
        base.join(rel)
    }
}

fn write(path: PathBuf, content: impl AsRef<[u8]>) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn assert_exists(path: &Path) {
    assert!(path.exists(), "Expected path to exist: {}", path.display());
}

fn assert_missing(path: &Path) {
    assert!(!path.exists(), "Expected path NOT to exist: {}", path.display());
}
