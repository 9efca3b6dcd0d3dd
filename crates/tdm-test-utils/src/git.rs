//! Git metadata fixtures at three realism levels.
//!
//! Choose the lowest-realism fixture that satisfies your test's needs.

use std::fs;
use std::path::Path;

/// Creates a minimal `.git` directory structure **without** initialising a real
/// git repository.
///
/// Realism level: **FAKE**: a handful of files plus one empty directory
/// (`objects/pack`), enough to exercise archiving.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn fake_git_dir(path: &Path) {
    let git = path.join(".git");
    fs::create_dir_all(git.join("refs/heads"))
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to create refs/heads: {e}"));
    fs::create_dir_all(git.join("objects/pack"))
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to create objects/pack: {e}"));
    fs::write(git.join("HEAD"), "ref: refs/heads/main\n")
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to write HEAD: {e}"));
    fs::write(git.join("refs/heads/main"), "")
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to write refs/heads/main: {e}"));
}

/// Initialises a real git repository using `git2` (no commit).
///
/// Realism level: **REAL**: valid git object store, empty history.
///
/// # Panics
/// Panics if `git2::Repository::init` fails.
pub fn real_git_repo(path: &Path) -> git2::Repository {
    git2::Repository::init(path).unwrap_or_else(|e| {
        panic!(
            "real_git_repo: failed to init repository at {}: {e}",
            path.display()
        )
    })
}

/// Initialises a real git repository with one commit of `README.md`.
///
/// Realism level: **REAL WITH HISTORY**: objects, an index, and a `HEAD`
/// pointing at a commit.
///
/// # Panics
/// Panics if any git operation fails.
pub fn real_git_repo_with_commit(path: &Path) -> git2::Repository {
    let repo = real_git_repo(path);
    fs::write(path.join("README.md"), "# Test\n")
        .unwrap_or_else(|e| panic!("real_git_repo_with_commit: failed to write README.md: {e}"));

    {
        let mut index = repo.index().expect("real_git_repo_with_commit: no index");
        index
            .add_path(Path::new("README.md"))
            .expect("real_git_repo_with_commit: failed to stage README.md");
        index.write().expect("real_git_repo_with_commit: failed to write index");
        let tree_id = index
            .write_tree()
            .expect("real_git_repo_with_commit: failed to write tree");
        let tree = repo
            .find_tree(tree_id)
            .expect("real_git_repo_with_commit: tree not found");
        let signature = git2::Signature::now("Test User", "test@test.com")
            .expect("real_git_repo_with_commit: invalid signature");
        repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            "Initial commit",
            &tree,
            &[],
        )
        .expect("real_git_repo_with_commit: commit failed");
    }

    repo
}
