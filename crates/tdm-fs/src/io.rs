//! Whole-file copy and removal primitives

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::{Error, Result};

/// Copies one file's bytes and permission bits to another path.
///
/// Implementations must create missing parent directories of `to` and fully
/// overwrite an existing `to`.
pub trait CopyPrimitive: Send + Sync {
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;
}

/// [`CopyPrimitive`] backed by the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsCopy;

impl CopyPrimitive for FsCopy {
    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        copy_file(from, to)
    }
}

/// Copy `from` to `to`, creating parent directories and preserving the
/// source's permission bits.
pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
    let source = File::open(from).map_err(|e| Error::io(from, e))?;
    let metadata = source.metadata().map_err(|e| Error::io(from, e))?;

    let mut reader = BufReader::new(source);
    write_from_reader(&mut reader, to, file_mode(&metadata))?;
    Ok(())
}

/// Stream `reader` into a freshly truncated file at `to` with `mode`.
///
/// Parent directories are created first. Returns the number of bytes written.
pub fn write_from_reader(reader: &mut impl Read, to: &Path, mode: u32) -> Result<u64> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let file = match open_truncate(to, mode) {
        // A read-only destination cannot be truncated in place; replace it
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied && to.is_file() => {
            fs::remove_file(to).map_err(|e| Error::io(to, e))?;
            open_truncate(to, mode)
        }
        other => other,
    }
    .map_err(|e| Error::io(to, e))?;
    let mut writer = BufWriter::new(file);
    let written = io::copy(reader, &mut writer).map_err(|e| Error::io(to, e))?;
    writer.flush().map_err(|e| Error::io(to, e))?;

    // Opening an existing file keeps its old mode, so apply it explicitly
    apply_mode(to, mode).map_err(|e| Error::io(to, e))?;
    Ok(written)
}

/// Remove a file or a whole directory subtree.
///
/// A path that is already gone counts as removed.
pub fn remove_all(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(Error::io(path, e)),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(Error::io(path, e)),
        _ => Ok(()),
    }
}

/// Permission bits of a file, in unix mode form.
#[cfg(unix)]
pub fn file_mode(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
pub fn file_mode(metadata: &fs::Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

#[cfg(unix)]
fn open_truncate(path: &Path, mode: u32) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)
}

#[cfg(not(unix))]
fn open_truncate(path: &Path, _mode: u32) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn apply_mode(path: &Path, mode: u32) -> io::Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_readonly(mode & 0o222 == 0);
    fs::set_permissions(path, permissions)
}
