//! Directory archives for version-control metadata
//!
//! A metadata directory is stored in the mirror as one zip file. Entry names
//! are relative to the archived directory and always use `/`. Empty
//! directories are stored as zero-length entries with a trailing `/` so they
//! survive a round trip without a placeholder file.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::io::{file_mode, write_from_reader};
use crate::{Error, Result};

/// Mode used for extracted files whose entry carries no unix permissions.
const DEFAULT_FILE_MODE: u32 = 0o644;

/// Packs a directory subtree into a single file and back.
pub trait ArchiveCodec: Send + Sync {
    /// Write every entry under `source_dir` into a new archive at `archive`.
    fn archive(&self, source_dir: &Path, archive: &Path) -> Result<()>;

    /// Recreate the contents of `archive` under `dest_dir`.
    fn extract(&self, archive: &Path, dest_dir: &Path) -> Result<()>;
}

/// [`ArchiveCodec`] using the zip container with deflate compression.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipCodec;

impl ArchiveCodec for ZipCodec {
    fn archive(&self, source_dir: &Path, archive: &Path) -> Result<()> {
        if let Some(parent) = archive.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let file = File::create(archive).map_err(|e| Error::io(archive, e))?;
        let mut writer = ZipWriter::new(BufWriter::new(file));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let walker = WalkDir::new(source_dir)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| walk_error(source_dir, e))?;
            let path = entry.path();
            let name = entry_name(source_dir, path);
            let file_type = entry.file_type();

            if file_type.is_symlink() {
                tracing::warn!(path = %path.display(), "skipping symlink inside archived directory");
                continue;
            }

            let metadata = entry.metadata().map_err(|e| walk_error(path, e))?;
            let options = options.unix_permissions(file_mode(&metadata));

            if file_type.is_dir() {
                let mut children = fs::read_dir(path).map_err(|e| Error::io(path, e))?;
                if children.next().is_none() {
                    writer
                        .add_directory(name, options)
                        .map_err(|e| zip_error(archive, e))?;
                }
                continue;
            }

            writer
                .start_file(name, options)
                .map_err(|e| zip_error(archive, e))?;
            let mut source = BufReader::new(File::open(path).map_err(|e| Error::io(path, e))?);
            io::copy(&mut source, &mut writer).map_err(|e| Error::io(path, e))?;
        }

        let mut inner = writer.finish().map_err(|e| zip_error(archive, e))?;
        inner.flush().map_err(|e| Error::io(archive, e))?;
        Ok(())
    }

    fn extract(&self, archive: &Path, dest_dir: &Path) -> Result<()> {
        let file = File::open(archive).map_err(|e| Error::io(archive, e))?;
        let mut reader = ZipArchive::new(BufReader::new(file)).map_err(|e| zip_error(archive, e))?;

        fs::create_dir_all(dest_dir).map_err(|e| Error::io(dest_dir, e))?;

        for index in 0..reader.len() {
            let mut entry = reader.by_index(index).map_err(|e| zip_error(archive, e))?;
            let relative: PathBuf = entry
                .enclosed_name()
                .map(|name| name.to_path_buf())
                .ok_or_else(|| Error::ArchiveCorrupt {
                    path: archive.to_path_buf(),
                    message: format!("entry escapes the archive root: {}", entry.name()),
                })?;
            let target = dest_dir.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
                continue;
            }

            let mode = entry
                .unix_mode()
                .map(|mode| mode & 0o7777)
                .unwrap_or(DEFAULT_FILE_MODE);
            write_from_reader(&mut entry, &target, mode)?;
        }

        Ok(())
    }
}

/// Archive entry name of `path` relative to `root`, `/`-separated.
fn entry_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn walk_error(fallback: &Path, error: walkdir::Error) -> Error {
    let path = error.path().unwrap_or(fallback).to_path_buf();
    Error::io(path, error.into())
}

fn zip_error(archive: &Path, error: ZipError) -> Error {
    match error {
        ZipError::Io(source)
            if !matches!(
                source.kind(),
                io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof
            ) =>
        {
            Error::io(archive, source)
        }
        other => Error::ArchiveCorrupt {
            path: archive.to_path_buf(),
            message: other.to_string(),
        },
    }
}
