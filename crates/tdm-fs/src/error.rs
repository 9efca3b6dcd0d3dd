//! Error types for tdm-fs

use std::path::PathBuf;

/// Result type for tdm-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tdm-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not inside {root}")]
    PathOutsideRoot { path: PathBuf, root: PathBuf },

    #[error("Root path must be absolute: {path}")]
    RelativeRoot { path: PathBuf },

    #[error("Tracked root {tracked} must not live inside mirror root {mirror}")]
    RootsOverlap { tracked: PathBuf, mirror: PathBuf },

    #[error("Corrupt archive {path}: {message}")]
    ArchiveCorrupt { path: PathBuf, message: String },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this is an I/O error caused by a missing path.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
