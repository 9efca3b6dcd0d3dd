//! Error types for tdm-core

/// Result type for tdm-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tdm-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filesystem error from tdm-fs
    #[error(transparent)]
    Fs(#[from] tdm_fs::Error),

    /// The runtime executing scheduled tasks could not be started
    #[error("Failed to start task runtime: {source}")]
    Runtime {
        #[source]
        source: std::io::Error,
    },

    /// A scheduled task panicked instead of returning a result
    #[error("Task panicked: {message}")]
    TaskPanicked { message: String },

    /// No home directory could be determined for default roots
    #[error("Could not determine the home directory")]
    HomeDirUnavailable,

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is a path that could not be translated between trees.
    pub fn is_path_outside_root(&self) -> bool {
        matches!(self, Self::Fs(tdm_fs::Error::PathOutsideRoot { .. }))
    }

    /// Whether this error is an I/O failure caused by a missing path.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Fs(e) => e.is_not_found(),
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
