//! Reserved names shared by every reconciliation pass.

/// Base name of a version-control metadata directory.
///
/// Directories with this name are never copied file-by-file; they travel
/// through the mirror as a single archive.
pub const METADATA_DIR: &str = ".git";

/// Suffix appended to [`METADATA_DIR`] to name its archived form.
pub const ARCHIVE_SUFFIX: &str = ".zip";

/// Directory under the home directory holding tdm state.
pub const STATE_DIR: &str = ".tdm";

/// Default mirror location relative to [`STATE_DIR`].
pub const MIRROR_DIR: &str = "synced";

/// Default settings file name inside [`STATE_DIR`].
pub const CONFIG_FILE: &str = "config.toml";
