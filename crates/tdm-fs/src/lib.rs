//! Filesystem primitives for tdm
//!
//! Provides the tracked/mirror path translator, the whole-file copy
//! primitive, and the archive codec used for version-control metadata
//! directories.

pub mod archive;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use archive::{ArchiveCodec, ZipCodec};
pub use config::ConfigStore;
pub use constants::{ARCHIVE_SUFFIX, METADATA_DIR};
pub use error::{Error, Result};
pub use io::{CopyPrimitive, FsCopy, copy_file, remove_all};
pub use path::{PathTranslator, canonicalize_parent, expand_home, normalize, resolve_root};
