//! Root directory settings
//!
//! Roots come from, in order of precedence: explicit overrides (CLI flags or
//! environment), a settings file, and finally the defaults `~` for the tracked
//! tree and `~/.tdm/synced` for the mirror.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tdm_fs::constants::{CONFIG_FILE, MIRROR_DIR, STATE_DIR};
use tdm_fs::{ConfigStore, PathTranslator, resolve_root};

use crate::{Error, Result};

/// Settings file contents. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory tree being mirrored
    pub tracked_root: Option<PathBuf>,
    /// Directory holding the mirror
    pub mirror_root: Option<PathBuf>,
}

impl Settings {
    /// Load settings from a file; the format follows the extension.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(ConfigStore::new().load(path)?)
    }

    /// Load `~/.tdm/config.toml` if it exists, otherwise empty settings.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Location of the default settings file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(STATE_DIR).join(CONFIG_FILE))
    }

    /// Overlay `overrides` on top of these settings.
    pub fn merge(self, overrides: Settings) -> Settings {
        Settings {
            tracked_root: overrides.tracked_root.or(self.tracked_root),
            mirror_root: overrides.mirror_root.or(self.mirror_root),
        }
    }

    /// Build the translator for an invocation from `working_dir`.
    ///
    /// Missing roots fall back to the home directory defaults.
    pub fn translator(&self, working_dir: &Path) -> Result<PathTranslator> {
        let home = || {
            dirs::home_dir()
                .map(|home| resolve_root(home, working_dir))
                .ok_or(Error::HomeDirUnavailable)
        };

        let tracked_root = match &self.tracked_root {
            Some(path) => resolve_root(path, working_dir),
            None => home()?,
        };
        let mirror_root = match &self.mirror_root {
            Some(path) => resolve_root(path, working_dir),
            None => home()?.join(STATE_DIR).join(MIRROR_DIR),
        };

        Ok(PathTranslator::new(tracked_root, mirror_root, working_dir)?)
    }
}
