// Application state module
// Filesystem paths and cached flags resolved once at startup

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use super::types::Config;

/// Application state shared by all request handlers.
///
/// Everything here is resolved exactly once at boot. In particular the
/// write feature is decided by a single existence check on the write
/// directory; handlers never probe the filesystem to learn whether writes
/// are allowed.
pub struct AppState {
    pub config: Config,
    /// Absolute path of the directory served as the website root
    pub static_root: PathBuf,
    /// Absolute path of the upload directory (may not exist)
    pub write_dir: PathBuf,
    /// Whether the write directory existed at boot
    pub write_enabled: bool,

    // Cached config value for fast access without touching config
    pub cached_access_log: AtomicBool,
}

impl AppState {
    /// Resolve the configured paths and build the shared state.
    ///
    /// Fails if the static root does not exist; a missing write directory
    /// is not an error, it just leaves the write feature disabled.
    pub fn new(config: &Config) -> io::Result<Self> {
        let static_root = Path::new(&config.resources.static_root).canonicalize()?;

        let write_dir = match &config.resources.write_dir {
            Some(dir) => {
                let dir = PathBuf::from(dir);
                if dir.is_absolute() {
                    dir
                } else {
                    static_root.join(dir)
                }
            }
            None => static_root.join("write"),
        };

        let write_enabled = write_dir.is_dir();
        let write_dir = if write_enabled {
            write_dir.canonicalize()?
        } else {
            write_dir
        };

        Ok(Self {
            config: config.clone(),
            static_root,
            write_dir,
            write_enabled,
            cached_access_log: AtomicBool::new(config.logging.access_log),
        })
    }
}
