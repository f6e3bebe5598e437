//! Store configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for opening the backing SQLite file.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the database file.
    pub path: PathBuf,

    /// How long a connection waits on a locked database before failing.
    pub busy_timeout: Duration,

    /// Page cache size in KiB handed to the connection.
    pub cache_kib: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./model.sdb"),
            busy_timeout: Duration::from_secs(5),
            cache_kib: 64 * 1024, // 64 MiB
        }
    }
}

impl StoreConfig {
    /// Create a configuration for the given database file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set the busy timeout.
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Set the page cache size in KiB.
    pub fn with_cache_kib(mut self, kib: u32) -> Self {
        self.cache_kib = kib;
        self
    }
}
