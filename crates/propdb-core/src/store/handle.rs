//! Store handles over the backing SQLite file.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags};

use crate::error::Error;
use crate::store::config::StoreConfig;

/// Handle factory over one physical database file.
///
/// `Store` itself holds no connection; it opens read-only or read-write
/// handles on demand. The write path (location embedding) always opens its
/// own handle, so read queries never share a connection with an in-progress
/// write transaction.
#[derive(Debug, Clone)]
pub struct Store {
    config: StoreConfig,
}

impl Store {
    /// Create a store over the given configuration.
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Create a store over the given database file with default settings.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::new(StoreConfig::new(path.as_ref()))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Open a read-only handle.
    ///
    /// A single handle serializes its own queries; callers that want
    /// concurrent queries open one handle per concurrent caller.
    pub fn reader(&self) -> Result<StoreHandle, Error> {
        let conn = Connection::open_with_flags(
            &self.config.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        self.configure(&conn)?;
        Ok(StoreHandle::new(conn))
    }

    /// Open a read-write handle, creating the file if it does not exist.
    pub fn writer(&self) -> Result<StoreHandle, Error> {
        let conn = Connection::open(&self.config.path)?;
        self.configure(&conn)?;
        Ok(StoreHandle::new(conn))
    }

    fn configure(&self, conn: &Connection) -> Result<(), Error> {
        conn.busy_timeout(self.config.busy_timeout)?;
        // Negative cache_size is in KiB.
        conn.pragma_update(None, "cache_size", -(self.config.cache_kib as i64))?;
        Ok(())
    }
}

/// One open connection to the backing store.
///
/// Clones share the same underlying connection (and therefore serialize
/// their queries); [`release`](StoreHandle::release) closes it for all
/// clones. Every operation suspends while the blocking SQLite work runs on
/// the tokio blocking pool.
#[derive(Clone)]
pub struct StoreHandle {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl StoreHandle {
    fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        }
    }

    /// Run a closure against the connection on the blocking pool.
    ///
    /// Fails with [`Error::Released`] if the handle was released. Dropping
    /// the returned future abandons the result; the closure itself either
    /// completes or never started, so no partial state is observable.
    pub(crate) async fn run<T, F>(&self, op: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Connection) -> Result<T, Error> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let handle = tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock();
            let conn = guard.as_mut().ok_or(Error::Released)?;
            op(conn)
        });
        match handle.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            // The runtime is shutting down; treat like a released handle.
            Err(_) => Err(Error::Released),
        }
    }

    /// Shared connection cell, for streaming producers.
    pub(crate) fn conn_arc(&self) -> Arc<Mutex<Option<Connection>>> {
        Arc::clone(&self.conn)
    }

    /// Close the connection. Subsequent operations on this handle (or any
    /// clone of it) fail with [`Error::Released`] before touching the store.
    pub fn release(&self) {
        let conn = self.conn.lock().take();
        drop(conn);
    }

    /// Whether this handle has been released.
    pub fn is_released(&self) -> bool {
        self.conn.lock().is_none()
    }
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle")
            .field("released", &self.is_released())
            .finish()
    }
}
