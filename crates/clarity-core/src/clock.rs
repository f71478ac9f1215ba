//! Injected time source and the "last seen active" cache used by the prober.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::util::unix_timestamp_millis_now;

/// Wall-clock source in Unix milliseconds.
pub trait Clock: Clone + Send + Sync + 'static {
    fn now_millis(&self) -> i64;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        unix_timestamp_millis_now()
    }
}

/// Manually driven clock for tests and simulations.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    #[must_use]
    pub fn new(now_millis: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now_millis)),
        }
    }

    pub fn set(&self, now_millis: i64) {
        self.now.store(now_millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Keyed store for the backend "last active" timestamp.
pub trait ActivityCache: Clone + Send + Sync + 'static {
    fn get(&self) -> Result<Option<i64>>;
    fn set(&self, last_active_millis: i64) -> Result<()>;
}

/// Process-local cache; lost when the process exits.
#[derive(Debug, Clone, Default)]
pub struct MemoryActivityCache {
    value: Arc<Mutex<Option<i64>>>,
}

impl MemoryActivityCache {
    #[must_use]
    pub fn with_value(last_active_millis: i64) -> Self {
        Self {
            value: Arc::new(Mutex::new(Some(last_active_millis))),
        }
    }
}

impl ActivityCache for MemoryActivityCache {
    fn get(&self) -> Result<Option<i64>> {
        let guard = self
            .value
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))?;
        Ok(*guard)
    }

    fn set(&self, last_active_millis: i64) -> Result<()> {
        let mut guard = self
            .value
            .lock()
            .map_err(|error| Error::Storage(error.to_string()))?;
        *guard = Some(last_active_millis);
        Ok(())
    }
}

/// Cache persisted as a decimal timestamp in a small text file.
///
/// Shared by successive invocations of a front end on the same machine.
#[derive(Debug, Clone)]
pub struct FileActivityCache {
    path: PathBuf,
}

impl FileActivityCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ActivityCache for FileActivityCache {
    fn get(&self) -> Result<Option<i64>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        // A corrupt entry behaves like a cache miss.
        Ok(raw.trim().parse::<i64>().ok())
    }

    fn set(&self, last_active_millis: i64) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, last_active_millis.to_string())?;
        Ok(())
    }
}
