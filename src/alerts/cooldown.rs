//! Duplicate-alert suppression backed by a single persisted timestamp.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::Mutex;

use log::{debug, info, warn};

use crate::error::StateError;

/// Seconds after a successful send during which further alerts are dropped.
pub const COOLDOWN_SECS: f64 = 3600.0;

/// Storage for the Unix timestamp of the last successful notification.
#[cfg_attr(test, mockall::automock)]
pub trait StateStore: Send + Sync {
    /// `None` until the first successful send.
    fn last_notified(&self) -> Result<Option<f64>, StateError>;
    fn record(&self, timestamp: f64) -> Result<(), StateError>;
}

/// Keeps the timestamp as plain text in a local file.
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl StateStore for FileStateStore {
    fn last_notified(&self) -> Result<Option<f64>, StateError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let trimmed = text.trim();
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|ts| ts.is_finite())
            .map(Some)
            .ok_or_else(|| StateError::Corrupt(trimmed.to_string()))
    }

    fn record(&self, timestamp: f64) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, timestamp.to_string())?;
        Ok(())
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct MemoryStateStore {
    last: Mutex<Option<f64>>,
}

#[cfg(test)]
impl MemoryStateStore {
    pub fn with_timestamp(timestamp: f64) -> Self {
        Self {
            last: Mutex::new(Some(timestamp)),
        }
    }
}

#[cfg(test)]
impl StateStore for MemoryStateStore {
    fn last_notified(&self) -> Result<Option<f64>, StateError> {
        Ok(*self.last.lock().unwrap_or_else(|p| p.into_inner()))
    }

    fn record(&self, timestamp: f64) -> Result<(), StateError> {
        *self.last.lock().unwrap_or_else(|p| p.into_inner()) = Some(timestamp);
        Ok(())
    }
}

pub struct CooldownGate {
    store: Box<dyn StateStore>,
    window: f64,
}

impl CooldownGate {
    pub fn new(store: Box<dyn StateStore>) -> Self {
        Self {
            store,
            window: COOLDOWN_SECS,
        }
    }

    /// True while `now` is inside the window opened by the last send.
    /// Unreadable state counts as "never notified".
    pub fn is_suppressed(&self, now: f64) -> bool {
        let last = match self.store.last_notified() {
            Ok(last) => last,
            Err(e) => {
                warn!("Ignoring unreadable notification state: {}", e);
                None
            }
        };

        match last {
            Some(last) if now - last < self.window => {
                info!(
                    "Last notification was sent {:.0} seconds ago, skipping.",
                    now - last
                );
                true
            }
            Some(last) => {
                debug!("Last notification was sent {:.0} seconds ago.", now - last);
                false
            }
            None => false,
        }
    }

    pub fn mark_sent(&self, now: f64) -> Result<(), StateError> {
        self.store.record(now)
    }
}
