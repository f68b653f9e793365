//! Platform abstraction layer
//!
//! Narrow interfaces to the excluded collaborators: key/value storage,
//! the leaderboard backend, and host capability flags. The core never
//! probes the host environment; capabilities are injected at
//! construction time.

use std::collections::HashMap;
use std::fmt;

/// Failure writing through the storage collaborator (quota, denied, ...).
/// Callers log and carry on; persistence never interrupts gameplay.
#[derive(Debug, Clone)]
pub struct StorageError(pub String);

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "storage error: {}", self.0)
    }
}

impl std::error::Error for StorageError {}

/// Opaque key/value persistence (LocalStorage, a file, ...).
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str);
}

/// Score submission to the external leaderboard backend.
///
/// Fire-and-forget: implementations must never block the caller, and the
/// core never observes completion or failure.
pub trait Leaderboard {
    fn submit_score(&mut self, score: u32);
}

/// In-memory storage for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Leaderboard that swallows submissions (offline / tests).
#[derive(Debug, Default)]
pub struct NullLeaderboard;

impl Leaderboard for NullLeaderboard {
    fn submit_score(&mut self, score: u32) {
        log::debug!("discarding leaderboard submission: {score}");
    }
}

/// Host capability flags, detected by the embedder and injected here.
#[derive(Debug, Clone, Copy, Default)]
pub struct Capabilities {
    /// Primary input is touch
    pub touch_input: bool,
    /// Pointer is coarse (finger on a small screen)
    pub coarse_pointer: bool,
    /// Host cannot sustain a full 60 Hz callback cadence
    pub reduced_refresh: bool,
}
