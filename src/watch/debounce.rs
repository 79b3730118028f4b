// src/watch/debounce.rs

//! Per-path debouncing.
//!
//! Editors commonly emit several writes for one save (truncate + write,
//! swap-file dance). Only the first notification for a path inside the
//! window is acted upon.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::trace;

/// Ledger size above which stale entries are dropped on the next acceptance.
pub const EVICTION_THRESHOLD: usize = 1024;

/// Last accepted timestamp per path.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    ledger: HashMap<PathBuf, Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            ledger: HashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Number of paths currently remembered.
    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    /// Returns true and records `now` for `path` if the path has no accepted
    /// event yet, or its last one is at least `window` old.
    ///
    /// A `now` earlier than the recorded timestamp counts as zero elapsed.
    pub fn accept(&mut self, path: &Path, now: Instant) -> bool {
        if let Some(last) = self.ledger.get(path) {
            if now.saturating_duration_since(*last) < self.window {
                trace!(?path, "debounced");
                return false;
            }
        }

        if self.ledger.len() >= EVICTION_THRESHOLD {
            self.evict_stale(now);
        }
        self.ledger.insert(path.to_path_buf(), now);
        true
    }

    /// Drop entries that would be accepted anyway.
    fn evict_stale(&mut self, now: Instant) {
        let window = self.window;
        let before = self.ledger.len();
        self.ledger
            .retain(|_, last| now.saturating_duration_since(*last) < window);
        trace!(before, after = self.ledger.len(), "evicted stale debounce entries");
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
