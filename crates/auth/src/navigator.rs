//! Full client redirects (page reloads), as opposed to guard decisions.

use std::sync::Mutex;

/// Performs a full navigation of the browsing context, discarding in-memory
/// client state. Only `SessionStore::logout` uses it.
pub trait HardNavigator: Send + Sync {
    fn navigate_full(&self, path: &str);
}

/// Logs hard redirects instead of performing them (CLI, headless hosts).
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl HardNavigator for TracingNavigator {
    fn navigate_full(&self, path: &str) {
        tracing::info!(path, "hard redirect");
    }
}

/// Records hard redirects for tests/dev.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl HardNavigator for RecordingNavigator {
    fn navigate_full(&self, path: &str) {
        if let Ok(mut visited) = self.visited.lock() {
            visited.push(path.to_string());
        }
    }
}
