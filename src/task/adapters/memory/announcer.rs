//! Announcer that records lines instead of printing them.

use std::sync::{Arc, Mutex};

use crate::task::ports::Announcer;

/// Collects announced lines for later inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingAnnouncer {
    lines: Arc<Mutex<Vec<String>>>,
}

impl RecordingAnnouncer {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every line announced so far, in order.
    ///
    /// Returns an empty list if the internal lock is poisoned.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl Announcer for RecordingAnnouncer {
    fn announce(&self, message: &str) {
        if let Ok(mut guard) = self.lines.lock() {
            guard.push(message.to_owned());
        }
    }
}
