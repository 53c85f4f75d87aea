//! Output port for user-facing announcements.

/// Sink for user-visible status lines.
pub trait Announcer: Send + Sync {
    /// Emits one status line.
    fn announce(&self, message: &str);
}
