//! Announcer writing to standard output.

use std::io::Write;

use crate::task::ports::Announcer;

/// Prints each announcement on its own line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleAnnouncer;

impl Announcer for ConsoleAnnouncer {
    fn announce(&self, message: &str) {
        let mut stdout = std::io::stdout().lock();
        if let Err(err) = writeln!(stdout, "{message}") {
            tracing::warn!(error = %err, "could not write announcement");
        }
    }
}
