// src/progress.rs
/// Lightweight progress reporting used by long-running operations (alias maintenance).
/// Frontends implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the total number of items (if known).
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called when one logical unit completes; `done` counts from 1.
    fn item_done(&mut self, _done: usize) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// Forwards status lines to the log.
#[derive(Default)]
pub struct LogProgress {
    total: usize,
}

impl Progress for LogProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        logf!("Checking {total} games for redirects...");
    }

    fn log(&mut self, msg: &str) {
        logf!("  {msg}");
    }

    fn finish(&mut self) {
        logd!("Finished {} items", self.total);
    }
}
