//! Progress callbacks.
//!
//! The library never writes to the terminal itself. Everything an operator
//! should see during a purge goes through a [`ProgressCallback`], which lets
//! the CLI render it with indicatif, as plain lines, or not at all.

use std::sync::Arc;

/// A bar counting processed blocks.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    pub message: String,
    pub total: u64,
    pub current: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgressId(pub u64);

pub trait ProgressCallback: Send + Sync {
    /// Start a new indicator and return its id.
    fn start(&self, info: ProgressInfo) -> ProgressId;

    fn update_message(&self, id: ProgressId, message: String);

    /// Advance the indicator by `delta` blocks.
    fn increment(&self, id: ProgressId, delta: u64);

    fn finish(&self, id: ProgressId, final_message: String);

    /// Print a report line without disturbing active indicators.
    fn println(&self, line: String);
}

/// Callback that swallows everything.
#[derive(Debug, Default)]
pub struct NoOpProgressCallback;

impl ProgressCallback for NoOpProgressCallback {
    fn start(&self, _info: ProgressInfo) -> ProgressId {
        ProgressId(0)
    }

    fn update_message(&self, _id: ProgressId, _message: String) {}

    fn increment(&self, _id: ProgressId, _delta: u64) {}

    fn finish(&self, _id: ProgressId, _final_message: String) {}

    fn println(&self, _line: String) {}
}

pub type ProgressCallbackArc = Arc<dyn ProgressCallback>;

pub fn no_op_progress_callback() -> ProgressCallbackArc {
    Arc::new(NoOpProgressCallback)
}

/// Thin wrapper that hands out [`ProgressHandler`]s for one callback.
pub struct ProgressHelper {
    callback: ProgressCallbackArc,
}

impl ProgressHelper {
    pub fn new(callback: ProgressCallbackArc) -> Self {
        Self { callback }
    }

    pub fn create_bar(&self, total: u64, message: impl Into<String>) -> ProgressHandler {
        let id = self.callback.start(ProgressInfo {
            message: message.into(),
            total,
            current: 0,
        });
        ProgressHandler {
            callback: Arc::clone(&self.callback),
            id,
        }
    }

    pub fn println(&self, line: impl Into<String>) {
        self.callback.println(line.into());
    }
}

/// Handle on a single running indicator.
pub struct ProgressHandler {
    callback: ProgressCallbackArc,
    id: ProgressId,
}

impl ProgressHandler {
    pub fn set_message(&self, message: impl Into<String>) {
        self.callback.update_message(self.id, message.into());
    }

    pub fn inc(&self, delta: u64) {
        self.callback.increment(self.id, delta);
    }

    pub fn finish_with_message(self, message: impl Into<String>) {
        self.callback.finish(self.id, message.into());
    }
}
