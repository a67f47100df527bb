//! Operation context tracking.
//!
//! Long-running steps push a frame describing what they are doing; when
//! something fails, the active frames are captured alongside the error so
//! the report can say *where* in the pipeline it happened.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub operation: String,
    pub detail: String,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            f.write_str(&self.operation)
        } else {
            write!(f, "{}: {}", self.operation, self.detail)
        }
    }
}

/// Shared stack of operation frames. Clones share the same stack.
#[derive(Debug, Clone, Default)]
pub struct ContextTracker {
    frames: Arc<Mutex<Vec<Frame>>>,
}

impl ContextTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a frame; it is popped when the returned guard drops.
    pub fn enter(&self, operation: impl Into<String>, detail: impl Into<String>) -> ContextGuard {
        let mut frames = self.lock();
        frames.push(Frame {
            operation: operation.into(),
            detail: detail.into(),
        });
        ContextGuard {
            tracker: self.clone(),
            depth: frames.len(),
        }
    }

    /// Active frames, outermost first.
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().iter().map(|f| f.to_string()).collect()
    }

    pub fn depth(&self) -> usize {
        self.lock().len()
    }

    // A panic while holding the lock leaves the frames usable
    fn lock(&self) -> MutexGuard<'_, Vec<Frame>> {
        self.frames.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[must_use = "the frame is popped as soon as the guard is dropped"]
pub struct ContextGuard {
    tracker: ContextTracker,
    depth: usize,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        // Also unwinds frames left by guards that were leaked
        self.tracker.lock().truncate(self.depth.saturating_sub(1));
    }
}
