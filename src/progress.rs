use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{RepoError, RepoResult};

/// Receives the completed fraction of a long operation, from `0.0` to `1.0`.
pub trait Progress {
    fn report(&mut self, fraction: f64);
}

impl<F: FnMut(f64)> Progress for F {
    fn report(&mut self, fraction: f64) {
        self(fraction)
    }
}

/// Discards progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&mut self, _: f64) {}
}

/// Cooperative cancellation flag. Clones share the flag, so one can be handed to another thread
/// (a signal handler, a UI) to stop the operation holding the other.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(RepoError::Cancelled)` once [`CancelToken::cancel`] has been called.
    pub fn check(&self) -> RepoResult<()> {
        if self.is_cancelled() {
            Err(RepoError::Cancelled)
        } else {
            Ok(())
        }
    }
}
