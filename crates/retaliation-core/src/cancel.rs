//! Cooperative cancellation and interruptible sleeps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::trace;

/// Longest uninterrupted stretch of a [`BlockingSleeper`] sleep.
const DEFAULT_SLICE: Duration = Duration::from_millis(100);

/// Returned when a wait or a run was interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Shared cancellation flag.
///
/// Clones observe the same flag. The inner `AtomicBool` can be handed to a
/// signal handler directly with [`CancelToken::flag`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Returns `Err(Cancelled)` if cancellation has been requested.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// The underlying flag, for `signal_hook::flag::register`.
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}

/// Something that can block for a while.
pub trait Sleeper {
    /// Blocks for `duration`, or until cancelled.
    fn sleep(&self, duration: Duration) -> Result<(), Cancelled>;
}

impl<S: Sleeper + ?Sized> Sleeper for Box<S> {
    fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        (**self).sleep(duration)
    }
}

/// Wall-clock sleeper that wakes up regularly to check a [`CancelToken`].
#[derive(Debug, Clone)]
pub struct BlockingSleeper {
    token: CancelToken,
    slice: Duration,
}

impl BlockingSleeper {
    /// Creates a sleeper bound to `token`.
    pub fn new(token: CancelToken) -> Self {
        Self {
            token,
            slice: DEFAULT_SLICE,
        }
    }

    /// Sets how often the token is checked.
    pub fn with_slice(mut self, slice: Duration) -> Self {
        self.slice = slice;
        self
    }
}

impl Sleeper for BlockingSleeper {
    fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        trace!(duration_ms = duration.as_millis(), "sleeping");
        // A deadline past what `Instant` can represent means sleep until cancelled.
        let deadline = Instant::now().checked_add(duration);

        loop {
            self.token.check()?;
            let remaining = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(());
                    }
                    deadline - now
                }
                None => self.slice,
            };
            thread::sleep(remaining.min(self.slice));
        }
    }
}
