//! Recording test doubles.
//!
//! A [`Timeline`] collects every transfer and every wait in the order they
//! happen, across both launchers and any number of sleepers, so tests can
//! assert on the exact interleaving without touching hardware or the clock.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use retaliation_models::DeviceSlot;
use retaliation_usb::{ControlTransfer, DeviceError, Dialect, LauncherHandle, RegistryHandle};

use crate::cancel::{CancelToken, Cancelled, Sleeper};

/// Something that happened during a test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A transfer reached the launcher in `slot`.
    Transfer {
        slot: DeviceSlot,
        transfer: ControlTransfer,
    },
    /// A sleeper was asked to block.
    Wait(Duration),
}

/// Shared, ordered log of [`Event`]s.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    events: Arc<Mutex<Vec<Event>>>,
    failing: Arc<AtomicBool>,
}

impl Timeline {
    /// Creates an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent transfer fail.
    pub fn fail_transfers(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }

    fn push(&self, event: Event) {
        self.events
            .lock()
            .expect("timeline lock poisoned")
            .push(event);
    }

    /// Snapshot of every recorded event.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().expect("timeline lock poisoned").clone()
    }

    /// Transfers sent to any launcher.
    pub fn transfers(&self) -> Vec<(DeviceSlot, ControlTransfer)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Transfer { slot, transfer } => Some((slot, transfer)),
                Event::Wait(_) => None,
            })
            .collect()
    }

    /// Transfers sent to the launcher in `slot`.
    pub fn transfers_for(&self, slot: DeviceSlot) -> Vec<ControlTransfer> {
        self.transfers()
            .into_iter()
            .filter(|(s, _)| *s == slot)
            .map(|(_, t)| t)
            .collect()
    }

    /// Every recorded wait, in order.
    pub fn waits(&self) -> Vec<Duration> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Wait(d) => Some(d),
                Event::Transfer { .. } => None,
            })
            .collect()
    }

    /// Sum of every recorded wait.
    pub fn total_wait(&self) -> Duration {
        self.waits().into_iter().sum()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        self.events.lock().expect("timeline lock poisoned").clear();
    }
}

/// Launcher handle that records transfers instead of sending them.
pub struct RecordingHandle {
    slot: DeviceSlot,
    timeline: Timeline,
}

impl RecordingHandle {
    /// Creates a handle that records as `slot`.
    pub fn new(slot: DeviceSlot, timeline: Timeline) -> Self {
        Self { slot, timeline }
    }
}

impl LauncherHandle for RecordingHandle {
    fn write_control(&mut self, transfer: &ControlTransfer) -> retaliation_usb::Result<usize> {
        if self.timeline.failing.load(Ordering::SeqCst) {
            return Err(DeviceError::Transfer {
                device: self.describe(),
                source: rusb::Error::Pipe,
            });
        }
        self.timeline.push(Event::Transfer {
            slot: self.slot,
            transfer: transfer.clone(),
        });
        Ok(transfer.data.len())
    }

    fn describe(&self) -> String {
        format!("recording {}", self.slot)
    }
}

/// A registry whose two launchers record into `timeline`.
pub fn recording_registry(dialect: Dialect, timeline: &Timeline) -> RegistryHandle {
    RegistryHandle::from_handles(
        dialect,
        Box::new(RecordingHandle::new(DeviceSlot::One, timeline.clone())),
        Box::new(RecordingHandle::new(DeviceSlot::Two, timeline.clone())),
    )
}

/// Sleeper that records waits and returns immediately.
pub struct RecordingSleeper {
    timeline: Timeline,
    token: CancelToken,
    cancel_after: Option<usize>,
    count: Cell<usize>,
}

impl RecordingSleeper {
    /// Creates a sleeper that never cancels on its own.
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            token: CancelToken::new(),
            cancel_after: None,
            count: Cell::new(0),
        }
    }

    /// Honours `token`: a cancelled token makes every sleep fail.
    pub fn with_token(mut self, token: CancelToken) -> Self {
        self.token = token;
        self
    }

    /// Cancels the token during the `n`th sleep, as an interrupt would.
    pub fn cancel_after(mut self, n: usize) -> Self {
        self.cancel_after = Some(n);
        self
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        self.token.check()?;
        self.timeline.push(Event::Wait(duration));

        let count = self.count.get() + 1;
        self.count.set(count);
        if self.cancel_after.is_some_and(|limit| count >= limit) {
            self.token.cancel();
            return Err(Cancelled);
        }
        Ok(())
    }
}
