//! Run control shared between the drain loop and other threads.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Condvar, Mutex};

use crate::error::SimulationError;

#[derive(Default)]
struct Flags {
    running: bool,
    draining: bool,
    stop_requested: bool,
}

#[derive(Default)]
struct Inner {
    flags: Mutex<Flags>,
    wakeup: Condvar,
    drained: Condvar,
}

/// A cloneable handle for pausing or stopping a run from another thread.
///
/// The drain loop checks the running flag between events. While waiting for the wall-clock deadline
/// of the next event in realtime mode, the loop is woken up immediately by [`pause`](Self::pause) and
/// [`request_stop`](Self::request_stop).
#[derive(Clone, Default)]
pub struct RunControl {
    inner: Arc<Inner>,
}

impl RunControl {
    /// Creates a control with no active drain loop.
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the active drain loop to return after the current event, keeping pending events.
    pub fn pause(&self) {
        let mut flags = self.inner.flags.lock();
        flags.running = false;
        self.inner.wakeup.notify_all();
    }

    /// Asks the active drain loop to stop the run after the current event.
    ///
    /// Returns false if no drain loop is active.
    pub fn request_stop(&self) -> bool {
        let mut flags = self.inner.flags.lock();
        flags.running = false;
        if flags.draining {
            flags.stop_requested = true;
        }
        self.inner.wakeup.notify_all();
        flags.draining
    }

    /// Returns true if the run is allowed to proceed.
    pub fn is_running(&self) -> bool {
        self.inner.flags.lock().running
    }

    /// Returns true if a drain loop is active.
    pub fn is_draining(&self) -> bool {
        self.inner.flags.lock().draining
    }

    pub(crate) fn begin_drain(&self) -> Result<(), SimulationError> {
        let mut flags = self.inner.flags.lock();
        if flags.draining {
            return Err(SimulationError::Busy);
        }
        flags.draining = true;
        flags.running = true;
        flags.stop_requested = false;
        Ok(())
    }

    /// Marks the drain loop as finished and returns whether a stop was requested during it.
    pub(crate) fn finish_drain(&self) -> bool {
        let mut flags = self.inner.flags.lock();
        flags.draining = false;
        flags.running = false;
        self.inner.drained.notify_all();
        std::mem::take(&mut flags.stop_requested)
    }

    /// Blocks until no drain loop is active.
    pub(crate) fn wait_drained(&self) {
        let mut flags = self.inner.flags.lock();
        while flags.draining {
            self.inner.drained.wait(&mut flags);
        }
    }

    /// Blocks until the deadline or until the run is paused or stopped.
    /// Without a deadline, only a pause or a stop ends the wait.
    ///
    /// Returns true if the deadline was reached while the run is still allowed to proceed.
    pub(crate) fn wait_until(&self, deadline: Option<Instant>) -> bool {
        let mut flags = self.inner.flags.lock();
        while flags.running {
            match deadline {
                Some(deadline) => {
                    if self.inner.wakeup.wait_until(&mut flags, deadline).timed_out() {
                        return flags.running;
                    }
                }
                None => self.inner.wakeup.wait(&mut flags),
            }
        }
        false
    }
}
